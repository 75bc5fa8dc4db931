//! OS package installation step.

use crate::provision::runner::CommandRunner;
use crate::provision::steps::{ProvisionError, Step, StepOutcome, StepStatus};

/// Ensures the configured apt packages are installed.
pub struct PackageStep {
    packages: Vec<String>,
}

impl PackageStep {
    pub fn new(packages: Vec<String>) -> Self {
        Self { packages }
    }

    fn missing(&self, runner: &dyn CommandRunner) -> Result<Vec<String>, ProvisionError> {
        let mut missing = Vec::new();
        for package in &self.packages {
            let output = runner
                .run("dpkg", &["-s", package])
                .map_err(|source| ProvisionError::Spawn {
                    command: format!("dpkg -s {package}"),
                    source,
                })?;
            if !output.success {
                missing.push(package.clone());
            }
        }
        Ok(missing)
    }
}

impl Step for PackageStep {
    fn name(&self) -> &'static str {
        "packages"
    }

    fn check(&self, runner: &dyn CommandRunner) -> Result<StepStatus, ProvisionError> {
        let missing = self.missing(runner)?;
        if missing.is_empty() {
            Ok(StepStatus::Satisfied(format!(
                "installed: {}",
                self.packages.join(", ")
            )))
        } else {
            Ok(StepStatus::Pending(format!(
                "missing: {}",
                missing.join(", ")
            )))
        }
    }

    fn apply(&self, runner: &dyn CommandRunner) -> Result<StepOutcome, ProvisionError> {
        let missing = self.missing(runner)?;
        if missing.is_empty() {
            return Ok(StepOutcome::Unchanged("all packages installed".to_string()));
        }

        run_checked(runner, "apt-get", &["update"])?;

        let mut args = vec!["install", "-y"];
        args.extend(missing.iter().map(String::as_str));
        run_checked(runner, "apt-get", &args)?;

        Ok(StepOutcome::Changed(format!(
            "installed {}",
            missing.join(", ")
        )))
    }
}

/// Run a command and turn a nonzero exit into a step failure.
fn run_checked(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<(), ProvisionError> {
    let command = format!("{program} {}", args.join(" "));
    let output = runner
        .run(program, args)
        .map_err(|source| ProvisionError::Spawn {
            command: command.clone(),
            source,
        })?;
    if !output.success {
        return Err(ProvisionError::CommandFailed {
            command,
            status: output
                .code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::runner::CommandOutput;
    use std::sync::Mutex;

    /// Scripted runner: records invocations, fails commands by prefix.
    struct ScriptedRunner {
        fail_prefixes: Vec<String>,
        log: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(fail_prefixes: &[&str]) -> Self {
            Self {
                fail_prefixes: fail_prefixes.iter().map(|s| s.to_string()).collect(),
                log: Mutex::new(Vec::new()),
            }
        }

        fn commands(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput> {
            let command = format!("{program} {}", args.join(" "));
            self.log.lock().unwrap().push(command.clone());
            let fail = self.fail_prefixes.iter().any(|p| command.starts_with(p));
            Ok(CommandOutput {
                success: !fail,
                code: Some(if fail { 1 } else { 0 }),
                stdout: String::new(),
                stderr: if fail { "scripted failure".to_string() } else { String::new() },
            })
        }
    }

    #[test]
    fn test_check_reports_missing_packages() {
        let runner = ScriptedRunner::new(&["dpkg -s authbind"]);
        let step = PackageStep::new(vec!["authbind".to_string()]);
        match step.check(&runner).unwrap() {
            StepStatus::Pending(reason) => assert!(reason.contains("authbind")),
            status => panic!("expected pending, got {status:?}"),
        }
    }

    #[test]
    fn test_check_satisfied_when_all_installed() {
        let runner = ScriptedRunner::new(&[]);
        let step = PackageStep::new(vec!["authbind".to_string()]);
        assert!(matches!(
            step.check(&runner).unwrap(),
            StepStatus::Satisfied(_)
        ));
    }

    #[test]
    fn test_apply_updates_index_then_installs_only_missing() {
        let runner = ScriptedRunner::new(&["dpkg -s authbind"]);
        let step = PackageStep::new(vec!["authbind".to_string(), "curl".to_string()]);
        let outcome = step.apply(&runner).unwrap();

        assert!(matches!(outcome, StepOutcome::Changed(_)));
        let commands = runner.commands();
        assert!(commands.contains(&"apt-get update".to_string()));
        // curl reported installed, so only authbind is requested.
        assert!(commands.contains(&"apt-get install -y authbind".to_string()));
    }

    #[test]
    fn test_apply_surfaces_install_failure() {
        let runner = ScriptedRunner::new(&["dpkg -s authbind", "apt-get install"]);
        let step = PackageStep::new(vec!["authbind".to_string()]);
        let err = step.apply(&runner).unwrap_err();
        assert!(matches!(err, ProvisionError::CommandFailed { .. }));
        assert!(err.to_string().contains("apt-get install"));
    }
}
