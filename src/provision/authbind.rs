//! authbind port grant step.
//!
//! authbind lets a process bind a privileged port when a marker file for
//! that port exists under its byport directory, is owned by the binding
//! user, and is executable by that user. The target state here is a
//! zero-byte marker with mode 0500 owned by the service user.

use std::fs::{self, File};
use std::os::unix::fs::{chown, MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

use crate::provision::runner::CommandRunner;
use crate::provision::steps::{ProvisionError, Step, StepOutcome, StepStatus};

/// Owner read+execute only.
const GRANT_MODE: u32 = 0o500;

/// Lowest port number that does not require privileges to bind.
const UNPRIVILEGED_PORT_START: u16 = 1024;

/// Ensures the authbind marker for the listener port exists with the
/// required owner and mode.
pub struct PortGrantStep {
    byport_dir: PathBuf,
    port: u16,
    user: String,
}

impl PortGrantStep {
    pub fn new(byport_dir: impl Into<PathBuf>, port: u16, user: impl Into<String>) -> Self {
        Self {
            byport_dir: byport_dir.into(),
            port,
            user: user.into(),
        }
    }

    /// Path of the marker file for the target port.
    pub fn marker_path(&self) -> PathBuf {
        self.byport_dir.join(self.port.to_string())
    }

    /// Resolve the service user's uid and gid via `id`.
    fn lookup_ids(&self, runner: &dyn CommandRunner) -> Result<(u32, u32), ProvisionError> {
        let uid = self.lookup_id(runner, "-u")?;
        let gid = self.lookup_id(runner, "-g")?;
        Ok((uid, gid))
    }

    fn lookup_id(&self, runner: &dyn CommandRunner, flag: &str) -> Result<u32, ProvisionError> {
        let command = format!("id {flag} {}", self.user);
        let output = runner
            .run("id", &[flag, &self.user])
            .map_err(|source| ProvisionError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !output.success {
            return Err(ProvisionError::UnknownUser(self.user.clone()));
        }
        output
            .stdout
            .trim()
            .parse()
            .map_err(|_| ProvisionError::UnknownUser(self.user.clone()))
    }

    fn io_error(path: &Path, source: std::io::Error) -> ProvisionError {
        ProvisionError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl Step for PortGrantStep {
    fn name(&self) -> &'static str {
        "port-grant"
    }

    fn check(&self, runner: &dyn CommandRunner) -> Result<StepStatus, ProvisionError> {
        if self.port >= UNPRIVILEGED_PORT_START {
            return Ok(StepStatus::Satisfied(format!(
                "port {} is unprivileged; no grant required",
                self.port
            )));
        }

        let path = self.marker_path();
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StepStatus::Pending(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
            Err(source) => return Err(Self::io_error(&path, source)),
        };

        let (uid, _) = self.lookup_ids(runner)?;
        let mode = metadata.permissions().mode() & 0o7777;
        if mode != GRANT_MODE {
            return Ok(StepStatus::Pending(format!(
                "{} has mode {:o}, want {:o}",
                path.display(),
                mode,
                GRANT_MODE
            )));
        }
        if metadata.uid() != uid {
            return Ok(StepStatus::Pending(format!(
                "{} is owned by uid {}, want {} ({})",
                path.display(),
                metadata.uid(),
                uid,
                self.user
            )));
        }

        Ok(StepStatus::Satisfied(format!(
            "{} grants port {} to {}",
            path.display(),
            self.port,
            self.user
        )))
    }

    fn apply(&self, runner: &dyn CommandRunner) -> Result<StepOutcome, ProvisionError> {
        if self.port >= UNPRIVILEGED_PORT_START {
            return Ok(StepOutcome::Unchanged(format!(
                "port {} is unprivileged",
                self.port
            )));
        }

        // Resolve the owner before touching the filesystem; an unknown
        // user must abort with nothing half-written.
        let (uid, gid) = self.lookup_ids(runner)?;

        fs::create_dir_all(&self.byport_dir)
            .map_err(|source| Self::io_error(&self.byport_dir, source))?;

        let path = self.marker_path();
        File::create(&path).map_err(|source| Self::io_error(&path, source))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(GRANT_MODE))
            .map_err(|source| Self::io_error(&path, source))?;
        chown(&path, Some(uid), Some(gid)).map_err(|source| Self::io_error(&path, source))?;

        Ok(StepOutcome::Changed(format!(
            "granted port {} to {} via {}",
            self.port,
            self.user,
            path.display()
        )))
    }
}
