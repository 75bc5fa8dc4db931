//! Provisioning step protocol: check, apply, report, fail fast.

use thiserror::Error;

use crate::provision::runner::CommandRunner;

/// Errors a provisioning step can produce.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("verification probe could not be constructed: {0}")]
    Probe(#[source] reqwest::Error),

    #[error("server did not answer on {address} within {timeout_secs}s")]
    VerifyTimeout { address: String, timeout_secs: u64 },
}

/// Result of a non-mutating `check()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// The host already matches the target state; `apply()` is skipped.
    Satisfied(String),
    /// The host diverges and `apply()` would change it.
    Pending(String),
}

/// Result of an `apply()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing needed doing.
    Unchanged(String),
    /// The host was changed.
    Changed(String),
}

/// Outcome of one reconciled step.
#[derive(Debug)]
pub struct StepReport {
    pub name: &'static str,
    pub outcome: StepOutcome,
}

/// A run aborted mid-way. Carries the reports of the steps that did
/// complete, so the operator sees exactly how far the run got.
#[derive(Debug, Error)]
#[error("provisioning aborted at step '{step}': {source}")]
pub struct ApplyError {
    pub step: &'static str,
    #[source]
    pub source: ProvisionError,
    pub completed: Vec<StepReport>,
}

/// One unit of host reconciliation.
pub trait Step {
    /// Short stable identifier, used in reports and logs.
    fn name(&self) -> &'static str;

    /// Compare the host against the target state without mutating it.
    fn check(&self, runner: &dyn CommandRunner) -> Result<StepStatus, ProvisionError>;

    /// Drive the host to the target state.
    fn apply(&self, runner: &dyn CommandRunner) -> Result<StepOutcome, ProvisionError>;
}

/// Evaluate every step's check without touching the host.
pub fn plan(
    steps: &[Box<dyn Step>],
    runner: &dyn CommandRunner,
) -> Result<Vec<(&'static str, StepStatus)>, ProvisionError> {
    steps
        .iter()
        .map(|step| Ok((step.name(), step.check(runner)?)))
        .collect()
}

/// Reconcile each step in order, aborting on the first failure.
pub fn apply_all(
    steps: &[Box<dyn Step>],
    runner: &dyn CommandRunner,
) -> Result<Vec<StepReport>, ApplyError> {
    let mut reports = Vec::with_capacity(steps.len());

    for step in steps {
        let name = step.name();
        let outcome = reconcile(step.as_ref(), runner).map_err(|source| ApplyError {
            step: name,
            source,
            completed: std::mem::take(&mut reports),
        })?;

        match &outcome {
            StepOutcome::Unchanged(reason) => {
                tracing::info!(step = name, reason = %reason, "Step already satisfied")
            }
            StepOutcome::Changed(reason) => {
                tracing::info!(step = name, change = %reason, "Step applied")
            }
        }
        reports.push(StepReport { name, outcome });
    }

    Ok(reports)
}

fn reconcile(step: &dyn Step, runner: &dyn CommandRunner) -> Result<StepOutcome, ProvisionError> {
    match step.check(runner)? {
        StepStatus::Satisfied(reason) => Ok(StepOutcome::Unchanged(reason)),
        StepStatus::Pending(_) => step.apply(runner),
    }
}
