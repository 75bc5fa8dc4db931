//! Host provisioning subsystem.
//!
//! # Data Flow
//! ```text
//! ProvisionConfig (target state)
//!     → steps.rs (ordered Step list: packages → port grant → launch)
//!     → check(): is the host already in the target state?
//!     → apply(): reconcile, idempotently
//!     → StepReport per step; first failure aborts the run
//!
//! After apply:
//!     service.rs::wait_until_serving polls GET / until the server
//!     answers or the deadline passes
//! ```
//!
//! # Design Decisions
//! - Declarative target state reconciled by idempotent steps; re-running
//!   against an already provisioned host changes nothing
//! - Fail fast: a failed step aborts the run with the reports collected
//!   so far, nothing later executes
//! - Commands go through the `CommandRunner` seam so step logic is
//!   testable without touching the host
//! - Runs as root (package installation and chown require it); the
//!   launched server itself runs unprivileged, bound to the low port
//!   through authbind's marker-file grant

pub mod authbind;
pub mod packages;
pub mod runner;
pub mod service;
pub mod steps;

pub use authbind::PortGrantStep;
pub use packages::PackageStep;
pub use runner::{CommandRunner, SystemRunner};
pub use service::LaunchStep;
pub use steps::{apply_all, plan, ApplyError, ProvisionError, Step, StepOutcome, StepStatus};
