//! Service launch step and post-apply verification.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::provision::runner::CommandRunner;
use crate::provision::steps::{ProvisionError, Step, StepOutcome, StepStatus};

/// How long one liveness probe may take.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Delay between liveness probes.
const PROBE_INTERVAL: Duration = Duration::from_millis(500);

/// Launches the server under authbind so the unprivileged service user
/// can bind the low port.
pub struct LaunchStep {
    server_binary: PathBuf,
    config_path: PathBuf,
    address: SocketAddr,
}

impl LaunchStep {
    pub fn new(
        server_binary: impl Into<PathBuf>,
        config_path: impl Into<PathBuf>,
        address: SocketAddr,
    ) -> Self {
        Self {
            server_binary: server_binary.into(),
            config_path: config_path.into(),
            address,
        }
    }
}

impl Step for LaunchStep {
    fn name(&self) -> &'static str {
        "launch"
    }

    fn check(&self, _runner: &dyn CommandRunner) -> Result<StepStatus, ProvisionError> {
        let addr = probe_address(self.address);
        match std::net::TcpStream::connect_timeout(&addr, PROBE_TIMEOUT) {
            Ok(_) => Ok(StepStatus::Satisfied(format!(
                "something is already listening on {addr}"
            ))),
            Err(_) => Ok(StepStatus::Pending(format!("nothing listening on {addr}"))),
        }
    }

    fn apply(&self, _runner: &dyn CommandRunner) -> Result<StepOutcome, ProvisionError> {
        let child = Command::new("authbind")
            .arg("--deep")
            .arg(&self.server_binary)
            .arg("--config")
            .arg(&self.config_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ProvisionError::Spawn {
                command: format!("authbind --deep {}", self.server_binary.display()),
                source,
            })?;

        Ok(StepOutcome::Changed(format!(
            "launched {} (pid {}) bound to {}",
            self.server_binary.display(),
            child.id(),
            self.address
        )))
    }
}

/// Block until the launched server answers `GET /` or the deadline
/// passes. This is the end-to-end proof that the grant worked and the
/// process is actually serving.
pub fn wait_until_serving(address: SocketAddr, timeout: Duration) -> Result<(), ProvisionError> {
    let probe = probe_address(address);
    let url = format!("http://{probe}/");
    let client = reqwest::blocking::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .map_err(ProvisionError::Probe)?;

    let deadline = Instant::now() + timeout;
    loop {
        match client.get(&url).send() {
            Ok(response) if response.status().is_success() => {
                tracing::info!(address = %probe, "Server is answering");
                return Ok(());
            }
            Ok(response) => {
                tracing::debug!(address = %probe, status = %response.status(), "Probe got unexpected status");
            }
            Err(error) => {
                tracing::debug!(address = %probe, error = %error, "Probe failed");
            }
        }

        if Instant::now() >= deadline {
            return Err(ProvisionError::VerifyTimeout {
                address: probe.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
        std::thread::sleep(PROBE_INTERVAL);
    }
}

/// A wildcard bind address is probed over loopback.
fn probe_address(address: SocketAddr) -> SocketAddr {
    if address.ip().is_unspecified() {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), address.port())
    } else {
        address
    }
}
