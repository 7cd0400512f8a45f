//! Recovery actuator: runs the node's restart command

use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    Succeeded { output: String },
    ExitedWithError { code: Option<i32>, output: String },
    LaunchFailed { reason: String },
    TimedOut { after: Duration },
}

/// Starts a restart without blocking the caller. The returned handle
/// resolves once the command finished; monitors are free to drop it.
pub trait RecoveryActuator: Send + Sync {
    fn trigger(&self, node_name: &str, reason: &str) -> JoinHandle<RecoveryOutcome>;
}

#[derive(Debug, Clone)]
pub struct RecoveryService {
    command: String,
    working_dir: PathBuf,
    timeout: Duration,
}

impl RecoveryService {
    pub fn new(command: &str, working_dir: &str, timeout: Duration) -> Self {
        Self {
            command: command.to_string(),
            working_dir: PathBuf::from(working_dir),
            timeout,
        }
    }
}

impl RecoveryActuator for RecoveryService {
    fn trigger(&self, node_name: &str, reason: &str) -> JoinHandle<RecoveryOutcome> {
        warn!(
            "Restarting {} via '{}' ({})",
            node_name, self.command, reason
        );
        let service = self.clone();
        let node_name = node_name.to_string();
        tokio::spawn(async move {
            let outcome = service.run().await;
            log_outcome(&node_name, &outcome);
            outcome
        })
    }
}

impl RecoveryService {
    async fn run(&self) -> RecoveryOutcome {
        let mut command = AsyncCommand::new("sh");
        command
            .arg("-c")
            .arg(&self.command)
            .current_dir(&self.working_dir)
            .kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Err(_) => return RecoveryOutcome::TimedOut { after: self.timeout },
            Ok(Err(e)) => {
                return RecoveryOutcome::LaunchFailed {
                    reason: e.to_string(),
                }
            }
            Ok(Ok(output)) => output,
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            RecoveryOutcome::Succeeded { output: combined }
        } else {
            RecoveryOutcome::ExitedWithError {
                code: output.status.code(),
                output: combined,
            }
        }
    }
}

fn log_outcome(node_name: &str, outcome: &RecoveryOutcome) {
    match outcome {
        RecoveryOutcome::Succeeded { output } => {
            info!("Restart command for {} succeeded with output:\n{}", node_name, output)
        }
        RecoveryOutcome::ExitedWithError { code, output } => error!(
            "Restart command for {} exited with {:?}:\n{}",
            node_name, code, output
        ),
        RecoveryOutcome::LaunchFailed { reason } => {
            error!("Restart command for {} could not start: {}", node_name, reason)
        }
        RecoveryOutcome::TimedOut { after } => error!(
            "Restart command for {} killed after {}s",
            node_name,
            after.as_secs()
        ),
    }
}
