use crate::errors::AppError;
use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;

/// Requests a restart of the capture process through an external process
/// manager. Fire-and-forget from the caller's perspective: success means
/// the restart was issued, not that the new source is streaming. The
/// underlying operation must be idempotent and safe to invoke while the
/// supervisor is mid-reconnect (systemd restart is both).
#[async_trait]
pub trait CaptureRestarter: Send + Sync {
    async fn restart_capture(&self) -> Result<(), AppError>;
}

/// Production restarter: spawns the configured process-manager command,
/// e.g. `systemctl restart camwatch-capture.service`.
pub struct CommandRestarter {
    command: Vec<String>,
}

impl CommandRestarter {
    pub fn new(command: Vec<String>) -> Result<Self, AppError> {
        if command.is_empty() {
            return Err(AppError::Config(
                "restart_command cannot be empty".to_string(),
            ));
        }
        Ok(CommandRestarter { command })
    }
}

#[async_trait]
impl CaptureRestarter for CommandRestarter {
    async fn restart_capture(&self) -> Result<(), AppError> {
        debug!("🔁 Issuing capture restart: {:?}", self.command);
        let output = Command::new(&self.command[0])
            .args(&self.command[1..])
            .output()
            .await
            .map_err(|e| AppError::Restart(format!("Failed to spawn {:?}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Restart(format!(
                "Restart command {:?} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }
        info!("🔁 Capture restart request issued.");
        Ok(())
    }
}
