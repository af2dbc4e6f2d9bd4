//! Popup launching
//!
//! Each notification gets its own popup process. The daemon hands over the
//! record as JSON in an environment variable and forgets about the child:
//! no output capture, no exit status, no lifetime tracking.

use crate::config::PopupConfig;
use crate::notification::Notification;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Something that can put a notification on screen
pub trait PopupLauncher: Send + Sync {
    /// Fire-and-forget; failures are the launcher's to log.
    fn launch(&self, notification: &Notification);
}

/// Spawns the configured popup program
pub struct CommandLauncher {
    config: PopupConfig,
}

impl CommandLauncher {
    pub fn new(config: PopupConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, payload: &str) -> Command {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args)
            .env(&self.config.env_var, payload)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false);
        cmd
    }
}

impl PopupLauncher for CommandLauncher {
    fn launch(&self, notification: &Notification) {
        if !self.config.enabled {
            return;
        }

        let payload = match serde_json::to_string(notification) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode notification {}: {}", notification.id, e);
                return;
            }
        };

        // Dropping the child detaches it; the runtime reaps it once it exits.
        match self.build_command(&payload).spawn() {
            Ok(child) => debug!(
                "Popup for notification {} started (pid {:?})",
                notification.id,
                child.id()
            ),
            Err(e) => warn!("Failed to launch popup {:?}: {}", self.config.command, e),
        }
    }
}
