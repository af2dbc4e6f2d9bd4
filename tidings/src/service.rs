//! Notification operations shared by the bus interface and the control channel
//!
//! All state sits in one [`Registry`] behind one lock. Each operation does
//! its whole mutation, including the history write, under that lock, so
//! concurrent callers never interleave inside a mutation. Popups and bus
//! signals go out after the lock is released.

use crate::dbus::DbusSignal;
use crate::notification::{NotifyRequest, CLOSED_BY_CALL};
use crate::popup::PopupLauncher;
use crate::registry::Registry;
use libtidings_ipc::HistorySnapshot;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "qs-notifications";
pub const SERVER_VENDOR: &str = "quickshell";
pub const SPEC_VERSION: &str = "1.2";

/// Cheaply cloneable handle to the daemon state
#[derive(Clone)]
pub struct NotificationService {
    state: Arc<Mutex<Registry>>,
    launcher: Arc<dyn PopupLauncher>,
    signal_tx: mpsc::Sender<DbusSignal>,
}

impl NotificationService {
    pub fn new(
        registry: Registry,
        launcher: Arc<dyn PopupLauncher>,
        signal_tx: mpsc::Sender<DbusSignal>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(registry)),
            launcher,
            signal_tx,
        }
    }

    /// Record a notification and show it unless DND is on. Always returns the id.
    pub async fn notify(&self, request: NotifyRequest) -> u32 {
        let (notification, show_popup) = {
            let mut state = self.state.lock().await;
            let id = state.assign_id(request.replaces_id);
            let notification = request.into_notification(id);
            state.insert(notification.clone());
            state.history().persist().await;
            (notification, !state.dnd())
        };

        info!(
            "Notification {} from {:?}: {:?}",
            notification.id, notification.app_name, notification.summary
        );

        if show_popup {
            self.launcher.launch(&notification);
        } else {
            debug!("DND active, popup for {} suppressed", notification.id);
        }

        notification.id
    }

    /// Drop a live notification. The close signal is sent whether or not
    /// the id was live.
    pub async fn close(&self, id: u32) {
        let removed = self.state.lock().await.remove(id).is_some();
        debug!("Close notification {} (was live: {})", id, removed);

        self.emit(DbusSignal::NotificationClosed {
            id,
            reason: CLOSED_BY_CALL,
        })
        .await;
    }

    /// Tell the sender a popup action was chosen. The id is not checked.
    pub async fn invoke_action(&self, id: u32, action_key: &str) {
        info!("Invoking action: id={}, action={}", id, action_key);
        self.emit(DbusSignal::ActionInvoked {
            id,
            action_key: action_key.to_string(),
        })
        .await;
    }

    pub async fn snapshot(&self) -> HistorySnapshot {
        let state = self.state.lock().await;
        HistorySnapshot {
            history: state.history().entries().to_vec(),
            dnd: state.dnd(),
        }
    }

    pub async fn set_dnd(&self, enabled: bool) -> bool {
        let mut state = self.state.lock().await;
        state.set_dnd(enabled);
        info!("DND {}", if enabled { "enabled" } else { "disabled" });
        state.dnd()
    }

    pub async fn clear_history(&self) {
        let mut state = self.state.lock().await;
        state.history_mut().clear();
        state.history().persist().await;
    }

    pub async fn delete_from_history(&self, id: u32) {
        let mut state = self.state.lock().await;
        let removed = state.history_mut().remove_id(id);
        debug!("Deleted {} history entries with id {}", removed, id);
        state.history().persist().await;
    }

    #[cfg(test)]
    pub async fn live_count(&self) -> usize {
        self.state.lock().await.live_count()
    }

    async fn emit(&self, signal: DbusSignal) {
        if let Err(e) = self.signal_tx.send(signal).await {
            warn!("Bus signal dropped, forwarder gone: {:?}", e.0);
        }
    }

    pub fn capabilities() -> Vec<&'static str> {
        vec!["body", "body-markup", "actions", "icon-static", "persistence"]
    }

    pub fn server_info() -> (&'static str, &'static str, &'static str, &'static str) {
        (
            SERVER_NAME,
            SERVER_VENDOR,
            env!("CARGO_PKG_VERSION"),
            SPEC_VERSION,
        )
    }
}
