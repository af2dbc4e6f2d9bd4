//! D-Bus interface for freedesktop notifications

use crate::notification::{decode_hints, NotifyRequest};
use crate::service::NotificationService;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use zbus::fdo::{RequestNameFlags, RequestNameReply};
use zbus::object_server::{InterfaceRef, SignalEmitter};
use zbus::zvariant::OwnedValue;
use zbus::{interface, Connection};

pub const BUS_NAME: &str = "org.freedesktop.Notifications";
pub const OBJECT_PATH: &str = "/org/freedesktop/Notifications";

/// Outbound signals, queued by the service and emitted by [`forward_signals`]
#[derive(Debug, Clone, PartialEq)]
pub enum DbusSignal {
    NotificationClosed { id: u32, reason: u32 },
    ActionInvoked { id: u32, action_key: String },
}

/// `org.freedesktop.Notifications` server object
pub struct NotificationServer {
    service: NotificationService,
}

impl NotificationServer {
    pub fn new(service: NotificationService) -> Self {
        Self { service }
    }
}

#[interface(name = "org.freedesktop.Notifications")]
impl NotificationServer {
    async fn notify(
        &self,
        app_name: String,
        replaces_id: u32,
        app_icon: String,
        summary: String,
        body: String,
        actions: Vec<String>,
        hints: HashMap<String, OwnedValue>,
        _expire_timeout: i32,
    ) -> u32 {
        let request = NotifyRequest {
            app_name,
            replaces_id,
            app_icon,
            summary,
            body,
            actions,
            hints: decode_hints(&hints),
        };

        self.service.notify(request).await
    }

    async fn close_notification(&self, id: u32) {
        self.service.close(id).await;
    }

    async fn get_capabilities(&self) -> Vec<String> {
        NotificationService::capabilities()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[zbus(out_args("name", "vendor", "version", "spec_version"))]
    async fn get_server_information(&self) -> (String, String, String, String) {
        let (name, vendor, version, spec_version) = NotificationService::server_info();
        (
            name.to_string(),
            vendor.to_string(),
            version.to_string(),
            spec_version.to_string(),
        )
    }

    #[zbus(signal)]
    async fn notification_closed(
        emitter: &SignalEmitter<'_>,
        id: u32,
        reason: u32,
    ) -> zbus::Result<()>;

    #[zbus(signal)]
    async fn action_invoked(
        emitter: &SignalEmitter<'_>,
        id: u32,
        action_key: String,
    ) -> zbus::Result<()>;
}

/// Connect to the session bus, export the server and claim [`BUS_NAME`].
///
/// Fails if another notification daemon already owns the name; we never
/// queue for it.
pub async fn serve(service: NotificationService) -> Result<Connection> {
    let connection = Connection::session()
        .await
        .context("connecting to the session bus")?;

    connection
        .object_server()
        .at(OBJECT_PATH, NotificationServer::new(service))
        .await
        .context("exporting notification interface")?;

    let reply = connection
        .request_name_with_flags(BUS_NAME, RequestNameFlags::DoNotQueue.into())
        .await
        .with_context(|| format!("requesting {}", BUS_NAME))?;

    match reply {
        RequestNameReply::PrimaryOwner | RequestNameReply::AlreadyOwner => {
            info!("Acquired bus name {}", BUS_NAME);
        }
        other => bail!("{} is owned by another process ({:?})", BUS_NAME, other),
    }

    Ok(connection)
}

/// Emit queued signals on the bus until every sender is gone
pub async fn forward_signals(connection: Connection, mut signal_rx: mpsc::Receiver<DbusSignal>) -> Result<()> {
    let iface: InterfaceRef<NotificationServer> = connection
        .object_server()
        .interface(OBJECT_PATH)
        .await
        .context("looking up exported notification interface")?;

    while let Some(signal) = signal_rx.recv().await {
        debug!("Emitting {:?}", signal);
        let emitter = iface.signal_emitter();

        let result = match signal {
            DbusSignal::NotificationClosed { id, reason } => {
                NotificationServer::notification_closed(emitter, id, reason).await
            }
            DbusSignal::ActionInvoked { id, action_key } => {
                NotificationServer::action_invoked(emitter, id, action_key).await
            }
        };

        if let Err(e) = result {
            warn!("Failed to emit bus signal: {}", e);
        }
    }

    Ok(())
}
