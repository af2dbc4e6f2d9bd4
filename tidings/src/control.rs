//! Control socket for the status bar
//!
//! One request line in, one response line out, then the connection is
//! closed. Malformed requests are logged and closed without a reply.

use crate::service::NotificationService;
use anyhow::{Context, Result};
use libtidings_ipc::protocol::{decode_request, ControlRequest, ControlResponse, Decoded};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

/// Pause after a failed accept
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Control-channel server
pub struct ControlServer {
    service: NotificationService,
}

impl ControlServer {
    pub fn new(service: NotificationService) -> Self {
        Self { service }
    }

    /// Bind, replacing any socket file left by an earlier run
    pub fn bind(socket_path: &Path) -> Result<UnixListener> {
        match std::fs::remove_file(socket_path) {
            Ok(()) => debug!("Removed stale socket {:?}", socket_path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove stale socket {:?}: {}", socket_path, e),
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("binding control socket {:?}", socket_path))?;
        info!("Control socket: {:?}", socket_path);
        Ok(listener)
    }

    /// Accept connections forever, one task per client
    pub async fn serve(&self, listener: UnixListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let service = self.service.clone();

                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, &service).await {
                            error!("Control error: {:#}", e);
                        }
                    });
                }
                Err(e) => pause_after_accept_error(&e).await,
            }
        }
    }
}

async fn pause_after_accept_error(e: &std::io::Error) {
    error!("Accept error: {}", e);
    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
}

/// Removes the socket file when the daemon shuts down
pub struct SocketGuard(pub PathBuf);

impl Drop for SocketGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

async fn handle_client(stream: UnixStream, service: &NotificationService) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    if reader.read_line(&mut line).await? == 0 {
        return Ok(());
    }

    let response = match decode_request(&line).context("malformed control request")? {
        Decoded::Request(request) => process_request(request, service).await,
        Decoded::Unknown(cmd) => {
            debug!("Unknown control command {:?}", cmd);
            ControlResponse::unknown_command()
        }
    };

    let mut response_json = serde_json::to_string(&response)?;
    response_json.push('\n');
    writer.write_all(response_json.as_bytes()).await?;
    writer.flush().await?;
    writer.shutdown().await?;

    Ok(())
}

async fn process_request(request: ControlRequest, service: &NotificationService) -> ControlResponse {
    match request {
        ControlRequest::GetHistory => {
            let snapshot = service.snapshot().await;
            ControlResponse::History {
                history: snapshot.history,
                dnd: snapshot.dnd,
            }
        }

        ControlRequest::SetDnd { value } => {
            let dnd = service.set_dnd(value).await;
            ControlResponse::Dnd { ok: true, dnd }
        }

        ControlRequest::ClearHistory => {
            service.clear_history().await;
            ControlResponse::ok()
        }

        ControlRequest::Delete { id } => {
            if let Some(id) = id {
                service.delete_from_history(id).await;
            }
            ControlResponse::ok()
        }

        ControlRequest::Action { id, action } => {
            // id 0 never names a notification
            if id > 0 {
                service.invoke_action(id, &action).await;
            }
            ControlResponse::ok()
        }

        ControlRequest::Close { id } => {
            service.close(id).await;
            ControlResponse::ok()
        }
    }
}
