//! Control-channel client
//!
//! Used by the status-bar bridge. Every call opens a fresh connection and
//! is bounded by a short timeout so a stuck daemon cannot hang the bar.

use crate::protocol::{ControlRequest, ControlResponse, HistorySnapshot};
use crate::{paths, Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::debug;

/// Default bound on connect + request + response
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Control-channel client
#[derive(Debug, Clone)]
pub struct ControlClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl ControlClient {
    /// Create a client for the session's default socket
    pub fn new() -> Self {
        Self::with_socket(paths::socket_path())
    }

    /// Create a client with custom socket path
    pub fn with_socket(path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read history and the DND flag
    pub async fn get_history(&self) -> Result<HistorySnapshot> {
        match self.send(&ControlRequest::GetHistory).await? {
            ControlResponse::History { history, dnd } => Ok(HistorySnapshot { history, dnd }),
            other => Err(unexpected(other)),
        }
    }

    /// Set the DND flag, returning the value the daemon now holds
    pub async fn set_dnd(&self, value: bool) -> Result<bool> {
        match self.send(&ControlRequest::SetDnd { value }).await? {
            ControlResponse::Dnd { dnd, .. } => Ok(dnd),
            other => Err(unexpected(other)),
        }
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.expect_ok(&ControlRequest::ClearHistory).await
    }

    pub async fn delete(&self, id: u32) -> Result<()> {
        self.expect_ok(&ControlRequest::Delete { id: Some(id) }).await
    }

    pub async fn invoke_action(&self, id: u32, action: impl Into<String>) -> Result<()> {
        self.expect_ok(&ControlRequest::Action {
            id,
            action: action.into(),
        })
        .await
    }

    pub async fn close(&self, id: u32) -> Result<()> {
        self.expect_ok(&ControlRequest::Close { id }).await
    }

    async fn expect_ok(&self, request: &ControlRequest) -> Result<()> {
        match self.send(request).await? {
            ControlResponse::Ok { .. } => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Send one request and read one response line
    pub async fn send(&self, request: &ControlRequest) -> Result<ControlResponse> {
        tokio::time::timeout(self.timeout, self.exchange(request))
            .await
            .map_err(|_| Error::Timeout)?
    }

    async fn exchange(&self, request: &ControlRequest) -> Result<ControlResponse> {
        let mut stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ServiceUnavailable
            } else {
                Error::ConnectionFailed(e.to_string())
            }
        })?;

        let mut request_json = serde_json::to_string(request)?;
        request_json.push('\n');
        debug!("control request: {}", request_json.trim_end());

        stream.write_all(request_json.as_bytes()).await?;
        stream.flush().await?;

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Err(Error::ProtocolError("connection closed without response".into()));
        }

        Ok(serde_json::from_str(&line)?)
    }
}

impl Default for ControlClient {
    fn default() -> Self {
        Self::new()
    }
}

fn unexpected(response: ControlResponse) -> Error {
    match response {
        ControlResponse::Error { error } => Error::RequestFailed(error),
        other => Error::ProtocolError(format!("Unexpected response: {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::net::UnixListener;

    /// Accept one connection, check the request line, reply with `reply`
    async fn serve_once(listener: UnixListener, expect: &'static str, reply: &'static str) {
        let (stream, _) = listener.accept().await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        assert_eq!(line.trim_end(), expect);
        if !reply.is_empty() {
            writer.write_all(reply.as_bytes()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_get_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ctl.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let server = tokio::spawn(serve_once(
            listener,
            r#"{"cmd":"get_history"}"#,
            "{\"history\":[],\"dnd\":true}\n",
        ));

        let snapshot = ControlClient::with_socket(&path).get_history().await.unwrap();
        assert!(snapshot.history.is_empty());
        assert!(snapshot.dnd);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_error_response() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ctl.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let server = tokio::spawn(serve_once(
            listener,
            r#"{"cmd":"clear_history"}"#,
            "{\"error\":\"unknown command\"}\n",
        ));

        let err = ControlClient::with_socket(&path).clear_history().await.unwrap_err();
        assert!(matches!(err, Error::RequestFailed(msg) if msg == "unknown command"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_socket() {
        let dir = tempdir().unwrap();
        let client = ControlClient::with_socket(dir.path().join("absent.sock"));
        assert!(matches!(client.get_history().await, Err(Error::ServiceUnavailable)));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ctl.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let _server = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = ControlClient::with_socket(&path).with_timeout(Duration::from_millis(100));
        assert!(matches!(client.get_history().await, Err(Error::Timeout)));
    }
}
