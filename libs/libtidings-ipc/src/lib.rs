//! # libtidings-ipc
//!
//! Control-channel protocol shared by the Tidings notification daemon and
//! the status-bar bridge.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use libtidings_ipc::ControlClient;
//!
//! # async fn demo() -> libtidings_ipc::Result<()> {
//! let client = ControlClient::new();
//! let snapshot = client.get_history().await?;
//! println!("{} notifications, dnd={}", snapshot.history.len(), snapshot.dnd);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod paths;
pub mod protocol;

pub use client::ControlClient;
pub use protocol::{ControlRequest, ControlResponse, HistorySnapshot, Notification, NotificationAction};

/// Common errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Timeout")]
    Timeout,
    #[error("Service unavailable")]
    ServiceUnavailable,
    #[error("Protocol error: {0}")]
    ProtocolError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
