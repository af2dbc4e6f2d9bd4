//! Control-channel wire types
//!
//! One request line of JSON, one response line of JSON, per connection.
//! Requests are tagged by a `cmd` field; responses are plain objects whose
//! shape depends on the command.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Notification record as stored in history and handed to popups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u32,
    pub app_name: String,
    pub app_icon: String,
    pub summary: String,
    pub body: String,
    pub actions: Vec<NotificationAction>,
    /// Local time, ISO-8601
    pub timestamp: String,
    pub urgency: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub id: String,
    pub label: String,
}

/// Control request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ControlRequest {
    /// Read history and the DND flag
    GetHistory,

    /// Set the DND flag
    SetDnd {
        #[serde(default)]
        value: bool,
    },

    /// Drop all history
    ClearHistory,

    /// Drop history entries with the given id
    Delete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u32>,
    },

    /// Raise `ActionInvoked` on the bus
    Action {
        #[serde(default)]
        id: u32,
        #[serde(default)]
        action: String,
    },

    /// Same as a bus `CloseNotification` call
    Close { id: u32 },
}

impl ControlRequest {
    /// Every `cmd` value the daemon understands
    pub const COMMANDS: &'static [&'static str] = &[
        "get_history",
        "set_dnd",
        "clear_history",
        "delete",
        "action",
        "close",
    ];
}

/// Outcome of decoding one request line
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Request(ControlRequest),
    /// Well-formed, but `cmd` names nothing we know
    Unknown(String),
}

/// Decode a request line.
///
/// Malformed input (not a JSON object, no string `cmd`, or bad fields for
/// a known command) is an error; an unrecognized `cmd` is not.
pub fn decode_request(line: &str) -> Result<Decoded> {
    let value: serde_json::Value = serde_json::from_str(line.trim())?;

    let cmd = value
        .get("cmd")
        .and_then(|c| c.as_str())
        .ok_or_else(|| Error::ProtocolError("missing cmd".into()))?;

    if !ControlRequest::COMMANDS.contains(&cmd) {
        return Ok(Decoded::Unknown(cmd.to_string()));
    }

    Ok(Decoded::Request(serde_json::from_value(value)?))
}

/// Control response
///
/// Untagged: variants are tried in order when decoding, so the ones with
/// more required fields come first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlResponse {
    History { history: Vec<Notification>, dnd: bool },
    Dnd { ok: bool, dnd: bool },
    Ok { ok: bool },
    Error { error: String },
}

impl ControlResponse {
    pub fn ok() -> Self {
        Self::Ok { ok: true }
    }

    pub fn unknown_command() -> Self {
        Self::Error {
            error: "unknown command".into(),
        }
    }
}

/// History and DND flag as returned by `get_history`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub history: Vec<Notification>,
    pub dnd: bool,
}
