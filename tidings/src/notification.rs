//! Notification types and request decoding

pub use libtidings_ipc::protocol::{Notification, NotificationAction};

use chrono::{Local, SecondsFormat};
use std::collections::HashMap;
use zbus::zvariant::{OwnedValue, Value};

/// Urgency used when the `urgency` hint is absent or unusable (normal)
pub const DEFAULT_URGENCY: u8 = 1;

/// Hint value carried in the `a{sv}` hints map.
///
/// Only the scalar shapes notification senders actually use are kept;
/// image data and other containers are dropped while decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum HintValue {
    Byte(u8),
    Int(i64),
    Uint(u64),
    Bool(bool),
    String(String),
}

pub type Hints = HashMap<String, HintValue>;

impl HintValue {
    pub fn from_variant(value: &Value<'_>) -> Option<Self> {
        match value {
            Value::U8(b) => Some(Self::Byte(*b)),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::I16(i) => Some(Self::Int(i64::from(*i))),
            Value::I32(i) => Some(Self::Int(i64::from(*i))),
            Value::I64(i) => Some(Self::Int(*i)),
            Value::U16(u) => Some(Self::Uint(u64::from(*u))),
            Value::U32(u) => Some(Self::Uint(u64::from(*u))),
            Value::U64(u) => Some(Self::Uint(*u)),
            Value::Str(s) => Some(Self::String(s.as_str().to_owned())),
            Value::Value(inner) => Self::from_variant(inner),
            _ => None,
        }
    }

    /// Interpret as an urgency level. Integers outside `0..=255` are rejected.
    pub fn as_urgency(&self) -> Option<u8> {
        match self {
            Self::Byte(b) => Some(*b),
            Self::Int(i) => u8::try_from(*i).ok(),
            Self::Uint(u) => u8::try_from(*u).ok(),
            _ => None,
        }
    }
}

/// Decode a raw bus hints map, skipping values we do not model
pub fn decode_hints(raw: &HashMap<String, OwnedValue>) -> Hints {
    raw.iter()
        .filter_map(|(key, value)| HintValue::from_variant(value).map(|v| (key.clone(), v)))
        .collect()
}

/// Urgency from the hints map, falling back to normal
pub fn urgency_from_hints(hints: &Hints) -> u8 {
    hints
        .get("urgency")
        .and_then(HintValue::as_urgency)
        .unwrap_or(DEFAULT_URGENCY)
}

/// Pair a flat `[id0, label0, id1, label1, ...]` list.
/// A trailing id without a label is dropped.
pub fn pair_actions(flat: &[String]) -> Vec<NotificationAction> {
    flat.chunks_exact(2)
        .map(|pair| NotificationAction {
            id: pair[0].clone(),
            label: pair[1].clone(),
        })
        .collect()
}

/// Current local time in ISO-8601 with offset
pub fn timestamp_now() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Arguments of a `Notify` call
#[derive(Debug, Clone, Default)]
pub struct NotifyRequest {
    pub app_name: String,
    pub replaces_id: u32,
    pub app_icon: String,
    pub summary: String,
    pub body: String,
    pub actions: Vec<String>,
    pub hints: Hints,
}

#[cfg(test)]
impl NotifyRequest {
    pub fn new(app_name: &str, summary: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            summary: summary.to_string(),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.app_icon = icon.to_string();
        self
    }

    pub fn with_actions(mut self, actions: &[&str]) -> Self {
        self.actions = actions.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_hint(mut self, key: &str, value: HintValue) -> Self {
        self.hints.insert(key.to_string(), value);
        self
    }

    pub fn replacing(mut self, id: u32) -> Self {
        self.replaces_id = id;
        self
    }
}

impl NotifyRequest {
    /// Build the stored record under the given id
    pub fn into_notification(self, id: u32) -> Notification {
        let urgency = urgency_from_hints(&self.hints);

        Notification {
            id,
            app_name: self.app_name,
            app_icon: self.app_icon,
            summary: self.summary,
            body: self.body,
            actions: pair_actions(&self.actions),
            timestamp: timestamp_now(),
            urgency,
        }
    }
}

/// `NotificationClosed` reason for a notification closed by a
/// `CloseNotification` call. Popups own expiry and dismissal, so the daemon
/// never sends the other codes.
pub const CLOSED_BY_CALL: u32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_actions_drops_trailing() {
        let flat: Vec<String> = ["default", "Open", "reply", "Reply", "orphan"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let actions = pair_actions(&flat);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].id, "default");
        assert_eq!(actions[0].label, "Open");
        assert_eq!(actions[1].id, "reply");
        assert!(pair_actions(&flat[..1]).is_empty());
    }

    #[test]
    fn test_urgency_extraction() {
        let mut hints = Hints::new();
        assert_eq!(urgency_from_hints(&hints), 1);

        hints.insert("urgency".into(), HintValue::Byte(2));
        assert_eq!(urgency_from_hints(&hints), 2);

        hints.insert("urgency".into(), HintValue::Uint(0));
        assert_eq!(urgency_from_hints(&hints), 0);

        hints.insert("urgency".into(), HintValue::Int(300));
        assert_eq!(urgency_from_hints(&hints), 1);

        hints.insert("urgency".into(), HintValue::String("critical".into()));
        assert_eq!(urgency_from_hints(&hints), 1);
    }

    #[test]
    fn test_hint_from_variant() {
        assert_eq!(HintValue::from_variant(&Value::U8(2)), Some(HintValue::Byte(2)));
        assert_eq!(HintValue::from_variant(&Value::I32(-5)), Some(HintValue::Int(-5)));
        assert_eq!(HintValue::from_variant(&Value::Bool(true)), Some(HintValue::Bool(true)));
        assert_eq!(
            HintValue::from_variant(&Value::from("im.message")),
            Some(HintValue::String("im.message".into()))
        );
        assert_eq!(HintValue::from_variant(&Value::F64(0.5)), None);
    }

    #[test]
    fn test_into_notification() {
        let n = NotifyRequest::new("Mail", "New message")
            .with_icon("mail-unread")
            .with_body("You have 1 unread")
            .with_actions(&["default", "Open"])
            .with_hint("urgency", HintValue::Byte(0))
            .into_notification(7);

        assert_eq!(n.id, 7);
        assert_eq!(n.app_icon, "mail-unread");
        assert_eq!(n.urgency, 0);
        assert_eq!(n.actions.len(), 1);
        assert!(chrono::DateTime::parse_from_rfc3339(&n.timestamp).is_ok());
    }

    #[test]
    fn test_close_reason_is_closed_by_call() {
        assert_eq!(CLOSED_BY_CALL, 3);
    }
}
