//! Status-bar rendering and bridge-local state

use anyhow::{Context, Result};
use libtidings_ipc::{HistorySnapshot, Notification};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Entries listed in the tooltip
const TOOLTIP_RECENT: usize = 5;
/// Summary characters shown per tooltip entry
const SUMMARY_CHARS: usize = 30;

/// What the bridge remembers between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeState {
    /// History length the user last acknowledged
    #[serde(default)]
    pub seen_count: usize,
}

impl BridgeState {
    /// Missing or unreadable state means nothing has been seen yet
    pub fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        std::fs::write(path, serde_json::to_string(self)?)
            .with_context(|| format!("writing {:?}", path))?;
        Ok(())
    }
}

/// Waybar custom-module output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarOutput {
    pub text: String,
    pub alt: String,
    pub tooltip: String,
    pub class: String,
}

pub fn icon_class(dnd: bool, unseen: usize) -> &'static str {
    match (dnd, unseen > 0) {
        (true, true) => "dnd-notification",
        (true, false) => "dnd-none",
        (false, true) => "notification",
        (false, false) => "none",
    }
}

pub fn render(snapshot: &HistorySnapshot, seen_count: usize) -> BarOutput {
    let total = snapshot.history.len();
    let unseen = total.saturating_sub(seen_count);
    let class = icon_class(snapshot.dnd, unseen);

    BarOutput {
        text: String::new(),
        alt: class.to_string(),
        tooltip: tooltip(&snapshot.history, unseen, snapshot.dnd),
        class: class.to_string(),
    }
}

fn tooltip(history: &[Notification], unseen: usize, dnd: bool) -> String {
    if history.is_empty() {
        return "No notifications".to_string();
    }

    let mut header = format!("Notifications: {}", history.len());
    if unseen > 0 {
        header.push_str(&format!(" ({} unread)", unseen));
    }

    let mut lines = vec![header];
    if dnd {
        lines.push("Do not disturb is on".to_string());
    }
    lines.push(String::new());

    let start = history.len().saturating_sub(TOOLTIP_RECENT);
    for n in &history[start..] {
        let app = n.app_name.as_str();
        let summary: String = n.summary.chars().take(SUMMARY_CHARS).collect();

        if summary.is_empty() {
            lines.push(app.to_string());
        } else {
            lines.push(format!("{}: {}", app, summary));
        }
    }

    lines.join("\n")
}
