//! Notification history and its on-disk copy

use crate::notification::Notification;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, error, warn};

/// Entries kept on disk
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Append-only notification log, oldest first. Only the latest `max_size`
/// entries are ever written to disk.
pub struct NotificationHistory {
    entries: Vec<Notification>,
    max_size: usize,
    file_path: PathBuf,
}

impl NotificationHistory {
    pub fn new(max_size: usize, file_path: PathBuf) -> Self {
        Self {
            entries: Vec::new(),
            max_size,
            file_path,
        }
    }

    /// Start from nothing: history never survives a daemon restart, so any
    /// file left by a previous run is removed.
    pub async fn load(&mut self) {
        self.entries.clear();

        match tokio::fs::remove_file(&self.file_path).await {
            Ok(()) => debug!("Discarded previous history at {:?}", self.file_path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove old history {:?}: {}", self.file_path, e),
        }
    }

    /// Write the latest `max_size` entries as a JSON array
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {:?}", parent))?;
        }

        let content = serde_json::to_string(self.tail())?;
        tokio::fs::write(&self.file_path, content)
            .await
            .with_context(|| format!("writing {:?}", self.file_path))?;
        Ok(())
    }

    /// Save, logging instead of returning failures
    pub async fn persist(&self) {
        if let Err(e) = self.save().await {
            error!("Failed to save history: {:#}", e);
        }
    }

    pub fn push(&mut self, notification: Notification) {
        self.entries.push(notification);
    }

    fn tail(&self) -> &[Notification] {
        &self.entries[self.entries.len().saturating_sub(self.max_size)..]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every entry carrying `id`, returning how many went
    pub fn remove_id(&mut self, id: u32) -> usize {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        before - self.entries.len()
    }

    /// Oldest first
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    #[cfg(test)]
    pub fn contains_id(&self, id: u32) -> bool {
        self.entries.iter().any(|n| n.id == id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotifyRequest;
    use std::path::Path;
    use tempfile::tempdir;

    fn entry(id: u32) -> Notification {
        NotifyRequest::new("test", &format!("n{}", id)).into_notification(id)
    }

    async fn read_back(path: &Path) -> Vec<Notification> {
        let content = tokio::fs::read_to_string(path).await.unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[tokio::test]
    async fn test_save_keeps_latest_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/history.json");
        let mut history = NotificationHistory::new(DEFAULT_MAX_SIZE, path.clone());

        for id in 1..=150 {
            history.push(entry(id));
        }
        history.save().await.unwrap();

        let saved = read_back(&path).await;
        assert_eq!(saved.len(), 100);
        assert_eq!(saved.first().unwrap().id, 51);
        assert_eq!(saved.last().unwrap().id, 150);
        assert!(saved.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_load_discards_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        tokio::fs::write(&path, r#"[{"bogus": true}]"#).await.unwrap();

        let mut history = NotificationHistory::new(DEFAULT_MAX_SIZE, path.clone());
        history.push(entry(1));
        history.load().await;

        assert!(history.is_empty());
        assert!(!path.exists());

        // no file at all is fine too
        history.load().await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_persist_swallows_errors() {
        let dir = tempdir().unwrap();
        // parent is a regular file, so create_dir_all fails
        let blocker = dir.path().join("blocker");
        tokio::fs::write(&blocker, "").await.unwrap();

        let mut history = NotificationHistory::new(DEFAULT_MAX_SIZE, blocker.join("history.json"));
        history.push(entry(1));
        assert!(history.save().await.is_err());
        history.persist().await;
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_remove_id() {
        let mut history = NotificationHistory::new(DEFAULT_MAX_SIZE, PathBuf::from("/unused"));
        history.push(entry(1));
        history.push(entry(2));
        history.push(entry(1));

        assert_eq!(history.remove_id(1), 2);
        assert_eq!(history.len(), 1);
        assert!(!history.contains_id(1));
        assert_eq!(history.remove_id(9), 0);
    }

    #[tokio::test]
    async fn test_memory_keeps_what_the_file_drops() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut history = NotificationHistory::new(3, path.clone());
        for id in 1..=20 {
            history.push(entry(id));
        }
        history.save().await.unwrap();

        assert_eq!(history.len(), 20);
        assert!(history.contains_id(1));

        let ids: Vec<u32> = read_back(&path).await.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![18, 19, 20]);
    }
}
