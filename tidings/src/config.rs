//! Tidings configuration

use crate::history::DEFAULT_MAX_SIZE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TidingsConfig {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub popup: PopupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_size")]
    pub max_size: usize,
    /// Defaults to `$XDG_DATA_HOME/qs-notifications/history.json`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: default_history_size(),
            path: None,
        }
    }
}

impl HistoryConfig {
    pub fn file_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(libtidings_ipc::paths::history_path)
    }
}

fn default_history_size() -> usize { DEFAULT_MAX_SIZE }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_popup_command")]
    pub command: String,
    #[serde(default = "default_popup_args")]
    pub args: Vec<String>,
    /// Environment variable that carries the notification JSON
    #[serde(default = "default_env_var")]
    pub env_var: String,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_popup_command(),
            args: default_popup_args(),
            env_var: default_env_var(),
        }
    }
}

fn default_popup_command() -> String { "quickshell".into() }

fn default_popup_args() -> Vec<String> {
    let qml = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quickshell/notifications/popup.qml");
    vec!["-p".into(), qml.display().to_string()]
}

fn default_env_var() -> String { "QS_NOTIF_DATA".into() }

fn default_true() -> bool { true }

/// `$XDG_CONFIG_HOME/tidings/tidings.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tidings/tidings.yaml")
}

pub fn load_config(path: &Path) -> Result<TidingsConfig> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {:?}", path))?;
        serde_yaml::from_str(&contents).with_context(|| format!("parsing {:?}", path))
    } else {
        Ok(TidingsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.history.max_size, 100);
        assert!(config.popup.enabled);
        assert_eq!(config.popup.command, "quickshell");
        assert_eq!(config.popup.env_var, "QS_NOTIF_DATA");
        assert!(config.history.file_path().ends_with("qs-notifications/history.json"));
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tidings.yaml");
        std::fs::write(
            &path,
            "history:\n  path: /tmp/h.json\npopup:\n  enabled: false\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.history.max_size, 100);
        assert_eq!(config.history.file_path(), PathBuf::from("/tmp/h.json"));
        assert!(!config.popup.enabled);
        assert_eq!(config.popup.args[0], "-p");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tidings.yaml");
        std::fs::write(&path, "history: [not, a, map]\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
