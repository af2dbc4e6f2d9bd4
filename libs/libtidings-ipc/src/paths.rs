//! Well-known filesystem locations
//!
//! Names match the ones the QuickShell popups and bar widgets already use,
//! so either side can be swapped independently.

use std::path::PathBuf;

/// Directory name used under the data and cache roots
pub const APP_DIR: &str = "qs-notifications";

/// Control socket file name inside the runtime directory
pub const SOCKET_NAME: &str = "qs-notifications.sock";

/// Control socket for the current session (`$XDG_RUNTIME_DIR`, else the temp dir)
pub fn socket_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(SOCKET_NAME)
}

/// Persisted notification history (`$XDG_DATA_HOME/qs-notifications/history.json`)
pub fn history_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join("history.json")
}

/// Bridge-local state such as the seen count (`$XDG_CACHE_HOME/qs-notifications/state.json`)
pub fn bridge_state_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join("state.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert!(socket_path().ends_with(SOCKET_NAME));
        assert!(history_path().ends_with("qs-notifications/history.json"));
        assert!(bridge_state_path().ends_with("qs-notifications/state.json"));
    }
}
