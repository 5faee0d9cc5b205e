use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_COMMIT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// How long a reorder may stay in flight before it counts as failed.
    #[serde(default)]
    pub commit_timeout_ms: Option<u64>,
    /// Board file used when neither `--file` nor `KANBAN_FILE` is given.
    #[serde(default)]
    pub default_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/kanban/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("kanban/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("kanban\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Read a config file, falling back to defaults when it is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Could not read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn effective_commit_timeout(&self) -> Duration {
        Duration::from_millis(self.commit_timeout_ms.unwrap_or(DEFAULT_COMMIT_TIMEOUT_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_when_file_missing() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml"));
        assert_eq!(config.effective_commit_timeout(), Duration::from_secs(5));
        assert!(config.default_file.is_none());
    }

    #[test]
    fn reads_timeout_and_default_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "commit_timeout_ms = 250\ndefault_file = \"/tmp/board.json\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.effective_commit_timeout(), Duration::from_millis(250));
        assert_eq!(config.default_file, Some(PathBuf::from("/tmp/board.json")));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "commit_timeout_ms = \"soon\"").unwrap();

        let config = AppConfig::load_from(&path);
        assert!(config.commit_timeout_ms.is_none());
    }
}
