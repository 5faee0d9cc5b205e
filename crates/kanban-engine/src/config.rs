use kanban_core::AppConfig;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// A reorder still in flight after this long is treated as rejected.
    pub commit_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for EngineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            commit_timeout: config.effective_commit_timeout(),
        }
    }
}

impl EngineConfig {
    pub fn with_commit_timeout(mut self, commit_timeout: Duration) -> Self {
        self.commit_timeout = commit_timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_app_default_timeout() {
        assert_eq!(
            EngineConfig::default().commit_timeout,
            Duration::from_millis(5_000)
        );
    }

    #[test]
    fn app_config_timeout_carries_over() {
        let app = AppConfig {
            commit_timeout_ms: Some(250),
            ..Default::default()
        };
        assert_eq!(
            EngineConfig::from(&app).commit_timeout,
            Duration::from_millis(250)
        );
    }
}
