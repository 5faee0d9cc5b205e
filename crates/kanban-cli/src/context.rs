use kanban_core::AppConfig;
use kanban_engine::EngineConfig;
use kanban_persistence::JsonFileStore;
use std::path::PathBuf;
use std::sync::Arc;

pub struct CliContext {
    pub store: Arc<JsonFileStore>,
    pub engine_config: EngineConfig,
}

impl CliContext {
    /// `--file` wins, then `default_file` from the config file.
    pub fn open(file: Option<PathBuf>, config: &AppConfig) -> anyhow::Result<Self> {
        let path = file
            .or_else(|| config.default_file.clone())
            .ok_or_else(|| anyhow::anyhow!("--file is required for CLI operations"))?;
        tracing::debug!("Using board file {}", path.display());

        Ok(Self {
            store: Arc::new(JsonFileStore::new(path)),
            engine_config: EngineConfig::from(config),
        })
    }
}
