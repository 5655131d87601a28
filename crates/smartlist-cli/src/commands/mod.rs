pub mod config;
pub mod daemon;
pub mod lists;
pub mod process;

use color_eyre::Result;
use smartlist_config::{Config, PathManager};
use smartlist_core::{JobHost, JsonListRepository, ListProcessor, ListRepository};
use smartlist_sources::TraktClient;
use std::sync::Arc;

/// Load and validate `config.toml`
pub fn load_config(paths: &PathManager) -> Result<Config> {
    let config_file = paths.config_file();
    if !config_file.exists() {
        return Err(color_eyre::eyre::eyre!(
            "Configuration file not found at {}. Run 'smartlist config init' first.",
            config_file.display()
        ));
    }
    let config = Config::load_from_file(&config_file).map_err(|e| {
        color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e)
    })?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;
    Ok(config)
}

pub fn open_repository(paths: &PathManager) -> Arc<dyn ListRepository> {
    Arc::new(JsonListRepository::new(paths.lists_file()))
}

/// Processor wired to Trakt for both catalog searches and list storage
pub fn build_processor(
    config: &Config,
    repository: Arc<dyn ListRepository>,
    host: Arc<dyn JobHost>,
) -> Arc<ListProcessor> {
    let trakt = Arc::new(TraktClient::new(&config.trakt));
    Arc::new(ListProcessor::new(
        trakt.clone(),
        trakt,
        repository,
        host,
        config.engine.clone(),
    ))
}
