use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `trakt.access_token`
pub const TRAKT_TOKEN_ENV: &str = "SMARTLIST_TRAKT_TOKEN";

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub trakt: TraktConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TraktConfig {
    pub client_id: String,
    #[serde(default)]
    pub access_token: String,
    /// Account owning the upstream lists
    pub username: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

/// Batching and pacing knobs for list processing.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Items per add/remove call
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Pause after every manual-roster lookup
    #[serde(default = "default_lookup_delay_ms")]
    pub lookup_delay_ms: u64,
    /// Delay before a chained processing cycle
    #[serde(default = "default_requeue_delay_secs")]
    pub requeue_delay_secs: u64,
    /// Lists processed concurrently by the local job host
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl EngineConfig {
    pub fn lookup_delay(&self) -> Duration {
        Duration::from_millis(self.lookup_delay_ms)
    }

    pub fn requeue_delay(&self) -> Duration {
        Duration::from_secs(self.requeue_delay_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            lookup_delay_ms: default_lookup_delay_ms(),
            requeue_delay_secs: default_requeue_delay_secs(),
            workers: default_workers(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SchedulerConfig {
    /// Cron expression with a leading seconds field
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    "https://api.trakt.tv".to_string()
}

fn default_chunk_size() -> usize {
    100
}

fn default_lookup_delay_ms() -> u64 {
    1000
}

fn default_requeue_delay_secs() -> u64 {
    30
}

fn default_workers() -> usize {
    2
}

fn default_schedule() -> String {
    "0 0 */6 * * *".to_string() // Every 6 hours
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        schedule: default_schedule(),
        run_on_startup: default_true(),
    }
}

impl Config {
    /// Starter configuration written by `smartlist config init`
    pub fn template() -> Self {
        Self {
            trakt: TraktConfig {
                client_id: "YOUR_CLIENT_ID".to_string(),
                access_token: String::new(),
                username: "YOUR_USERNAME".to_string(),
                api_url: default_api_url(),
            },
            engine: EngineConfig::default(),
            scheduler: Some(default_scheduler_config()),
            logging: LoggingConfig::default(),
        }
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(TRAKT_TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.trakt.access_token = token.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.trakt.client_id.is_empty() || self.trakt.client_id == "YOUR_CLIENT_ID" {
            return Err(anyhow::anyhow!("trakt.client_id must be set"));
        }
        if self.trakt.username.is_empty() || self.trakt.username == "YOUR_USERNAME" {
            return Err(anyhow::anyhow!("trakt.username must be set"));
        }
        if self.trakt.access_token.is_empty() {
            return Err(anyhow::anyhow!(
                "trakt.access_token must be set (or export {})",
                TRAKT_TOKEN_ENV
            ));
        }
        if self.engine.chunk_size == 0 {
            return Err(anyhow::anyhow!("engine.chunk_size must be at least 1"));
        }
        if self.engine.workers == 0 {
            return Err(anyhow::anyhow!("engine.workers must be at least 1"));
        }
        Ok(())
    }

    pub fn scheduler_or_default(&self) -> SchedulerConfig {
        self.scheduler.clone().unwrap_or_else(default_scheduler_config)
    }
}
