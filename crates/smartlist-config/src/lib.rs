pub mod config;
pub mod paths;

pub use config::{Config, EngineConfig, LoggingConfig, SchedulerConfig, TraktConfig, default_scheduler_config};
pub use paths::{PathManager, container_base_path};
