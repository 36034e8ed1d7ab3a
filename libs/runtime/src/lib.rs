//! Process-level runtime support: layered configuration, home-dir
//! resolution and logging initialization.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, LoggingConfig, Section, ServerConfig,
};
pub use paths::home_dir::{resolve_home_dir, HomeDirError};
