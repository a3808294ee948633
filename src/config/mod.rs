// Configuration module

mod models;

pub use models::*;

use crate::error::Result;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest)
    /// 2. Config file (`--config` override, else `~/.rategate/config.toml`)
    /// 3. Defaults (lowest)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?);

        // An explicitly passed file must exist; the default path is optional.
        let builder = match config_path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name(&Self::default_config_path()).required(false)),
        };

        let config = builder
            // Override with environment variables (RATEGATE_SERVER__PORT etc.)
            .add_source(Environment::with_prefix("RATEGATE").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rategate")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}
