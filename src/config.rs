use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{KoboError, Result};

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the persisted upload cache
    pub cache_dir: String,
    /// Uploads above this size are accepted with a warning
    pub soft_size_limit_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub default_format: String,
    pub output_directory: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                cache_dir: ".kobo_cache".to_string(),
                soft_size_limit_mb: 50,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            export: ExportConfig {
                default_format: "csv".to_string(),
                output_directory: "./output".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();
        for (key, value) in Self::default().defaults() {
            builder = builder.set_default(key, value)?;
        }

        let app_config: Self = builder
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("config").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("KOBO_READER").separator("__"))
            .build()?
            .try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.storage.cache_dir.trim().is_empty() {
            return Err(KoboError::InvalidConfig("cache_dir must not be empty".to_string()));
        }
        if self.storage.soft_size_limit_mb == 0 {
            return Err(KoboError::InvalidConfig(
                "soft_size_limit_mb must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(KoboError::InvalidConfig(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            )));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(KoboError::InvalidConfig(format!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format, valid_formats
            )));
        }

        let valid_formats = ["csv", "json"];
        if !valid_formats.contains(&self.export.default_format.as_str()) {
            return Err(KoboError::InvalidConfig(format!(
                "Invalid export format: {}. Must be one of: {:?}",
                self.export.default_format, valid_formats
            )));
        }

        Ok(())
    }

    /// Cache directory; override with `KOBO_READER__STORAGE__CACHE_DIR`
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.cache_dir)
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }

    /// Flatten into `section.key` pairs for the config builder
    fn defaults(self) -> Vec<(&'static str, config::Value)> {
        let mut pairs = vec![
            ("storage.cache_dir", config::Value::from(self.storage.cache_dir)),
            ("storage.soft_size_limit_mb", config::Value::from(self.storage.soft_size_limit_mb)),
            ("logging.level", config::Value::from(self.logging.level)),
            ("logging.format", config::Value::from(self.logging.format)),
            ("export.default_format", config::Value::from(self.export.default_format)),
            ("export.output_directory", config::Value::from(self.export.output_directory)),
        ];
        if let Some(file_path) = self.logging.file_path {
            pairs.push(("logging.file_path", config::Value::from(file_path)));
        }
        pairs
    }
}
