// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the blob storage connection string.
pub const CONNECTION_STRING_ENV: &str = "BlobStorageConnectionString";

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub source: SourceConfig,
    pub storage: StorageConfig,
    pub scheduler: SchedulerConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub container: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub cron_expression: String,
    pub target_user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl StorageConfig {
    /// Apply a `key=value;key=value` connection string on top of this config.
    ///
    /// Recognized keys (case-insensitive): `endpoint`, `access_key`, `secret_key`,
    /// `region`, `container`. Empty segments are skipped.
    pub fn apply_connection_string(&mut self, connection_string: &str) -> Result<(), ConfigError> {
        for segment in connection_string.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                ConfigError::Message(format!(
                    "Invalid connection string segment '{}': expected key=value",
                    segment
                ))
            })?;
            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => self.endpoint = value.trim().to_string(),
                "access_key" => self.access_key = value.trim().to_string(),
                "secret_key" => self.secret_key = value.trim().to_string(),
                "region" => self.region = value.trim().to_string(),
                "container" => self.container = value.trim().to_string(),
                other => {
                    return Err(ConfigError::Message(format!(
                        "Unknown connection string key '{}'",
                        other
                    )))
                }
            }
        }
        Ok(())
    }
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let mut settings: Settings = config.try_deserialize()?;

        // The connection string env var overrides the storage section wholesale
        if let Ok(connection_string) = std::env::var(CONNECTION_STRING_ENV) {
            settings.storage.apply_connection_string(&connection_string)?;
        }

        Ok(settings)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.source.url.is_empty() {
            return Err("Source URL cannot be empty".to_string());
        }
        if !self.source.url.starts_with("http://") && !self.source.url.starts_with("https://") {
            return Err(format!("Source URL '{}' must be http(s)", self.source.url));
        }
        if self.source.timeout_seconds == 0 {
            return Err("Source timeout_seconds must be greater than 0".to_string());
        }

        if self.storage.endpoint.is_empty() {
            return Err("Storage endpoint cannot be empty".to_string());
        }
        if self.storage.container.is_empty() {
            return Err("Storage container cannot be empty".to_string());
        }

        if self.scheduler.cron_expression.is_empty() {
            return Err("Scheduler cron_expression cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                url: "https://jsonplaceholder.typicode.com/posts".to_string(),
                timeout_seconds: 30,
            },
            storage: StorageConfig {
                endpoint: "http://localhost:9000".to_string(),
                access_key: "minioadmin".to_string(),
                secret_key: "minioadmin".to_string(),
                region: "us-east-1".to_string(),
                container: "filtered-posts".to_string(),
            },
            scheduler: SchedulerConfig {
                cron_expression: "*/30 * * * * *".to_string(),
                target_user_id: 1,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}
