use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::load::schema::{FieldMapping, TableSchema};

/// Errors raised while assembling the pipeline configuration.
///
/// All of these are startup-time failures: the pipeline itself never sees a
/// partially constructed configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    MissingVar(String),

    #[error("Invalid STORAGE_CONNECTION_STRING: {0}")]
    InvalidConnectionString(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid table schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid field mapping: {0}")]
    InvalidMapping(String),
}

/// Non-secret pipeline settings, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub schema: TableSchema,
    pub mapping: FieldMapping,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Fully-qualified URL the fetcher issues its single GET against.
    pub api_url: String,
    /// Blob container the raw payload is archived into.
    pub container: String,
    /// Object key prefix; the logical date and `.json` are appended.
    pub archive_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub path: String,
    /// Megabytes per log file before rolling.
    pub size: u64,
    pub max_files: usize,
}

/// Connection secrets, sourced from the environment at startup.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub sql_connection_string: String,
    pub storage: StorageSettings,
}

/// Parsed form of `STORAGE_CONNECTION_STRING`.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let config_text = fs::read_to_string(Path::new(path))?;
    let config: Config = toml::from_str(&config_text)?;
    config.schema.validate()?;
    config.mapping.validate(&config.schema)?;
    Ok(config)
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name.to_string())),
    }
}

impl Secrets {
    /// Read `SQL_CONNECTION_STRING` and `STORAGE_CONNECTION_STRING` from the
    /// environment. Absence of either is a startup error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let sql_connection_string = required_var("SQL_CONNECTION_STRING")?;
        let storage = StorageSettings::parse(&required_var("STORAGE_CONNECTION_STRING")?)?;
        Ok(Secrets {
            sql_connection_string,
            storage,
        })
    }
}

impl StorageSettings {
    /// Parse a semicolon-separated `key=value` connection string.
    ///
    /// Recognized keys: `endpoint`, `region`, `access_key_id`,
    /// `secret_access_key`. Region defaults to `us-east-1` when omitted.
    pub fn parse(connection_string: &str) -> Result<Self, ConfigError> {
        let mut settings = StorageSettings {
            endpoint: None,
            region: "us-east-1".to_string(),
            access_key_id: None,
            secret_access_key: None,
        };

        for pair in connection_string.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ConfigError::InvalidConnectionString(format!("expected key=value, got '{}'", pair))
            })?;
            match key.trim() {
                "endpoint" => settings.endpoint = Some(value.trim().to_string()),
                "region" => settings.region = value.trim().to_string(),
                "access_key_id" => settings.access_key_id = Some(value.trim().to_string()),
                "secret_access_key" => settings.secret_access_key = Some(value.trim().to_string()),
                other => {
                    return Err(ConfigError::InvalidConnectionString(format!(
                        "unrecognized key '{}'",
                        other
                    )));
                }
            }
        }

        // Credentials are all-or-nothing: a lone key would make the client
        // fall back to anonymous access and fail mid-run instead of here
        if settings.access_key_id.is_some() != settings.secret_access_key.is_some() {
            return Err(ConfigError::InvalidConnectionString(
                "access_key_id and secret_access_key must be provided together".to_string(),
            ));
        }

        Ok(settings)
    }
}
