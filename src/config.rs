use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants;
use crate::error::{EtlError, Result};

/// Everything one pipeline run needs, passed explicitly to the entry point
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub input: InputConfig,
    pub database: DatabaseConfig,
    pub output: OutputConfig,
    pub transform: TransformConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: PathBuf,
    /// Encoding label; ISO-8859-1 and its aliases decode byte-for-byte
    pub encoding: String,
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(constants::DEFAULT_INPUT_PATH),
            encoding: constants::DEFAULT_ENCODING.to_string(),
            delimiter: constants::DEFAULT_DELIMITER,
        }
    }
}

impl InputConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or_else(|| {
                EtlError::Config(format!(
                    "delimiter '{}' is not a single-byte ASCII character",
                    self.delimiter
                ))
            })
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub connect_timeout_secs: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: constants::DEFAULT_DB_USER.to_string(),
            password: constants::DEFAULT_DB_PASSWORD.to_string(),
            host: constants::DEFAULT_DB_HOST.to_string(),
            port: constants::DEFAULT_DB_PORT,
            database: constants::DEFAULT_DB_NAME.to_string(),
            connect_timeout_secs: None,
        }
    }
}

// Keeps the password out of logs
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub table: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            table: constants::DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub drop_columns: Vec<String>,
    pub date_column: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            drop_columns: constants::DROPPED_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            date_column: constants::ORDER_DATE_COLUMN.to_string(),
        }
    }
}

impl EtlConfig {
    /// Reads a TOML config file. Sections and keys left out keep their defaults.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config = Self::from_toml(&config_content)?;
        info!("Loaded configuration from {}", config_path.display());
        Ok(config)
    }

    /// Like [`EtlConfig::load`], but a missing file yields the defaults
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: EtlConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Replaces the password with `ETL_DB_PASSWORD` when that variable is set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(password) = std::env::var(constants::DB_PASSWORD_ENV) {
            if !password.is_empty() {
                debug!("Using database password from {}", constants::DB_PASSWORD_ENV);
                self.database.password = password;
            }
        }
    }
}
