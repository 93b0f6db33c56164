//! Worker configuration parsed from environment variables.

use std::env;

use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {name}")]
    Missing { name: &'static str },
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Catalog table name.
    pub table: String,
    /// Optional AWS region override; the default provider chain applies
    /// otherwise.
    pub region: Option<String>,
}

impl WorkerConfig {
    /// Load configuration from the environment.
    ///
    /// `CAIRN_TABLE` is required; `CAIRN_AWS_REGION` optionally overrides
    /// the ambient region.
    pub fn from_env() -> Result<Self, ConfigError> {
        let table = env::var("CAIRN_TABLE")
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing {
                name: "CAIRN_TABLE",
            })?;

        let region = env::var("CAIRN_AWS_REGION")
            .ok()
            .filter(|value| !value.is_empty());

        Ok(Self { table, region })
    }
}
