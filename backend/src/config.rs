//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `MICROBLOG_*` environment variables and configuration
//! files; the CLI's own flags are parsed separately by `clap`.

use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;

use ortho_config::OrthoConfig;
use serde::Deserialize;


/// Environment variable consulted when `MICROBLOG_DATABASE_URL` is unset.
pub const FALLBACK_DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Shape of the log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown log format {other:?}; expected json or pretty")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        })
    }
}

/// Settings shared by every CLI command.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MICROBLOG")]
pub struct AppSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// `json` or `pretty`.
    pub log_format: Option<String>,
    /// Argon2 memory cost in KiB.
    #[ortho_config(default = 19_456)]
    pub hash_memory_kib: u32,
    /// Argon2 iteration count.
    #[ortho_config(default = 2)]
    pub hash_iterations: u32,
    /// Argon2 lanes.
    #[ortho_config(default = 1)]
    pub hash_parallelism: u32,
}

impl AppSettings {
    /// Load from the environment and configuration files only.
    pub fn load_from_env() -> Result<Self, String> {
        Self::load_from_iter([OsString::from("microblog")]).map_err(|err| err.to_string())
    }

    /// The configured database URL, falling back to `DATABASE_URL`.
    pub fn database_url(&self) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| std::env::var(FALLBACK_DATABASE_URL_VAR).ok())
            .filter(|url| !url.trim().is_empty())
    }

    /// Pool size, never below one.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.max(1)
    }

    /// Parsed log format; unset means JSON.
    pub fn log_format(&self) -> Result<LogFormat, String> {
        self.log_format
            .as_deref()
            .map_or(Ok(LogFormat::default()), LogFormat::from_str)
    }

    /// Argon2 memory cost in KiB.
    pub fn hash_memory_kib(&self) -> u32 {
        self.hash_memory_kib
    }

    /// Argon2 passes over memory.
    pub fn hash_iterations(&self) -> u32 {
        self.hash_iterations
    }

    /// Argon2 lanes.
    pub fn hash_parallelism(&self) -> u32 {
        self.hash_parallelism
    }
}
