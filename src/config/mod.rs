mod file_config;

pub use file_config::{FileConfig, MetadataConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_METADATA_TIMEOUT_SEC: u64 = 10;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

/// Output format of the process logs.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub log_format: LogFormat,
    pub read_pool_size: usize,
    pub metadata_api_url: Option<String>,
    pub metadata_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            db_dir: None,
            port: 3001,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
            log_format: LogFormat::Text,
            read_pool_size: DEFAULT_READ_POOL_SIZE,
            metadata_api_url: None,
            metadata_timeout_sec: DEFAULT_METADATA_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub log_format: LogFormat,
    pub read_pool_size: usize,
    pub metadata_api_url: String,
    pub metadata_timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let metadata = file.metadata.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());
        let log_format = file
            .log_format
            .and_then(|s| LogFormat::from_str(&s, true).ok())
            .unwrap_or(cli.log_format);

        let read_pool_size = file.read_pool_size.unwrap_or(cli.read_pool_size);
        if read_pool_size == 0 {
            bail!("read_pool_size must be at least 1");
        }

        let metadata_api_url = metadata
            .api_url
            .or_else(|| cli.metadata_api_url.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "metadata api url must be specified via --metadata-api-url or in config file"
                )
            })?;
        let metadata_timeout_sec = metadata.timeout_sec.unwrap_or(cli.metadata_timeout_sec);

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            log_format,
            read_pool_size,
            metadata_api_url,
            metadata_timeout_sec,
        })
    }

    pub fn library_db_path(&self) -> PathBuf {
        self.db_dir.join("library.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
