use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use music_library::config::{self, LogFormat};
use music_library::library::{LibraryManager, SongManager};
use music_library::library_store::{LibraryStore, SqliteLibraryStore};
use music_library::metadata::MetadataClient;
use music_library::server::{metrics, run_server, server::shutdown_signal, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

fn parse_dir(s: &str) -> Result<PathBuf, String> {
    let path = parse_path(s)?;
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the library database (library.db).
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_dir)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Format of the process logs.
    #[clap(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Number of SQLite connections used for reads.
    #[clap(long, default_value_t = config::DEFAULT_READ_POOL_SIZE)]
    pub read_pool_size: usize,

    /// Base URL of the song metadata service queried when a song is added.
    #[clap(long)]
    pub metadata_api_url: Option<String>,

    /// Timeout in seconds for metadata requests.
    #[clap(long, default_value_t = config::DEFAULT_METADATA_TIMEOUT_SEC)]
    pub metadata_timeout_sec: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            log_format: args.log_format,
            read_pool_size: args.read_pool_size,
            metadata_api_url: args.metadata_api_url.clone(),
            metadata_timeout_sec: args.metadata_timeout_sec,
        }
    }
}

fn init_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("LOG_LEVEL")
        .from_env_lossy();

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .try_init()?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Resolve final configuration (TOML overrides CLI)
    let file_config = match &cli_args.config {
        Some(path) => Some(config::FileConfig::load(path)?),
        None => None,
    };
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    init_logging(app_config.log_format)?;

    info!("Configuration loaded:");
    if let Some(path) = &cli_args.config {
        info!("  config file: {:?}", path);
    }
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  port: {}", app_config.port);
    info!("  metadata api: {}", app_config.metadata_api_url);

    if !app_config.library_db_path().exists() {
        info!(
            "Creating new library database at {:?}",
            app_config.library_db_path()
        );
    }
    let store = Arc::new(SqliteLibraryStore::new(
        app_config.library_db_path(),
        app_config.read_pool_size,
    )?);

    info!("Initializing metrics...");
    metrics::init_metrics();
    metrics::set_library_counts(&store.get_counts()?);

    let metadata = Arc::new(MetadataClient::new(
        app_config.metadata_api_url.clone(),
        app_config.metadata_timeout_sec,
    )?);

    let song_manager = Arc::new(SongManager::new(store.clone(), metadata));
    let library_manager = Arc::new(LibraryManager::new(store));

    info!("Ready to serve at port {}!", app_config.port);
    info!("Metrics available at port {}!", app_config.metrics_port);

    run_server(
        song_manager,
        library_manager,
        app_config.logging_level.clone(),
        app_config.port,
        app_config.metrics_port,
        shutdown_signal(),
    )
    .await
}
