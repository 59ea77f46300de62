use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use std::{fmt::Debug, path::PathBuf};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use smart_hunter_server::config::{AppConfig, CliConfig, FileConfig};
use smart_hunter_server::server::metrics;
use smart_hunter_server::store::UserStore;
use smart_hunter_server::{
    run_server, HhJobBoard, JobBoard, MatchWorkerPool, RequestsLoggingLevel, SqliteHunterStore,
};
use tokio_util::sync::CancellationToken;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory where the SQLite database lives.
    #[clap(value_parser = parse_path)]
    pub db_dir: PathBuf,

    /// Path to an optional TOML config file. Its values override the CLI ones.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Number of days to retain unused auth tokens before pruning. Set to 0 to disable pruning.
    #[clap(long, default_value_t = 30)]
    pub token_retention_days: u64,

    /// Interval in hours between pruning runs. Only used if token_retention_days > 0.
    #[clap(long, default_value_t = 24)]
    pub prune_interval_hours: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_dir: Some(cli_args.db_dir),
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        token_retention_days: cli_args.token_retention_days,
        prune_interval_hours: cli_args.prune_interval_hours,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!(
        "Opening SQLite database at {:?}...",
        config.hunter_db_path()
    );
    let store = Arc::new(SqliteHunterStore::new(config.hunter_db_path())?);

    info!("Initializing metrics...");
    metrics::init_metrics();

    // Spawn background task for auth token pruning if enabled
    if config.token_retention_days > 0 {
        let retention_days = config.token_retention_days;
        let interval_hours = config.prune_interval_hours;
        let pruning_store = store.clone();

        info!(
            "Token pruning enabled: retaining {} days, pruning every {} hours",
            retention_days, interval_hours
        );

        tokio::spawn(async move {
            let interval = Duration::from_secs(interval_hours * 60 * 60);
            let mut ticker = tokio::time::interval(interval);

            // Skip the first immediate tick, wait for the first interval
            ticker.tick().await;

            loop {
                ticker.tick().await;

                match pruning_store.prune_unused_auth_tokens(retention_days) {
                    Ok(count) => {
                        if count > 0 {
                            info!("Pruned {} stale auth tokens", count);
                        }
                    }
                    Err(e) => {
                        error!("Failed to prune auth tokens: {}", e);
                    }
                }
            }
        });
    }

    info!("Job board configured at {}", config.board.base_url);
    let job_board: Arc<dyn JobBoard> = Arc::new(HhJobBoard::new(
        config.board.base_url.clone(),
        config.board.areas.clone(),
        config.board.per_page,
        config.board.timeout_sec,
    ));

    info!(
        "Starting {} match workers (analysis takes {:?})...",
        config.matcher.workers, config.matcher.analysis_delay
    );
    let shutdown = CancellationToken::new();
    let (matcher, worker_pool) = MatchWorkerPool::start(config.matcher.clone(), shutdown.clone());

    info!("Ready to serve at port {}!", config.port);
    let result = run_server(
        store,
        job_board,
        matcher,
        config.logging_level,
        config.port,
        config.token_retention_days,
    )
    .await;

    shutdown.cancel();
    worker_pool.shutdown().await;
    result
}
