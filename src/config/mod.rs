mod file_config;

pub use file_config::{BoardConfig, FileConfig, MatcherConfig};

use crate::matcher::MatcherSettings;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::{path::PathBuf, time::Duration};

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub token_retention_days: u64,
    pub prune_interval_hours: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub token_retention_days: u64,
    pub prune_interval_hours: u64,

    // Feature configs (with defaults)
    pub board: BoardSettings,
    pub matcher: MatcherSettings,
}

#[derive(Debug, Clone)]
pub struct BoardSettings {
    pub base_url: String,
    pub areas: Vec<u32>,
    pub per_page: u32,
    pub timeout_sec: u64,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.hh.ru".to_string(),
            areas: vec![1002, 1003],
            per_page: 10,
            timeout_sec: 10,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        // Validate db_dir exists
        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let token_retention_days = file.token_retention_days.unwrap_or(cli.token_retention_days);
        let prune_interval_hours = file.prune_interval_hours.unwrap_or(cli.prune_interval_hours);

        let board_file = file.board.unwrap_or_default();
        let board_defaults = BoardSettings::default();
        let board = BoardSettings {
            base_url: board_file.base_url.unwrap_or(board_defaults.base_url),
            areas: board_file.areas.unwrap_or(board_defaults.areas),
            per_page: board_file.per_page.unwrap_or(board_defaults.per_page),
            timeout_sec: board_file.timeout_sec.unwrap_or(board_defaults.timeout_sec),
        };

        let matcher_file = file.matcher.unwrap_or_default();
        let matcher_defaults = MatcherSettings::default();
        let matcher = MatcherSettings {
            workers: matcher_file.workers.unwrap_or(matcher_defaults.workers),
            analysis_delay: matcher_file
                .analysis_delay_secs
                .map(Duration::from_secs)
                .unwrap_or(matcher_defaults.analysis_delay),
            queue_capacity: matcher_file
                .queue_capacity
                .unwrap_or(matcher_defaults.queue_capacity),
            score_min: matcher_file.score_min.unwrap_or(matcher_defaults.score_min),
            score_max: matcher_file.score_max.unwrap_or(matcher_defaults.score_max),
            result_retention: matcher_file
                .result_retention_secs
                .map(Duration::from_secs)
                .unwrap_or(matcher_defaults.result_retention),
        };

        if matcher.score_min > matcher.score_max {
            bail!(
                "matcher score_min ({}) cannot exceed score_max ({})",
                matcher.score_min,
                matcher.score_max
            );
        }

        Ok(Self {
            db_dir,
            port,
            logging_level,
            token_retention_days,
            prune_interval_hours,
            board,
            matcher,
        })
    }

    pub fn hunter_db_path(&self) -> PathBuf {
        self.db_dir.join("hunter.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
