//! Job Board Probe Tool
//!
//! This binary runs a one-shot search against the job board API and prints
//! the matching vacancies with their salary, if any. Handy for checking the
//! board connectivity and area/page settings without starting the server.

use anyhow::Result;
use clap::Parser;
use smart_hunter_server::board::{HhJobBoard, JobBoard};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "board-probe")]
#[command(about = "Run a one-shot vacancy search against the job board")]
struct Args {
    /// Search text, e.g. "rust developer"
    #[arg(value_name = "TEXT")]
    text: String,

    /// Base URL of the board API
    #[arg(long, default_value = "https://api.hh.ru")]
    base_url: String,

    /// Area codes to restrict the search to
    #[arg(long, value_delimiter = ',', default_values_t = vec![1002, 1003])]
    areas: Vec<u32>,

    /// Page size for the search request
    #[arg(long, default_value_t = 10)]
    per_page: u32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_sec: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Searching {} for \"{}\"...", args.base_url, args.text);
    let board = HhJobBoard::new(args.base_url, args.areas, args.per_page, args.timeout_sec);

    let found = board.search(&args.text).await?;
    info!("Found {} vacancies", found.len());

    for vacancy in &found {
        let salary = vacancy
            .salary
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "not specified".to_string());
        println!("{} | {} | {}", vacancy.id, vacancy.name, salary);
    }

    Ok(())
}
