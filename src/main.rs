//! Headless autoplay runner (default binary).
//!
//! Plays seeded rounds with the greedy planner and prints one JSON report per round on
//! stdout. Logs go to stderr and honour `RUST_LOG`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use honeycomb_stack::autoplay::{parse_autoplay_args, run_autoplay, AutoplayConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = parse_autoplay_args(&args, AutoplayConfig::from_env())?;
    tracing::debug!(?config, "autoplay config");

    for report in run_autoplay(&config)? {
        println!("{}", serde_json::to_string(&report)?);
    }
    Ok(())
}
