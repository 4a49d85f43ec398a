//! CLI entry point and startup validation.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;

use crate::config::Config;
use crate::pipeline::scheduler::{Scheduler, SchedulerOptions, AMOUNT_DEFAULT, BACK_IN_TIME_DEFAULT};
use crate::store::HttpStore;

/// Search-results label parser: polls captured page snapshots and derives
/// deduplicated search-result records.
#[derive(Parser)]
#[command(name = "labelmine")]
#[command(about = "Search-results label parser")]
#[command(version)]
pub struct Cli {
    /// Records to skip from the head of each page
    #[arg(long, default_value_t = 0)]
    skip: usize,

    /// Page size for each labels fetch
    #[arg(long, default_value_t = AMOUNT_DEFAULT)]
    amount: usize,

    /// Stop after this many processed records; the value becomes the exit code
    #[arg(long)]
    stop: Option<usize>,

    /// Initial look-back window, minutes
    #[arg(long, default_value_t = BACK_IN_TIME_DEFAULT)]
    minutesago: i64,

    /// Process a single metadata id, once, then exit
    #[arg(long)]
    id: Option<String>,

    /// Path to a JSON file with an array of allowed metadata ids
    #[arg(long)]
    filter: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Parse arguments, validate the configuration, and run the scheduler.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        debug!("verbose logging enabled");
    }

    if cli.id.is_some() && cli.filter.is_some() {
        bail!("invalid combo, you can't use --filter and --id");
    }

    let allowed_ids = match &cli.filter {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading filter file {}", path.display()))?;
            let ids: Vec<String> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing filter file {}", path.display()))?;
            Some(ids)
        }
        None => None,
    };

    let mut skip = cli.skip;
    let mut amount = cli.amount;
    if cli.id.is_some() && (skip != 0 || amount != AMOUNT_DEFAULT) {
        debug!("ignoring --skip and --amount because of --id");
        skip = 0;
        amount = AMOUNT_DEFAULT;
    }
    if let Some(stop) = cli.stop {
        if stop > skip && amount > stop - skip {
            amount = stop - skip;
            debug!(stop, amount, "--stop implies a smaller --amount");
        }
    }

    let config = Config::from_env();
    let store = HttpStore::new(&config);
    let opts = SchedulerOptions {
        skip,
        amount,
        stop: cli.stop,
        minutes_ago: cli.minutesago,
        target_id: cli.id,
        allowed_ids,
    };

    let scheduler = Scheduler::new(store.clone(), store, opts);
    let code = scheduler.run().await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
