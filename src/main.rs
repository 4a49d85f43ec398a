//! labelmine - search-results label parser.
//!
//! Polls a raw-HTML label store for captured search-results page snapshots,
//! reconstructs structured video entries from their DOM fragments, and
//! upserts deduplicated records into the results store.

mod cli;
mod config;
mod models;
mod parsers;
mod pipeline;
mod store;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "labelmine=debug"
    } else {
        "labelmine=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
