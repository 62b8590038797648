//! Breakwater CLI
//!
//! Drives guarded calls from the command line so breaker behavior can be
//! watched against a live endpoint or a synthetic failing function.
//!
//! ```bash
//! breakwater http https://example.com/api --timeout 100ms --rounds 5
//! breakwater exec --command do.something --fail-with "something" --times 30
//! ```
//!
//! Command tuning is read from a TOML file passed with `--config`. Set
//! `RUST_LOG=debug` to see rejections and trip decisions.

mod args;
mod commands;
mod router;

use clap::Parser;

use crate::args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with environment-based filtering
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    router::route(cli).await
}
