//! CLI argument definitions using clap

use std::path::PathBuf;
use std::time::Duration;

use breakwater_core::HttpMethod;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "breakwater")]
#[command(about = "Breakwater - run calls behind per-command circuit breakers")]
#[command(version)]
pub struct Cli {
    /// TOML file with `[commands."name"]` tables
    #[arg(long, global = true, env = "BREAKWATER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue guarded HTTP requests against a URL
    Http(HttpArgs),

    /// Run a synthetic unit of work that fails with a chosen message
    Exec(ExecArgs),
}

/// Tuning used when the command has no entry in the config file
#[derive(Args, Clone)]
pub struct TuningArgs {
    /// Maximum concurrent calls
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Error percentage at which the breaker opens
    #[arg(long)]
    pub error_percent: Option<u32>,

    /// Minimum calls in the window before the breaker may open
    #[arg(long)]
    pub volume: Option<u32>,

    /// Error text that counts toward tripping (repeatable)
    #[arg(long = "trip-on")]
    pub trip_on: Vec<String>,

    /// Count every error toward tripping
    #[arg(long)]
    pub poll_on_any_error: bool,
}

#[derive(Args)]
pub struct HttpArgs {
    /// Target URL
    pub url: String,

    /// Command name the calls run under
    #[arg(long, default_value = "do.get")]
    pub command: String,

    /// HTTP method (get or post)
    #[arg(long, short = 'X', default_value = "get")]
    pub method: HttpMethod,

    /// JSON payload sent with POST
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Extra header as `Name: value` (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Per-request deadline, e.g. `100ms` or `2s`
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Number of rounds to fire
    #[arg(long, default_value_t = 1)]
    pub rounds: u32,

    /// Concurrent calls per round
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Pause between rounds
    #[arg(long, default_value = "333ms", value_parser = humantime::parse_duration)]
    pub interval: Duration,

    /// Abort the in-flight request when the deadline passes
    #[arg(long)]
    pub abort_on_deadline: bool,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

#[derive(Args)]
pub struct ExecArgs {
    /// Command name the calls run under
    #[arg(long, default_value = "do.something")]
    pub command: String,

    /// Fail every call with this message (succeeds when omitted)
    #[arg(long)]
    pub fail_with: Option<String>,

    /// Number of calls
    #[arg(long, default_value_t = 30)]
    pub times: u32,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
