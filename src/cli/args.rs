use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Run account command scripts against an in-memory ledger
#[derive(Parser, Debug)]
#[command(name = "mini-ledger")]
#[command(about = "Run account command scripts against an in-memory ledger", long_about = None)]
pub struct CliArgs {
    /// Command scripts, each run as its own session
    #[arg(
        value_name = "SCRIPT",
        required = true,
        help = "One or more command script CSV files"
    )]
    pub inputs: Vec<PathBuf>,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "'sync' runs scripts one after another, 'async' runs them concurrently"
    )]
    pub strategy: StrategyType,

    /// Number of script rows read per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of script rows read per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads running sessions (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads running sessions (default: CPU cores)"
    )]
    pub max_concurrent_sessions: Option<usize>,

    /// Log filter used when RUST_LOG is not set
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "warn",
        help = "Log level or filter directive, overridden by RUST_LOG"
    )]
    pub log_level: String,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values take their defaults; zero values fall back to the
    /// defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_none() && self.max_concurrent_sessions.is_none() {
            return BatchConfig::default();
        }

        let default = BatchConfig::default();
        BatchConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent_sessions
                .unwrap_or(default.max_concurrent_sessions),
        )
    }
}
