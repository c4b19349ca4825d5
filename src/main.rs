//! Mini Ledger CLI
//!
//! Runs account command scripts against an in-memory ledger and prints the
//! final account listing.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- script.csv > accounts.csv
//! cargo run -- --strategy sync first.csv second.csv > accounts.csv
//! cargo run -- --strategy async --batch-size 500 --max-concurrent 8 a.csv b.csv > accounts.csv
//! RUST_LOG=mini_ledger=debug cargo run -- script.csv
//! ```
//!
//! # Processing Strategies
//!
//! - **sync**: scripts run one after another on a single-threaded store (default)
//! - **async**: every script runs concurrently on a thread-safe store
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, script not found or not readable, output failure)

use mini_ledger::cli;
use mini_ledger::strategy;
use std::process;

fn main() {
    let args = cli::parse_args();
    cli::init_logging(&args.log_level);

    let strategy = {
        let config = match args.strategy {
            cli::StrategyType::Async => Some(args.to_batch_config()),
            cli::StrategyType::Sync => None,
        };
        strategy::create_strategy(args.strategy, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.inputs, &mut output) {
        tracing::error!(error = %e, "processing failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
