//! Processing strategy module for command scripts
//!
//! This module defines the Strategy pattern for complete script processing
//! pipelines, covering both CSV parsing and session execution against an
//! account store. This allows different processing implementations
//! (sequential, concurrent sessions) to be selected at runtime.

use crate::cli::StrategyType;
use crate::core::Outcome;
use crate::types::LedgerError;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete script processing pipelines
///
/// Each strategy reads every script, runs each one as its own session
/// against a single shared store, and writes the final account listing to
/// the output.
pub trait ProcessingStrategy: Send + Sync {
    /// Run the scripts and write the account listing to `output`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A script cannot be opened or its header cannot be read
    /// - The listing cannot be written
    ///
    /// Errors of individual commands are logged as warnings and do not stop
    /// processing.
    fn process(&self, inputs: &[PathBuf], output: &mut dyn Write) -> Result<(), LedgerError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` is used by the async strategy only; `None` selects the defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}

/// Log the result of one script command
pub(crate) fn log_result(
    script: &Path,
    line: Option<u64>,
    command: &str,
    result: &Result<Outcome, LedgerError>,
) {
    let script = script.display();
    match result {
        Ok(outcome) => tracing::info!(%script, ?line, command, %outcome, "command applied"),
        Err(error) => tracing::warn!(%script, ?line, command, %error, "command rejected"),
    }
}
