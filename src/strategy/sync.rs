//! Synchronous processing strategy
//!
//! This module provides a sequential, single-threaded implementation of the
//! ProcessingStrategy trait. Scripts run one after another, each as its own
//! session on a single `AccountStore`.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Login state and dispatch to `Session`
//! - Business rules to `AccountStore`
//! - CSV output to `csv_format::write_accounts_csv`
//!
//! Because scripts never overlap, the final listing is fully deterministic
//! for a given argument order.

use crate::core::{AccountStore, Session};
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{log_result, ProcessingStrategy};
use crate::types::{Account, LedgerError};
use std::io::Write;
use std::path::PathBuf;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use mini_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::io;
/// use std::path::PathBuf;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy
///     .process(&[PathBuf::from("script.csv")], &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, inputs: &[PathBuf], output: &mut dyn Write) -> Result<(), LedgerError> {
        let mut store = AccountStore::new();

        for path in inputs {
            let reader = SyncReader::new(path)?;
            let mut session = Session::new(&mut store);
            tracing::debug!(script = %path.display(), "session started");

            for (line, parsed) in reader {
                match parsed {
                    Ok(command) => {
                        let name = command.name();
                        let result = session.execute(command);
                        log_result(path, line, name, &result);
                    }
                    Err(error) => {
                        tracing::warn!(script = %path.display(), ?line, %error, "skipping script row")
                    }
                }
            }
        }

        let accounts: Vec<Account> = store.get_all_accounts().into_iter().cloned().collect();
        write_accounts_csv(&accounts, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::NamedTempFile;

    const HEADER: &str = "command,username,password,name,target,amount,resolution\n";

    /// Helper function to create a temporary script for testing
    fn create_temp_script(rows: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "{}{}", HEADER, rows).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn run(scripts: &[&NamedTempFile]) -> Result<String, LedgerError> {
        let inputs: Vec<PathBuf> = scripts.iter().map(|f| f.path().to_path_buf()).collect();
        let mut output = Vec::new();
        SyncProcessingStrategy.process(&inputs, &mut output)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_sync_strategy_runs_single_script() {
        let script = create_temp_script(
            "create,alice,pw,Alice Liddell,,100.00\n\
             login,alice,pw\n\
             withdraw,,,,,30\n",
        );

        let output = run(&[&script]).unwrap();

        assert_eq!(
            output,
            "id,name,username,balance,status\n1,Alice Liddell,alice,70.00,active\n"
        );
    }

    #[test]
    fn test_sync_strategy_scripts_share_one_store() {
        let first = create_temp_script(
            "create,alice,pw,Alice Liddell,,100\n\
             create,bob,pw,Bob Builder\n\
             login,alice,pw\n\
             transfer,,,,bob,25\n",
        );
        // A new script starts logged out.
        let second = create_temp_script(
            "deposit,,,,,1\n\
             login,bob,pw\n\
             transfer,,,,#1,5\n",
        );

        let output = run(&[&first, &second]).unwrap();

        assert_eq!(
            output,
            "id,name,username,balance,status\n\
             1,Alice Liddell,alice,80.00,active\n\
             2,Bob Builder,bob,20.00,active\n"
        );
    }

    #[test]
    fn test_sync_strategy_continues_after_rejected_commands() {
        let script = create_temp_script(
            "create,alice,pw,Alice Liddell,,10\n\
             login,alice,wrong\n\
             launch\n\
             login,alice,pw\n\
             withdraw,,,,,1000\n\
             deposit,,,,,5\n",
        );

        let output = run(&[&script]).unwrap();

        assert!(output.contains("1,Alice Liddell,alice,15.00,active"));
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let mut output = Vec::new();

        let result = SyncProcessingStrategy.process(
            &[Path::new("nonexistent.csv").to_path_buf()],
            &mut output,
        );

        assert!(matches!(result, Err(LedgerError::FileNotFound { .. })));
        assert!(output.is_empty());
    }

    #[test]
    fn test_sync_strategy_with_no_scripts_writes_header() {
        assert_eq!(run(&[]).unwrap(), "id,name,username,balance,status\n");
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
