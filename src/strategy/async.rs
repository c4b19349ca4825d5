//! Asynchronous concurrent-session strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. Every script runs as its own session in its own
//! tokio task, and all sessions share one `ConcurrentAccountStore`.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_sessions)
//!     ├── one task per script
//!     │     ├── AsyncReader (batch CSV reading)
//!     │     └── Session over Arc<ConcurrentAccountStore>
//!     └── ConcurrentAccountStore (DashMap + per-record locks)
//! ```
//!
//! Commands within a script run in order. Commands of different scripts
//! interleave freely; the store keeps every operation atomic, so the final
//! balances always sum to deposits minus withdrawals, but which of two
//! conflicting commands wins (or which account gets which ID) depends on
//! scheduling.

use crate::core::{ConcurrentAccountStore, Session};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_accounts_csv;
use crate::strategy::{log_result, ProcessingStrategy};
use crate::types::LedgerError;
use futures::future::join_all;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio_util::compat::TokioAsyncReadCompatExt;

/// Configuration for concurrent script processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of script rows read per batch
    pub batch_size: usize,
    /// Number of runtime worker threads executing sessions
    pub max_concurrent_sessions: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_sessions: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// A zero value falls back to its default with a warning.
    pub fn new(batch_size: usize, max_concurrent_sessions: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_sessions = if max_concurrent_sessions == 0 {
            tracing::warn!(
                max_concurrent_sessions,
                default = default.max_concurrent_sessions,
                "invalid max_concurrent_sessions, using default"
            );
            default.max_concurrent_sessions
        } else {
            max_concurrent_sessions
        };

        Self {
            batch_size,
            max_concurrent_sessions,
        }
    }
}

/// Asynchronous concurrent-session strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy with the specified configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Run every script concurrently and write the account listing
    ///
    /// All scripts are opened before any session starts, so a missing file
    /// fails the run without touching the store.
    fn process(&self, inputs: &[PathBuf], output: &mut dyn Write) -> Result<(), LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_sessions)
            .build()
            .map_err(|e| LedgerError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let mut scripts = Vec::with_capacity(inputs.len());
            for path in inputs {
                scripts.push((path.clone(), open_script(path).await?));
            }

            let store = Arc::new(ConcurrentAccountStore::new());
            let batch_size = self.config.batch_size;

            let tasks = scripts.into_iter().map(|(path, file)| {
                let store = Arc::clone(&store);
                tokio::spawn(run_session(path, file, store, batch_size))
            });

            for joined in join_all(tasks).await {
                joined.map_err(|e| LedgerError::IoError {
                    message: format!("Session task failed: {}", e),
                })?;
            }

            write_accounts_csv(&store.get_all_accounts(), output)
        })
    }
}

async fn open_script(path: &Path) -> Result<tokio::fs::File, LedgerError> {
    tokio::fs::File::open(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LedgerError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => LedgerError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        },
    })
}

/// Drive one script as a session, batch by batch
async fn run_session<R>(
    path: PathBuf,
    file: R,
    mut store: Arc<ConcurrentAccountStore>,
    batch_size: usize,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut reader = AsyncReader::new(file.compat());
    let mut session = Session::new(&mut store);
    tracing::debug!(script = %path.display(), "session started");

    loop {
        let batch = reader.read_batch(batch_size).await;
        if batch.is_empty() {
            break;
        }

        for command in batch {
            let name = command.name();
            let result = session.execute(command);
            log_result(&path, None, name, &result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use tempfile::NamedTempFile;

    const HEADER: &str = "command,username,password,name,target,amount,resolution\n";

    /// Helper function to create a temporary script for testing
    fn create_temp_script(rows: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "{}{}", HEADER, rows).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn run(config: BatchConfig, scripts: &[&NamedTempFile]) -> Result<String, LedgerError> {
        let inputs: Vec<PathBuf> = scripts.iter().map(|f| f.path().to_path_buf()).collect();
        let mut output = Vec::new();
        AsyncProcessingStrategy::new(config).process(&inputs, &mut output)?;
        Ok(String::from_utf8(output).unwrap())
    }

    fn balance_of(output: &str, username: &str) -> Decimal {
        output
            .lines()
            .skip(1)
            .map(|line| line.split(',').collect::<Vec<_>>())
            .find(|fields| fields[2] == username)
            .map(|fields| fields[3].parse().unwrap())
            .unwrap()
    }

    #[rstest]
    #[case::one_row_batches(BatchConfig::new(1, 2))]
    #[case::large_batches(BatchConfig::default())]
    fn test_async_strategy_keeps_script_order(#[case] config: BatchConfig) {
        let script = create_temp_script(
            "create,alice,pw,Alice Liddell,,100.00\n\
             create,bob,pw,Bob Builder\n\
             login,alice,pw\n\
             transfer,,,,bob,40\n\
             withdraw,,,,,1000\n\
             close,,,,bob,,transfer\n",
        );

        let output = run(config, &[&script]).unwrap();

        assert_eq!(
            output,
            "id,name,username,balance,status\n\
             1,Alice Liddell,alice,0.00,closed\n\
             2,Bob Builder,bob,100.00,active\n"
        );
    }

    #[test]
    fn test_async_strategy_continues_past_batch_of_invalid_rows() {
        let script = create_temp_script(
            "create,alice,pw,Alice,,10\n\
             login,alice,pw\n\
             launch,,,,,\n\
             deposit,,,,,ten\n\
             deposit,,,,,5\n",
        );
        let mut sync_output = Vec::new();
        crate::strategy::SyncProcessingStrategy
            .process(&[script.path().to_path_buf()], &mut sync_output)
            .unwrap();

        let output = run(BatchConfig::new(2, 2), &[&script]).unwrap();

        assert_eq!(
            output,
            "id,name,username,balance,status\n\
             1,Alice,alice,15.00,active\n"
        );
        assert_eq!(output.as_bytes(), sync_output.as_slice());
    }

    fn ping_pong_script(me: &str, other: &str, amount: u32) -> NamedTempFile {
        let mut rows = format!("create,{0},pw,{0} Example,,500\nlogin,{0},pw\n", me);
        for _ in 0..200 {
            rows.push_str(&format!("transfer,,,,{},{}\n", other, amount));
        }
        create_temp_script(&rows)
    }

    #[test]
    fn test_async_strategy_concurrent_sessions_preserve_total() {
        let ping = ping_pong_script("alice", "bob", 3);
        let pong = ping_pong_script("bob", "alice", 2);

        let output = run(BatchConfig::new(16, 4), &[&ping, &pong]).unwrap();

        // Transfers issued before the other account exists are rejected, so
        // only the total is deterministic.
        let alice = balance_of(&output, "alice");
        let bob = balance_of(&output, "bob");
        assert_eq!(alice + bob, Decimal::new(1000, 0));
        assert!(alice >= Decimal::ZERO && bob >= Decimal::ZERO);
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let script = create_temp_script("create,alice,pw,Alice\n");
        let inputs = vec![
            script.path().to_path_buf(),
            Path::new("nonexistent.csv").to_path_buf(),
        ];
        let mut output = Vec::new();

        let result =
            AsyncProcessingStrategy::new(BatchConfig::default()).process(&inputs, &mut output);

        assert_eq!(
            result.unwrap_err(),
            LedgerError::FileNotFound {
                path: "nonexistent.csv".to_string()
            }
        );
        assert!(output.is_empty());
    }

    #[rstest]
    #[case::valid(10, 3, BatchConfig { batch_size: 10, max_concurrent_sessions: 3 })]
    #[case::zero_batch_size(0, 3, BatchConfig { batch_size: 1000, max_concurrent_sessions: 3 })]
    fn test_batch_config_new(
        #[case] batch_size: usize,
        #[case] sessions: usize,
        #[case] expected: BatchConfig,
    ) {
        assert_eq!(BatchConfig::new(batch_size, sessions), expected);
    }

    #[test]
    fn test_batch_config_zero_sessions_uses_cpu_count() {
        assert_eq!(
            BatchConfig::new(5, 0).max_concurrent_sessions,
            num_cpus::get()
        );
    }
}
