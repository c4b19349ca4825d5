//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over the commands of a script file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding the file line of each
//! row (when the CSV reader knows it) together with the parsed command:
//!
//! ```no_run
//! use mini_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("script.csv")).unwrap();
//! for (line, result) in reader {
//!     match result {
//!         Ok(command) => println!("line {:?}: {}", line, command.name()),
//!         Err(e) => eprintln!("line {:?}: {}", line, e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, unreadable header) are returned from `new()`
//! - Individual row errors are yielded as Err variants and iteration continues

use crate::io::csv_format::{convert_csv_record, CommandRecord};
use crate::types::{Command, LedgerError};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Synchronous CSV reader over a command script
///
/// Reads one row at a time; memory use does not grow with the file.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    headers: StringRecord,
    record: StringRecord,
}

impl SyncReader {
    /// Open a script file for streaming iteration
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (trailing optional columns may be omitted)
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Errors
    ///
    /// `FileNotFound` if the path does not exist, `IoError` or `ParseError`
    /// if the file cannot be opened or its header row cannot be read.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LedgerError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => LedgerError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), e),
            },
        })?;

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        let headers = reader.headers()?.clone();

        Ok(Self {
            reader,
            headers,
            record: StringRecord::new(),
        })
    }
}

impl Iterator for SyncReader {
    /// File line of the row (the header is line 1) and its command
    type Item = (Option<u64>, Result<Command, LedgerError>);

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                let line = self.record.position().map(|pos| pos.line());
                let command = self
                    .record
                    .deserialize::<CommandRecord>(Some(&self.headers))
                    .map_err(LedgerError::from)
                    .and_then(convert_csv_record);
                Some((line, command))
            }
            Err(e) => {
                let line = e.position().map(|pos| pos.line());
                Some((line, Err(e.into())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "command,username,password,name,target,amount,resolution\n";

    /// Helper function to create a temporary script for testing
    fn create_temp_csv(rows: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(HEADER.as_bytes())
            .and_then(|_| file.write_all(rows.as_bytes()))
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn commands(file: &NamedTempFile) -> Vec<(Option<u64>, Result<Command, LedgerError>)> {
        SyncReader::new(file.path()).unwrap().collect()
    }

    #[test]
    fn test_sync_reader_new_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));

        assert_eq!(
            result.unwrap_err(),
            LedgerError::FileNotFound {
                path: "nonexistent.csv".to_string()
            }
        );
    }

    #[test]
    fn test_sync_reader_yields_commands_with_lines() {
        let file = create_temp_csv(
            "create,alice,pw,Alice Liddell,,100.00,\n\
             login,alice,pw\n\
             deposit,,,,,25\n",
        );

        let records = commands(&file);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].0, Some(2));
        assert!(matches!(
            records[0].1,
            Ok(Command::CreateAccount { ref full_name, .. }) if full_name == "Alice Liddell"
        ));
        assert_eq!(
            records[1],
            (
                Some(3),
                Ok(Command::Login {
                    username: "alice".to_string(),
                    secret: "pw".to_string()
                })
            )
        );
        assert_eq!(
            records[2],
            (
                Some(4),
                Ok(Command::Deposit {
                    amount: Decimal::new(25, 0)
                })
            )
        );
    }

    #[test]
    fn test_sync_reader_continues_after_error() {
        let file = create_temp_csv(
            "view\n\
             withdraw,,,,,lots\n\
             logout\n",
        );

        let records = commands(&file);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].1, Ok(Command::View));
        assert_eq!(records[1].0, Some(3));
        assert_eq!(
            records[1].1,
            Err(LedgerError::invalid_command(
                "withdraw",
                "invalid amount 'lots'"
            ))
        );
        assert_eq!(records[2].1, Ok(Command::Logout));
    }

    #[test]
    fn test_sync_reader_handles_whitespace() {
        let file = create_temp_csv("  TRANSFER , , , ,  #2 ,  40.00 \n");

        let records = commands(&file);

        assert_eq!(
            records[0].1,
            Ok(Command::Transfer {
                to: crate::types::Recipient::ById(2),
                amount: Decimal::new(4000, 2)
            })
        );
    }

    #[test]
    fn test_sync_reader_handles_empty_file_after_header() {
        let file = create_temp_csv("");
        assert!(commands(&file).is_empty());
    }
}
