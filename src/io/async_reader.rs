//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over the commands of a script, read in
//! batches so a session task yields to the runtime between chunks of I/O.
//!
//! # Architecture
//!
//! ```text
//! Script bytes → AsyncReader → Batches of Commands
//!                    ↓
//!             csv_format module
//!             (CommandRecord, convert_csv_record)
//! ```

use crate::io::csv_format::{convert_csv_record, CommandRecord};
use crate::types::Command;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous CSV reader over a command script
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async byte source
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read a batch of commands
    ///
    /// Collects up to `batch_size` commands. Rows that do not form a valid
    /// command are logged as warnings and skipped without counting toward
    /// the batch, so a short batch means the script is exhausted.
    ///
    /// Returns an empty vector once the end of the script is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<Command> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CommandRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(record)) => match convert_csv_record(record) {
                    Ok(command) => batch.push(command),
                    Err(e) => tracing::warn!(error = %e, "skipping script row"),
                },
                Some(Err(e)) => tracing::warn!(error = %e, "skipping malformed script row"),
                None => break,
            }
        }

        batch
    }
}
