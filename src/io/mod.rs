//! I/O module
//!
//! Handles command-script parsing and account listing output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, listing serialization)
//! - `sync_reader` - Synchronous script reader with iterator interface
//! - `async_reader` - Asynchronous script reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{convert_csv_record, write_accounts_csv, CommandRecord};
pub use sync_reader::SyncReader;
