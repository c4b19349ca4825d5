//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account records, identifiers and close receipts
//! - `command`: Transfer recipients, close resolutions and session commands
//! - `credential`: Salted secret material used for authentication
//! - `error`: Error types for the ledger

pub mod account;
pub mod command;
pub mod credential;
pub mod error;

pub use account::{Account, AccountId, AccountStatus, CloseReceipt};
pub use command::{CloseResolution, Command, Recipient};
pub use credential::Credential;
pub use error::LedgerError;
