//! Mini Ledger Library
//! # Overview
//!
//! This library provides an in-memory account ledger: customers open
//! accounts, authenticate, move money, and close accounts. A sequential and
//! a concurrent store implement the same operation set, and a CSV
//! command-script driver runs sessions against either one.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Command, LedgerError, etc.)
//! - [`cli`] - CLI arguments parsing and log setup
//! - [`core`] - Business logic components:
//!   - [`core::account_store`] - Single-threaded account store
//!   - [`core::concurrent`] - Thread-safe account store
//!   - [`core::session`] - Login state and command dispatch
//! - [`io`] - Command-script reading and account listing output
//! - [`strategy`] - Sequential and concurrent script processing
//!
//! # Operations
//!
//! - **Create**: open an account with a unique username and an initial deposit
//! - **Authenticate**: check a username and secret
//! - **Deposit / Withdraw**: credit or debit an active account
//! - **Transfer**: move funds to another account, by ID or by username
//! - **Close**: settle the balance (withdraw or transfer) and retire the account
//!
//! # Invariants
//!
//! - Balances are never negative
//! - Account IDs are serial from 1 and never reused
//! - Usernames are unique among active accounts; a closed account frees its name
//! - Closed accounts keep their record, hold zero, and are invisible to lookups
//! - A failed operation changes nothing

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{AccountStore, ConcurrentAccountStore, Ledger, Outcome, Session};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountId, AccountStatus, CloseReceipt, CloseResolution, Command, LedgerError,
    Recipient,
};
