//! Concurrent implementations of core components
//!
//! This module provides a thread-safe account store for running many
//! sessions against one ledger at the same time.
//!
//! # Architecture
//!
//! The concurrent store implements the same [`Ledger`] contract as the
//! single-threaded one, with concurrent data structures:
//!
//! - **Indexes**: `DashMap` from ID to record and from username to ID
//! - **Records**: one `Mutex<Account>` per account
//! - **Identifiers**: an atomic counter
//!
//! # Thread Safety
//!
//! - Operations on different accounts proceed in parallel
//! - Single-record operations lock only their record
//! - Two-record operations lock the lower ID first
//! - No index guard is held while waiting on a record lock
//!
//! [`Ledger`]: crate::core::Ledger

pub mod account_store;

pub use account_store::ConcurrentAccountStore;
