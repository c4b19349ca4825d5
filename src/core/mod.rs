//! Core business logic module
//!
//! This module contains the core ledger components:
//! - `traits` - The `Ledger` trait shared by both stores
//! - `account_store` - Single-threaded account store
//! - `concurrent` - Thread-safe account store for concurrent sessions
//! - `session` - Login state and command dispatch on top of a store

pub mod account_store;
pub mod concurrent;
pub mod session;
pub mod traits;

pub use account_store::AccountStore;
pub use concurrent::ConcurrentAccountStore;
pub use session::{Outcome, Session};
pub use traits::Ledger;
