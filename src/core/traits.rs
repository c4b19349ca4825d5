//! Core trait for ledger operations
//!
//! This module defines the trait abstraction that lets the single-threaded
//! and the concurrent account stores be driven interchangeably by sessions
//! and processing strategies.

use crate::types::{Account, AccountId, CloseReceipt, CloseResolution, LedgerError, Recipient};
use rust_decimal::Decimal;

/// The operation set of an account store
///
/// Every mutating method is atomic and total: it returns its success value
/// or exactly one [`LedgerError`], and validates everything before it
/// mutates anything. Implementations can be single-threaded (`HashMap`) or
/// concurrent (`DashMap` plus per-record locks).
pub trait Ledger {
    /// Open a new active account and return it
    fn create_account(
        &mut self,
        full_name: &str,
        username: &str,
        secret: &str,
        initial_deposit: Decimal,
    ) -> Result<Account, LedgerError>;

    /// Check a username/secret pair against the active accounts
    fn authenticate(&self, username: &str, secret: &str) -> Result<Account, LedgerError>;

    /// Credit an account and return its new balance
    fn deposit(&mut self, account: AccountId, amount: Decimal) -> Result<Decimal, LedgerError>;

    /// Debit an account and return its new balance
    fn withdraw(&mut self, account: AccountId, amount: Decimal) -> Result<Decimal, LedgerError>;

    /// Move funds between two active accounts and return the source's new balance
    fn transfer(
        &mut self,
        from: AccountId,
        to: &Recipient,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError>;

    /// Settle any remaining balance and close an account
    fn close(
        &mut self,
        account: AccountId,
        resolution: Option<&CloseResolution>,
    ) -> Result<CloseReceipt, LedgerError>;

    /// Look up an active account by username
    fn find_by_username(&self, username: &str) -> Option<Account>;

    /// Look up an active account by ID
    fn find_by_id(&self, account: AccountId) -> Option<Account>;

    /// Every account ever created, active and closed, sorted by ID
    fn accounts(&self) -> Vec<Account>;
}

/// Validate a username for a new account
///
/// Usernames must be non-empty and free of whitespace so they can serve as
/// unambiguous transfer identifiers.
pub(crate) fn validate_username(username: &str) -> Result<(), LedgerError> {
    if username.is_empty() || username.chars().any(char::is_whitespace) {
        return Err(LedgerError::invalid_username(username));
    }
    Ok(())
}

/// Validate an amount that must be strictly positive
pub(crate) fn require_positive(amount: Decimal, operation: &str) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount, operation));
    }
    Ok(())
}
