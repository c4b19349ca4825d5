//! Account-related types for the ledger
//!
//! This module defines the Account record, its identifier and lifecycle
//! status, and the receipt returned when an account is closed.

use super::credential::Credential;
use rust_decimal::Decimal;
use std::fmt;

/// Account identifier
///
/// Serial, starting at 1, never reused for the lifetime of a store.
pub type AccountId = u64;

/// Lifecycle status of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountStatus {
    /// Participates in lookups and every money operation
    Active,

    /// Logically deleted
    ///
    /// The record is kept only so its identifier is never issued again.
    /// Closed accounts are invisible to lookups and always hold a zero balance.
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One customer's holding
///
/// Every field is written only by the store that owns the record. Callers
/// receive clones, so a returned `Account` is a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Serial identifier, immutable once assigned
    pub id: AccountId,

    /// Display name, may contain spaces
    pub full_name: String,

    /// Login name, unique among active accounts, no whitespace
    pub username: String,

    /// Argon2id hash of the account secret
    pub credential: Credential,

    /// Current balance
    ///
    /// Never negative between operations.
    pub balance: Decimal,

    /// Whether the account is still open
    pub status: AccountStatus,
}

impl Account {
    /// Create a new active account
    ///
    /// # Arguments
    ///
    /// * `id` - The serial identifier assigned by the store
    /// * `full_name` - Display name
    /// * `username` - Login name (already validated by the store)
    /// * `credential` - Secret material for authentication
    /// * `balance` - Opening balance (the initial deposit)
    pub fn new(
        id: AccountId,
        full_name: impl Into<String>,
        username: impl Into<String>,
        credential: Credential,
        balance: Decimal,
    ) -> Self {
        Account {
            id,
            full_name: full_name.into(),
            username: username.into(),
            credential,
            balance,
            status: AccountStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Outcome of a successful close
#[derive(Debug, Clone, PartialEq)]
pub struct CloseReceipt {
    /// The account that was closed
    pub account: AccountId,

    /// Balance the account held before closing
    ///
    /// Zero when the account was already empty.
    pub settled: Decimal,

    /// Account that received `settled`, when the balance was transferred
    /// instead of withdrawn
    pub recipient: Option<AccountId>,
}

impl fmt::Display for CloseReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.recipient {
            Some(recipient) => write!(
                f,
                "account {} closed, {:.2} transferred to account {}",
                self.account, self.settled, recipient
            ),
            None => write!(
                f,
                "account {} closed, {:.2} withdrawn",
                self.account, self.settled
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_is_active() {
        let account = Account::new(
            1,
            "Alice Liddell",
            "alice",
            Credential::derive("pw").unwrap(),
            Decimal::new(10000, 2),
        );

        assert_eq!(account.id, 1);
        assert_eq!(account.full_name, "Alice Liddell");
        assert_eq!(account.balance, Decimal::new(10000, 2));
        assert_eq!(account.status, AccountStatus::Active);
        assert!(account.is_active());
    }

    #[test]
    fn test_close_receipt_display() {
        let withdrawn = CloseReceipt {
            account: 1,
            settled: Decimal::new(6000, 2),
            recipient: None,
        };
        assert_eq!(withdrawn.to_string(), "account 1 closed, 60.00 withdrawn");

        let transferred = CloseReceipt {
            account: 1,
            settled: Decimal::new(6000, 2),
            recipient: Some(2),
        };
        assert_eq!(
            transferred.to_string(),
            "account 1 closed, 60.00 transferred to account 2"
        );
    }
}
