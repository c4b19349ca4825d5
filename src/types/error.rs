//! Error types for the ledger
//!
//! This module defines every error a ledger operation, a session or the
//! command-script I/O layer can report. Errors are designed to be
//! descriptive and user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **Account Errors**: duplicate or malformed usernames, unknown or closed accounts
//! - **Money Errors**: invalid amounts, insufficient funds, overflow
//! - **Session Errors**: bad credentials, commands issued while logged out
//! - **Script Errors**: unreadable files, malformed CSV rows, unknown commands

use super::account::AccountId;
use super::command::Recipient;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger
///
/// Every ledger operation returns either its success value or exactly one of
/// these variants, and a failed operation never leaves a partial mutation
/// behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Username is already held by an active account
    #[error("Username '{username}' is already taken")]
    DuplicateUsername {
        /// The requested username
        username: String,
    },

    /// Username is empty or contains whitespace
    #[error("Invalid username '{username}': must be non-empty and contain no whitespace")]
    InvalidUsername {
        /// The rejected username
        username: String,
    },

    /// Amount is out of range for the operation
    ///
    /// Deposits, withdrawals and transfers need a strictly positive amount;
    /// an initial deposit may be zero but not negative.
    #[error("Invalid amount {amount} for {operation}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Operation that rejected it
        operation: String,
    },

    /// Debit larger than the current balance
    ///
    /// The account is left unchanged.
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account that would have been debited
        account: AccountId,
        /// Its balance at the time of the request
        balance: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// No active account matches the lookup
    ///
    /// Closed accounts are reported this way whenever they are looked up by
    /// username or named as a transfer recipient.
    #[error("No active account with {account}")]
    NotFound {
        /// The lookup that failed
        account: Recipient,
    },

    /// The account exists but has been closed
    #[error("Account {account} is closed")]
    InactiveAccount {
        /// Closed account ID
        account: AccountId,
    },

    /// Secret does not match the account's credential
    #[error("Incorrect password for '{username}'")]
    InvalidCredentials {
        /// Username that failed to authenticate
        username: String,
    },

    /// Source and recipient resolve to the same account
    #[error("Cannot transfer from account {account} to itself")]
    SameAccount {
        /// The account on both sides
        account: AccountId,
    },

    /// Close was requested for an account that is already closed
    #[error("Account {account} is already closed")]
    AlreadyClosed {
        /// The closed account
        account: AccountId,
    },

    /// Close was requested without a resolution while money remains
    ///
    /// Nothing is mutated; the caller must choose a [`CloseResolution`].
    ///
    /// [`CloseResolution`]: crate::types::CloseResolution
    #[error("Account {account} still holds {balance}; withdraw or transfer it before closing")]
    OutstandingBalance {
        /// Account that was not closed
        account: AccountId,
        /// Its remaining balance
        balance: Decimal,
    },

    /// The identifier space is exhausted
    #[error("No account identifiers left to assign")]
    CapacityExceeded,

    /// The secret could not be hashed
    #[error("Failed to hash secret: {message}")]
    CredentialError {
        /// Description from the password hasher
        message: String,
    },

    /// Arithmetic overflow would occur
    ///
    /// The operation is rejected to maintain account integrity.
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account whose balance would overflow
        account: AccountId,
    },

    /// An account command was issued with nobody logged in
    #[error("Cannot {command}: not logged in")]
    NotLoggedIn {
        /// The rejected command
        command: String,
    },

    /// A script row does not form a valid command
    #[error("Invalid {command} command: {reason}")]
    InvalidCommand {
        /// Command name as written in the script
        command: String,
        /// What is wrong with the row
        reason: String,
    },

    /// Script file not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error while reading a script or writing the listing
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// Malformed CSV in a command script
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create a DuplicateUsername error
    pub fn duplicate_username(username: &str) -> Self {
        LedgerError::DuplicateUsername {
            username: username.to_string(),
        }
    }

    /// Create an InvalidUsername error
    pub fn invalid_username(username: &str) -> Self {
        LedgerError::InvalidUsername {
            username: username.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, operation: &str) -> Self {
        LedgerError::InvalidAmount {
            amount,
            operation: operation.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account,
            balance,
            requested,
        }
    }

    /// Create a NotFound error for an ID lookup
    pub fn id_not_found(account: AccountId) -> Self {
        LedgerError::NotFound {
            account: Recipient::ById(account),
        }
    }

    /// Create a NotFound error for a username lookup
    pub fn username_not_found(username: &str) -> Self {
        LedgerError::NotFound {
            account: Recipient::ByUsername(username.to_string()),
        }
    }

    /// Create a NotFound error for a transfer recipient
    pub fn recipient_not_found(recipient: &Recipient) -> Self {
        LedgerError::NotFound {
            account: recipient.clone(),
        }
    }

    /// Create an InactiveAccount error
    pub fn inactive_account(account: AccountId) -> Self {
        LedgerError::InactiveAccount { account }
    }

    /// Create an InvalidCredentials error
    pub fn invalid_credentials(username: &str) -> Self {
        LedgerError::InvalidCredentials {
            username: username.to_string(),
        }
    }

    /// Create a SameAccount error
    pub fn same_account(account: AccountId) -> Self {
        LedgerError::SameAccount { account }
    }

    /// Create an AlreadyClosed error
    pub fn already_closed(account: AccountId) -> Self {
        LedgerError::AlreadyClosed { account }
    }

    /// Create an OutstandingBalance error
    pub fn outstanding_balance(account: AccountId, balance: Decimal) -> Self {
        LedgerError::OutstandingBalance { account, balance }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Create a NotLoggedIn error
    pub fn not_logged_in(command: &str) -> Self {
        LedgerError::NotLoggedIn {
            command: command.to_string(),
        }
    }

    /// Create an InvalidCommand error
    pub fn invalid_command(command: &str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidCommand {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}
