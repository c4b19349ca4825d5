//! Command types for driving a ledger
//!
//! This module defines the already-parsed requests a caller hands to the
//! core: who receives a transfer, how a non-empty account is settled before
//! closing, and the full command set understood by a session.

use super::account::AccountId;
use rust_decimal::Decimal;
use std::fmt;

/// How the recipient of a transfer is identified
///
/// The caller chooses the lookup; the store never guesses whether a string
/// is a name or a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// Look the recipient up by serial identifier
    ById(AccountId),

    /// Look the recipient up by username
    ByUsername(String),
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::ById(id) => write!(f, "ID {}", id),
            Recipient::ByUsername(username) => write!(f, "username '{}'", username),
        }
    }
}

/// How a remaining balance is driven to zero before an account is closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseResolution {
    /// Pay the whole balance out as cash
    WithdrawAll,

    /// Move the whole balance to another active account, by username
    TransferAllTo(String),
}

/// A single session command
///
/// Amounts and identifiers are already parsed; validation of their values
/// (positive amounts, existing accounts) is the store's job.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Open a new account (does not log in)
    CreateAccount {
        full_name: String,
        username: String,
        secret: String,
        initial_deposit: Decimal,
    },

    /// Authenticate and make the account the session's current account
    Login { username: String, secret: String },

    /// End the current login
    Logout,

    /// Show the current account
    View,

    /// Credit the current account
    Deposit { amount: Decimal },

    /// Debit the current account
    Withdraw { amount: Decimal },

    /// Move funds from the current account to another one
    Transfer { to: Recipient, amount: Decimal },

    /// Close the current account, settling any balance first
    Close { resolution: Option<CloseResolution> },
}

impl Command {
    /// Short lowercase name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateAccount { .. } => "create",
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::View => "view",
            Command::Deposit { .. } => "deposit",
            Command::Withdraw { .. } => "withdraw",
            Command::Transfer { .. } => "transfer",
            Command::Close { .. } => "close",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_display() {
        assert_eq!(Recipient::ById(7).to_string(), "ID 7");
        assert_eq!(
            Recipient::ByUsername("bob".to_string()).to_string(),
            "username 'bob'"
        );
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::View.name(), "view");
        assert_eq!(
            Command::Close {
                resolution: Some(CloseResolution::WithdrawAll)
            }
            .name(),
            "close"
        );
    }
}
