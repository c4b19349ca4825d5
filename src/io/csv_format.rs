//! CSV format handling for command scripts and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CommandRecord structure for deserialization
//! - Conversion from CSV records to session commands
//! - Account listing serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{Account, AccountId, CloseResolution, Command, LedgerError, Recipient};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the script format with columns:
/// command, username, password, name, target, amount, resolution.
/// Every column but `command` is optional because each command uses only
/// some of them.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct CommandRecord {
    pub command: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub target: Option<String>,
    pub amount: Option<String>,
    pub resolution: Option<String>,
}

/// Convert a CommandRecord to a Command
///
/// This function:
/// - Matches the command name case-insensitively
/// - Checks that the columns the command needs are present
/// - Parses amounts into Decimal and `#<id>` targets into account IDs
///
/// Value checks (positive amounts, existing accounts) are left to the store.
///
/// # Errors
///
/// `InvalidCommand` naming the command and what is wrong with the row.
pub fn convert_csv_record(record: CommandRecord) -> Result<Command, LedgerError> {
    let name = record.command.trim().to_lowercase();

    let command = match name.as_str() {
        "create" => Command::CreateAccount {
            username: required(&name, "username", record.username)?,
            secret: required(&name, "password", record.password)?,
            full_name: required(&name, "name", record.name)?,
            initial_deposit: match present(record.amount) {
                Some(amount) => parse_amount(&name, &amount)?,
                None => Decimal::ZERO,
            },
        },
        "login" => Command::Login {
            username: required(&name, "username", record.username)?,
            secret: required(&name, "password", record.password)?,
        },
        "logout" => Command::Logout,
        "view" => Command::View,
        "deposit" => Command::Deposit {
            amount: parse_amount(&name, &required(&name, "amount", record.amount)?)?,
        },
        "withdraw" => Command::Withdraw {
            amount: parse_amount(&name, &required(&name, "amount", record.amount)?)?,
        },
        "transfer" => Command::Transfer {
            to: parse_recipient(&name, &required(&name, "target", record.target)?)?,
            amount: parse_amount(&name, &required(&name, "amount", record.amount)?)?,
        },
        "close" => Command::Close {
            resolution: match present(record.resolution) {
                None => None,
                Some(resolution) => match resolution.to_lowercase().as_str() {
                    "withdraw" => Some(CloseResolution::WithdrawAll),
                    "transfer" => Some(CloseResolution::TransferAllTo(required(
                        &name,
                        "target",
                        record.target,
                    )?)),
                    _ => {
                        return Err(LedgerError::invalid_command(
                            &name,
                            format!("unknown resolution '{}'", resolution),
                        ))
                    }
                },
            },
        },
        _ => {
            return Err(LedgerError::invalid_command(
                &record.command,
                "unknown command",
            ))
        }
    };

    Ok(command)
}

// Empty and whitespace-only fields count as absent.
fn present(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(command: &str, column: &str, field: Option<String>) -> Result<String, LedgerError> {
    present(field).ok_or_else(|| LedgerError::invalid_command(command, format!("missing {}", column)))
}

fn parse_amount(command: &str, amount: &str) -> Result<Decimal, LedgerError> {
    Decimal::from_str(amount)
        .map_err(|_| LedgerError::invalid_command(command, format!("invalid amount '{}'", amount)))
}

/// `#<id>` addresses an account by ID, anything else is a username
fn parse_recipient(command: &str, target: &str) -> Result<Recipient, LedgerError> {
    match target.strip_prefix('#') {
        Some(id) => id
            .parse::<AccountId>()
            .map(Recipient::ById)
            .map_err(|_| {
                LedgerError::invalid_command(command, format!("invalid account ID '{}'", target))
            }),
        None => Ok(Recipient::ByUsername(target.to_string())),
    }
}

/// Write the account listing in CSV format
///
/// Writes accounts with columns: id, name, username, balance, status.
/// Accounts are sorted by ID for deterministic output and balances are
/// rendered with two decimal places.
///
/// # Errors
///
/// `IoError` if the output cannot be written.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), LedgerError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["id", "name", "username", "balance", "status"])
        .map_err(|e| write_error("Failed to write CSV header", e))?;

    let mut sorted_accounts: Vec<&Account> = accounts.iter().collect();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.id.to_string(),
                account.full_name.clone(),
                account.username.clone(),
                format!("{:.2}", account.balance),
                account.status.to_string(),
            ])
            .map_err(|e| write_error("Failed to write account record", e))?;
    }

    writer
        .flush()
        .map_err(|e| LedgerError::IoError {
            message: format!("Failed to flush output: {}", e),
        })?;

    Ok(())
}

fn write_error(context: &str, error: csv::Error) -> LedgerError {
    LedgerError::IoError {
        message: format!("{}: {}", context, error),
    }
}
