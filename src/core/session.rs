//! Session state on top of a ledger
//!
//! A `Session` is one user's sequence of commands against a shared store.
//! It tracks who is logged in and turns each [`Command`] into the matching
//! store call. The store does all validation; the session only adds the
//! login rules.

use crate::core::traits::Ledger;
use crate::types::{Account, AccountId, CloseReceipt, Command, LedgerError};
use rust_decimal::Decimal;
use std::fmt;

/// Successful result of one command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A new account was opened
    Created(Account),

    /// The session is now logged in as this account
    LoggedIn(Account),

    /// The session is no longer logged in
    LoggedOut,

    /// Snapshot of the logged-in account
    Account(Account),

    /// New balance of the logged-in account after a money operation
    Balance(Decimal),

    /// The logged-in account was closed and the session logged out
    Closed(CloseReceipt),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created(account) => write!(
                f,
                "created account {} for '{}' with {:.2}",
                account.id, account.username, account.balance
            ),
            Outcome::LoggedIn(account) => {
                write!(f, "logged in as '{}' (account {})", account.username, account.id)
            }
            Outcome::LoggedOut => f.write_str("logged out"),
            Outcome::Account(account) => write!(
                f,
                "account {}: {} ({}), balance {:.2}",
                account.id, account.full_name, account.username, account.balance
            ),
            Outcome::Balance(balance) => write!(f, "balance {:.2}", balance),
            Outcome::Closed(receipt) => write!(f, "{}", receipt),
        }
    }
}

/// One user's view of a ledger
///
/// Borrows the store mutably for its lifetime. For the concurrent store,
/// each session borrows its own `Arc` handle.
pub struct Session<'a, L: Ledger + ?Sized> {
    ledger: &'a mut L,
    current: Option<AccountId>,
}

impl<'a, L: Ledger + ?Sized> Session<'a, L> {
    /// Start a logged-out session
    pub fn new(ledger: &'a mut L) -> Self {
        Session {
            ledger,
            current: None,
        }
    }

    /// ID of the logged-in account, if any
    pub fn current(&self) -> Option<AccountId> {
        self.current
    }

    /// Execute a single command
    ///
    /// # Errors
    ///
    /// `NotLoggedIn` for an account command (or logout) with nobody logged
    /// in; otherwise whatever the store reports. A failed command leaves the
    /// login state unchanged.
    pub fn execute(&mut self, command: Command) -> Result<Outcome, LedgerError> {
        let name = command.name();

        match command {
            Command::CreateAccount {
                full_name,
                username,
                secret,
                initial_deposit,
            } => self
                .ledger
                .create_account(&full_name, &username, &secret, initial_deposit)
                .map(Outcome::Created),

            Command::Login { username, secret } => {
                let account = self.ledger.authenticate(&username, &secret)?;
                self.current = Some(account.id);
                Ok(Outcome::LoggedIn(account))
            }

            Command::Logout => {
                self.require_login(name)?;
                self.current = None;
                Ok(Outcome::LoggedOut)
            }

            Command::View => {
                let id = self.require_login(name)?;
                self.ledger
                    .find_by_id(id)
                    .map(Outcome::Account)
                    .ok_or_else(|| LedgerError::id_not_found(id))
            }

            Command::Deposit { amount } => {
                let id = self.require_login(name)?;
                self.ledger.deposit(id, amount).map(Outcome::Balance)
            }

            Command::Withdraw { amount } => {
                let id = self.require_login(name)?;
                self.ledger.withdraw(id, amount).map(Outcome::Balance)
            }

            Command::Transfer { to, amount } => {
                let id = self.require_login(name)?;
                self.ledger.transfer(id, &to, amount).map(Outcome::Balance)
            }

            Command::Close { resolution } => {
                let id = self.require_login(name)?;
                let receipt = self.ledger.close(id, resolution.as_ref())?;
                self.current = None;
                Ok(Outcome::Closed(receipt))
            }
        }
    }

    fn require_login(&self, command: &str) -> Result<AccountId, LedgerError> {
        self.current
            .ok_or_else(|| LedgerError::not_logged_in(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AccountStore, ConcurrentAccountStore};
    use crate::types::{CloseResolution, Recipient};
    use rstest::rstest;
    use std::sync::Arc;

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn create(username: &str, cents: i64) -> Command {
        Command::CreateAccount {
            full_name: format!("{} Example", username),
            username: username.to_string(),
            secret: format!("{}-pw", username),
            initial_deposit: dec(cents),
        }
    }

    fn login(username: &str) -> Command {
        Command::Login {
            username: username.to_string(),
            secret: format!("{}-pw", username),
        }
    }

    #[test]
    fn test_create_does_not_log_in() {
        let mut store = AccountStore::new();
        let mut session = Session::new(&mut store);

        let outcome = session.execute(create("alice", 10000)).unwrap();

        assert!(matches!(outcome, Outcome::Created(ref a) if a.id == 1));
        assert_eq!(session.current(), None);
    }

    #[rstest]
    #[case::logout(Command::Logout)]
    #[case::view(Command::View)]
    #[case::deposit(Command::Deposit { amount: Decimal::ONE })]
    #[case::withdraw(Command::Withdraw { amount: Decimal::ONE })]
    #[case::transfer(Command::Transfer { to: Recipient::ById(1), amount: Decimal::ONE })]
    #[case::close(Command::Close { resolution: None })]
    fn test_account_commands_require_login(#[case] command: Command) {
        let mut store = AccountStore::new();
        let mut session = Session::new(&mut store);
        let name = command.name();

        let result = session.execute(command);

        assert_eq!(result.unwrap_err(), LedgerError::not_logged_in(name));
    }

    #[test]
    fn test_failed_login_keeps_previous_login() {
        let mut store = AccountStore::new();
        let mut session = Session::new(&mut store);
        session.execute(create("alice", 0)).unwrap();
        session.execute(login("alice")).unwrap();

        let result = session.execute(Command::Login {
            username: "alice".to_string(),
            secret: "wrong".to_string(),
        });

        assert_eq!(
            result.unwrap_err(),
            LedgerError::invalid_credentials("alice")
        );
        assert_eq!(session.current(), Some(1));
    }

    #[test]
    fn test_login_replaces_current_login() {
        let mut store = AccountStore::new();
        let mut session = Session::new(&mut store);
        session.execute(create("alice", 0)).unwrap();
        session.execute(create("bob", 0)).unwrap();

        session.execute(login("alice")).unwrap();
        session.execute(login("bob")).unwrap();

        assert_eq!(session.current(), Some(2));
    }

    #[test]
    fn test_money_commands_report_new_balance() {
        let mut store = AccountStore::new();
        let mut session = Session::new(&mut store);
        session.execute(create("alice", 10000)).unwrap();
        session.execute(create("bob", 0)).unwrap();
        session.execute(login("alice")).unwrap();

        assert_eq!(
            session
                .execute(Command::Deposit { amount: dec(500) })
                .unwrap(),
            Outcome::Balance(dec(10500))
        );
        assert_eq!(
            session
                .execute(Command::Withdraw { amount: dec(1500) })
                .unwrap(),
            Outcome::Balance(dec(9000))
        );
        assert_eq!(
            session
                .execute(Command::Transfer {
                    to: Recipient::ByUsername("bob".to_string()),
                    amount: dec(4000),
                })
                .unwrap(),
            Outcome::Balance(dec(5000))
        );
    }

    #[test]
    fn test_view_shows_logged_in_account() {
        let mut store = AccountStore::new();
        let mut session = Session::new(&mut store);
        session.execute(create("alice", 2500)).unwrap();
        session.execute(login("alice")).unwrap();

        let outcome = session.execute(Command::View).unwrap();

        assert_eq!(
            outcome.to_string(),
            "account 1: alice Example (alice), balance 25.00"
        );
    }

    #[test]
    fn test_close_logs_out() {
        let mut store = AccountStore::new();
        let mut session = Session::new(&mut store);
        session.execute(create("alice", 6000)).unwrap();
        session.execute(login("alice")).unwrap();

        let outcome = session
            .execute(Command::Close {
                resolution: Some(CloseResolution::WithdrawAll),
            })
            .unwrap();

        assert_eq!(outcome.to_string(), "account 1 closed, 60.00 withdrawn");
        assert_eq!(session.current(), None);
        assert_eq!(
            session.execute(Command::View).unwrap_err(),
            LedgerError::not_logged_in("view")
        );
    }

    #[test]
    fn test_rejected_close_stays_logged_in() {
        let mut store = AccountStore::new();
        let mut session = Session::new(&mut store);
        session.execute(create("alice", 6000)).unwrap();
        session.execute(login("alice")).unwrap();

        let result = session.execute(Command::Close { resolution: None });

        assert_eq!(
            result.unwrap_err(),
            LedgerError::outstanding_balance(1, dec(6000))
        );
        assert_eq!(session.current(), Some(1));
    }

    #[test]
    fn test_sessions_share_concurrent_store() {
        let store = Arc::new(ConcurrentAccountStore::new());

        let mut first_handle = Arc::clone(&store);
        let mut first = Session::new(&mut first_handle);
        first.execute(create("alice", 10000)).unwrap();
        first.execute(create("bob", 0)).unwrap();
        first.execute(login("alice")).unwrap();
        first
            .execute(Command::Transfer {
                to: Recipient::ById(2),
                amount: dec(4000),
            })
            .unwrap();

        let mut second_handle = Arc::clone(&store);
        let mut second = Session::new(&mut second_handle);
        second.execute(login("bob")).unwrap();

        assert_eq!(
            second.execute(Command::View).unwrap(),
            Outcome::Account(store.find_by_id(2).unwrap())
        );
        assert_eq!(store.find_by_id(2).unwrap().balance, dec(4000));
    }
}
