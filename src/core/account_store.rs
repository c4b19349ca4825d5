//! Account store module
//!
//! This module provides the `AccountStore` struct which owns every account
//! record and is the only writer of any account field.
//!
//! The AccountStore is responsible for:
//! - Assigning serial identifiers (never reused, even after closure)
//! - Keeping usernames unique among active accounts
//! - Keeping every balance non-negative
//! - Applying transfers and closures to both records or to neither
//! - Providing sorted account listings for output

use crate::core::traits::{require_positive, validate_username, Ledger};
use crate::types::{
    Account, AccountId, AccountStatus, CloseReceipt, CloseResolution, Credential, LedgerError,
    Recipient,
};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Single-threaded account store
///
/// Records live in a map keyed by ID and are never removed; a second map
/// indexes active accounts by username and is kept in sync on create and
/// close. Mutation requires `&mut self`, so no operation can observe
/// another one half-applied.
#[derive(Debug)]
pub struct AccountStore {
    /// Every account ever created, keyed by ID
    accounts: HashMap<AccountId, Account>,

    /// Active accounts only, username to ID
    usernames: HashMap<String, AccountId>,

    /// Highest ID issued so far (0 when empty)
    last_id: AccountId,
}

impl AccountStore {
    /// Create a new AccountStore with no accounts
    pub fn new() -> Self {
        AccountStore {
            accounts: HashMap::new(),
            usernames: HashMap::new(),
            last_id: 0,
        }
    }

    /// Open a new active account
    ///
    /// # Arguments
    ///
    /// * `full_name` - Display name, may contain spaces
    /// * `username` - Login name, must be unused among active accounts
    /// * `secret` - Plaintext password; only its Argon2id hash is kept
    /// * `initial_deposit` - Opening balance (zero or more)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The username is empty or contains whitespace
    /// - The username is held by an active account
    /// - The initial deposit is negative
    /// - The identifier space is exhausted
    /// - The secret cannot be hashed
    pub fn create_account(
        &mut self,
        full_name: &str,
        username: &str,
        secret: &str,
        initial_deposit: Decimal,
    ) -> Result<&Account, LedgerError> {
        validate_username(username)?;

        if self.usernames.contains_key(username) {
            return Err(LedgerError::duplicate_username(username));
        }

        if initial_deposit < Decimal::ZERO {
            return Err(LedgerError::invalid_amount(initial_deposit, "initial deposit"));
        }

        let id = self
            .last_id
            .checked_add(1)
            .ok_or(LedgerError::CapacityExceeded)?;

        let account = Account::new(
            id,
            full_name,
            username,
            Credential::derive(secret)?,
            initial_deposit,
        );

        self.last_id = id;
        self.usernames.insert(username.to_string(), id);
        tracing::debug!(account = id, username, balance = %initial_deposit, "account created");

        Ok(self.accounts.entry(id).or_insert(account))
    }

    /// Check a username/secret pair against the active accounts
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No active account has that username
    /// - The secret does not match
    pub fn authenticate(&self, username: &str, secret: &str) -> Result<&Account, LedgerError> {
        let account = self
            .find_by_username(username)
            .ok_or_else(|| LedgerError::username_not_found(username))?;

        if !account.credential.verify(secret) {
            return Err(LedgerError::invalid_credentials(username));
        }

        Ok(account)
    }

    /// Deposit funds into an account
    ///
    /// Uses checked arithmetic to prevent overflow and maintain account integrity.
    ///
    /// # Returns
    ///
    /// The account's new balance
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is not strictly positive
    /// - The account does not exist or is closed
    /// - Adding the amount would overflow the balance
    pub fn deposit(&mut self, id: AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        require_positive(amount, "deposit")?;

        let account = self.active_mut(id)?;
        let new_balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", id))?;

        account.balance = new_balance;
        tracing::debug!(account = id, %amount, balance = %new_balance, "deposit applied");

        Ok(new_balance)
    }

    /// Withdraw funds from an account
    ///
    /// # Returns
    ///
    /// The account's new balance
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is not strictly positive
    /// - The account does not exist or is closed
    /// - The amount exceeds the balance
    pub fn withdraw(&mut self, id: AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        require_positive(amount, "withdraw")?;

        let account = self.active_mut(id)?;
        if amount > account.balance {
            return Err(LedgerError::insufficient_funds(id, account.balance, amount));
        }

        account.balance -= amount;
        let new_balance = account.balance;
        tracing::debug!(account = id, %amount, balance = %new_balance, "withdrawal applied");

        Ok(new_balance)
    }

    /// Move funds from one active account to another
    ///
    /// Both new balances are computed before either record is written, so a
    /// failed transfer leaves both accounts untouched.
    ///
    /// # Returns
    ///
    /// The source account's new balance
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The source does not exist or is closed
    /// - The recipient does not resolve to an active account
    /// - The recipient is the source itself
    /// - The amount is not strictly positive or exceeds the source balance
    /// - Crediting the recipient would overflow
    pub fn transfer(
        &mut self,
        from: AccountId,
        to: &Recipient,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let source_balance = self.active(from)?.balance;
        let target = self.resolve(to)?;

        if target.id == from {
            return Err(LedgerError::same_account(from));
        }

        require_positive(amount, "transfer")?;

        if amount > source_balance {
            return Err(LedgerError::insufficient_funds(from, source_balance, amount));
        }

        let target_id = target.id;
        let new_target_balance = target
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", target_id))?;
        let new_source_balance = source_balance - amount;

        self.set_balance(from, new_source_balance);
        self.set_balance(target_id, new_target_balance);
        tracing::debug!(from, to = target_id, %amount, "transfer applied");

        Ok(new_source_balance)
    }

    /// Settle any remaining balance and close an account
    ///
    /// An empty account closes directly and the resolution is ignored. A
    /// non-empty account needs a resolution: `WithdrawAll` pays the balance
    /// out, `TransferAllTo` moves it to another active account. Either way
    /// the balance reaches zero, the account is marked closed and its
    /// username is released.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist
    /// - The account is already closed (no resolution logic runs)
    /// - Money remains and no resolution was given
    /// - The transfer target is unknown, closed, or the account itself
    pub fn close(
        &mut self,
        id: AccountId,
        resolution: Option<&CloseResolution>,
    ) -> Result<CloseReceipt, LedgerError> {
        let account = self
            .accounts
            .get(&id)
            .ok_or_else(|| LedgerError::id_not_found(id))?;

        if !account.is_active() {
            return Err(LedgerError::already_closed(id));
        }

        let settled = account.balance;
        let username = account.username.clone();
        let mut recipient = None;

        if settled > Decimal::ZERO {
            match resolution {
                None => return Err(LedgerError::outstanding_balance(id, settled)),
                Some(CloseResolution::WithdrawAll) => {}
                Some(CloseResolution::TransferAllTo(target_username)) => {
                    let target = self.resolve(&Recipient::ByUsername(target_username.clone()))?;
                    if target.id == id {
                        return Err(LedgerError::same_account(id));
                    }

                    let target_id = target.id;
                    let new_target_balance = target
                        .balance
                        .checked_add(settled)
                        .ok_or_else(|| LedgerError::arithmetic_overflow("close", target_id))?;

                    self.set_balance(target_id, new_target_balance);
                    recipient = Some(target_id);
                }
            }
        }

        if let Some(account) = self.accounts.get_mut(&id) {
            account.balance = Decimal::ZERO;
            account.status = AccountStatus::Closed;
        }
        self.usernames.remove(&username);
        tracing::debug!(account = id, %settled, ?recipient, "account closed");

        Ok(CloseReceipt {
            account: id,
            settled,
            recipient,
        })
    }

    /// Look up an active account by username
    pub fn find_by_username(&self, username: &str) -> Option<&Account> {
        self.usernames
            .get(username)
            .and_then(|id| self.accounts.get(id))
    }

    /// Look up an active account by ID
    pub fn find_by_id(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id).filter(|account| account.is_active())
    }

    /// Get all accounts sorted by ID
    ///
    /// Includes closed accounts so the listing shows the full identifier
    /// history.
    pub fn get_all_accounts(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    fn active(&self, id: AccountId) -> Result<&Account, LedgerError> {
        match self.accounts.get(&id) {
            None => Err(LedgerError::id_not_found(id)),
            Some(account) if !account.is_active() => Err(LedgerError::inactive_account(id)),
            Some(account) => Ok(account),
        }
    }

    fn active_mut(&mut self, id: AccountId) -> Result<&mut Account, LedgerError> {
        match self.accounts.get_mut(&id) {
            None => Err(LedgerError::id_not_found(id)),
            Some(account) if !account.is_active() => Err(LedgerError::inactive_account(id)),
            Some(account) => Ok(account),
        }
    }

    /// Resolve a transfer recipient to an active account
    fn resolve(&self, recipient: &Recipient) -> Result<&Account, LedgerError> {
        let account = match recipient {
            Recipient::ById(id) => self.find_by_id(*id),
            Recipient::ByUsername(username) => self.find_by_username(username),
        };
        account.ok_or_else(|| LedgerError::recipient_not_found(recipient))
    }

    // Callers have already resolved `id` to an active account.
    fn set_balance(&mut self, id: AccountId, balance: Decimal) {
        if let Some(account) = self.accounts.get_mut(&id) {
            account.balance = balance;
        }
    }

    #[cfg(test)]
    fn with_last_id(last_id: AccountId) -> Self {
        AccountStore {
            last_id,
            ..Self::new()
        }
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger for AccountStore {
    fn create_account(
        &mut self,
        full_name: &str,
        username: &str,
        secret: &str,
        initial_deposit: Decimal,
    ) -> Result<Account, LedgerError> {
        AccountStore::create_account(self, full_name, username, secret, initial_deposit)
            .cloned()
    }

    fn authenticate(&self, username: &str, secret: &str) -> Result<Account, LedgerError> {
        AccountStore::authenticate(self, username, secret).cloned()
    }

    fn deposit(&mut self, account: AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        AccountStore::deposit(self, account, amount)
    }

    fn withdraw(&mut self, account: AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        AccountStore::withdraw(self, account, amount)
    }

    fn transfer(
        &mut self,
        from: AccountId,
        to: &Recipient,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        AccountStore::transfer(self, from, to, amount)
    }

    fn close(
        &mut self,
        account: AccountId,
        resolution: Option<&CloseResolution>,
    ) -> Result<CloseReceipt, LedgerError> {
        AccountStore::close(self, account, resolution)
    }

    fn find_by_username(&self, username: &str) -> Option<Account> {
        AccountStore::find_by_username(self, username).cloned()
    }

    fn find_by_id(&self, account: AccountId) -> Option<Account> {
        AccountStore::find_by_id(self, account).cloned()
    }

    fn accounts(&self) -> Vec<Account> {
        self.get_all_accounts().into_iter().cloned().collect()
    }
}
