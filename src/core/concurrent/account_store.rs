//! Thread-safe account store for concurrent sessions
//!
//! This module provides the `ConcurrentAccountStore` struct, which manages
//! account records using concurrent data structures so that several sessions
//! can drive one ledger at once.
//!
//! # Design
//!
//! Records are `Arc<Mutex<Account>>` values in a `DashMap` keyed by ID. A
//! second `DashMap` indexes active accounts by username. Index lookups only
//! copy an ID or clone an `Arc` out of the map, so no shard guard is held
//! while a record lock is awaited.
//!
//! # Lock Ordering
//!
//! - Two-record operations (transfer, close with transfer) lock the lower ID first
//! - Create holds a username-index entry while inserting the record, never a record lock
//! - Close holds record locks while releasing the username-index entry
//!
//! Every status and balance check is repeated under the record lock, so a
//! lookup that raced with a close or a transfer never acts on stale state.

use crate::core::traits::{require_positive, validate_username, Ledger};
use crate::types::{
    Account, AccountId, AccountStatus, CloseReceipt, CloseResolution, Credential, LedgerError,
    Recipient,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Record = Arc<Mutex<Account>>;

/// Thread-safe account store
///
/// All methods take `&self` and are safe to call from multiple threads
/// concurrently. Share it behind an `Arc`; `Arc<ConcurrentAccountStore>`
/// implements [`Ledger`].
#[derive(Debug)]
pub struct ConcurrentAccountStore {
    /// Every account ever created, keyed by ID
    accounts: DashMap<AccountId, Record>,

    /// Active accounts only, username to ID
    usernames: DashMap<String, AccountId>,

    /// Highest ID issued so far (0 when empty)
    last_id: AtomicU64,
}

impl ConcurrentAccountStore {
    /// Create a new empty ConcurrentAccountStore
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            usernames: DashMap::new(),
            last_id: AtomicU64::new(0),
        }
    }

    /// Open a new active account
    ///
    /// The username-index entry is held from the uniqueness check until the
    /// record is published, so two racing creates of one name cannot both
    /// succeed.
    ///
    /// # Errors
    ///
    /// Same as [`AccountStore::create_account`](crate::core::AccountStore::create_account).
    pub fn create_account(
        &self,
        full_name: &str,
        username: &str,
        secret: &str,
        initial_deposit: Decimal,
    ) -> Result<Account, LedgerError> {
        validate_username(username)?;

        let credential = Credential::derive(secret)?;

        match self.usernames.entry(username.to_string()) {
            Entry::Occupied(_) => Err(LedgerError::duplicate_username(username)),
            Entry::Vacant(slot) => {
                if initial_deposit < Decimal::ZERO {
                    return Err(LedgerError::invalid_amount(
                        initial_deposit,
                        "initial deposit",
                    ));
                }

                let id = self.next_id()?;
                let account = Account::new(id, full_name, username, credential, initial_deposit);

                self.accounts
                    .insert(id, Arc::new(Mutex::new(account.clone())));
                slot.insert(id);
                tracing::debug!(account = id, username, balance = %initial_deposit, "account created");

                Ok(account)
            }
        }
    }

    /// Check a username/secret pair against the active accounts
    pub fn authenticate(&self, username: &str, secret: &str) -> Result<Account, LedgerError> {
        let record = self
            .index_lookup(username)
            .and_then(|id| self.record(id))
            .ok_or_else(|| LedgerError::username_not_found(username))?;

        let account = lock(&record);
        if !account.is_active() {
            return Err(LedgerError::username_not_found(username));
        }

        if !account.credential.verify(secret) {
            return Err(LedgerError::invalid_credentials(username));
        }

        Ok(account.clone())
    }

    /// Deposit funds into an account, locking only that account
    pub fn deposit(&self, id: AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        require_positive(amount, "deposit")?;

        let record = self.record(id).ok_or_else(|| LedgerError::id_not_found(id))?;
        let mut account = lock(&record);
        ensure_active(&account)?;

        let new_balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", id))?;

        account.balance = new_balance;
        tracing::debug!(account = id, %amount, balance = %new_balance, "deposit applied");

        Ok(new_balance)
    }

    /// Withdraw funds from an account, locking only that account
    pub fn withdraw(&self, id: AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        require_positive(amount, "withdraw")?;

        let record = self.record(id).ok_or_else(|| LedgerError::id_not_found(id))?;
        let mut account = lock(&record);
        ensure_active(&account)?;

        if amount > account.balance {
            return Err(LedgerError::insufficient_funds(id, account.balance, amount));
        }

        account.balance -= amount;
        let new_balance = account.balance;
        tracing::debug!(account = id, %amount, balance = %new_balance, "withdrawal applied");

        Ok(new_balance)
    }

    /// Move funds between two active accounts
    ///
    /// Both records are locked (lower ID first) for the whole
    /// validate-then-write step.
    pub fn transfer(
        &self,
        from: AccountId,
        to: &Recipient,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let source = self
            .record(from)
            .ok_or_else(|| LedgerError::id_not_found(from))?;
        ensure_active(&lock(&source))?;

        let target_id = self.resolve(to)?;
        if target_id == from {
            return Err(LedgerError::same_account(from));
        }

        let target = self
            .record(target_id)
            .ok_or_else(|| LedgerError::recipient_not_found(to))?;
        let (mut source, mut target) = lock_pair((from, &source), (target_id, &target));

        ensure_active(&source)?;
        if !target.is_active() {
            return Err(LedgerError::recipient_not_found(to));
        }

        require_positive(amount, "transfer")?;

        if amount > source.balance {
            return Err(LedgerError::insufficient_funds(from, source.balance, amount));
        }

        let new_target_balance = target
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", target_id))?;

        source.balance -= amount;
        target.balance = new_target_balance;
        tracing::debug!(from, to = target_id, %amount, "transfer applied");

        Ok(source.balance)
    }

    /// Settle any remaining balance and close an account
    ///
    /// With `TransferAllTo`, both records are locked (lower ID first) while
    /// the balance moves and the account is marked closed.
    pub fn close(
        &self,
        id: AccountId,
        resolution: Option<&CloseResolution>,
    ) -> Result<CloseReceipt, LedgerError> {
        let record = self.record(id).ok_or_else(|| LedgerError::id_not_found(id))?;

        let target_username = {
            let account = lock(&record);
            if !account.is_active() {
                return Err(LedgerError::already_closed(id));
            }

            match (account.balance > Decimal::ZERO, resolution) {
                (false, _) | (true, Some(CloseResolution::WithdrawAll)) => {
                    return Ok(self.finish_close(account, None));
                }
                (true, None) => {
                    return Err(LedgerError::outstanding_balance(id, account.balance));
                }
                (true, Some(CloseResolution::TransferAllTo(username))) => username,
            }
        };

        let target_id = self
            .index_lookup(target_username)
            .ok_or_else(|| LedgerError::username_not_found(target_username))?;
        if target_id == id {
            return Err(LedgerError::same_account(id));
        }

        let target = self
            .record(target_id)
            .ok_or_else(|| LedgerError::username_not_found(target_username))?;
        let (account, mut target) = lock_pair((id, &record), (target_id, &target));

        if !account.is_active() {
            return Err(LedgerError::already_closed(id));
        }
        if !target.is_active() {
            return Err(LedgerError::username_not_found(target_username));
        }

        if account.balance > Decimal::ZERO {
            target.balance = target
                .balance
                .checked_add(account.balance)
                .ok_or_else(|| LedgerError::arithmetic_overflow("close", target_id))?;
            Ok(self.finish_close(account, Some(target_id)))
        } else {
            Ok(self.finish_close(account, None))
        }
    }

    /// Look up an active account by username
    pub fn find_by_username(&self, username: &str) -> Option<Account> {
        let record = self.index_lookup(username).and_then(|id| self.record(id))?;
        let account = lock(&record);
        account.is_active().then(|| account.clone())
    }

    /// Look up an active account by ID
    pub fn find_by_id(&self, id: AccountId) -> Option<Account> {
        let record = self.record(id)?;
        let account = lock(&record);
        account.is_active().then(|| account.clone())
    }

    /// Get all accounts for final output, sorted by ID
    ///
    /// Each record is a snapshot taken under its own lock; accounts may be
    /// created or modified by other threads after this method returns.
    pub fn get_all_accounts(&self) -> Vec<Account> {
        let records: Vec<Record> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut accounts: Vec<Account> = records.iter().map(|r| lock(r).clone()).collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    fn next_id(&self) -> Result<AccountId, LedgerError> {
        self.last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .map(|previous| previous + 1)
            .map_err(|_| LedgerError::CapacityExceeded)
    }

    fn record(&self, id: AccountId) -> Option<Record> {
        self.accounts.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    fn index_lookup(&self, username: &str) -> Option<AccountId> {
        self.usernames.get(username).map(|entry| *entry.value())
    }

    /// Resolve a transfer recipient to an ID; status is checked under lock
    fn resolve(&self, recipient: &Recipient) -> Result<AccountId, LedgerError> {
        let id = match recipient {
            Recipient::ById(id) => self.accounts.contains_key(id).then_some(*id),
            Recipient::ByUsername(username) => self.index_lookup(username),
        };
        id.ok_or_else(|| LedgerError::recipient_not_found(recipient))
    }

    /// Zero the balance, mark the record closed and release its username
    ///
    /// Must be called with the account's lock held.
    fn finish_close(
        &self,
        mut account: MutexGuard<'_, Account>,
        recipient: Option<AccountId>,
    ) -> CloseReceipt {
        let id = account.id;
        let settled = account.balance;

        account.balance = Decimal::ZERO;
        account.status = AccountStatus::Closed;
        self.usernames
            .remove_if(account.username.as_str(), |_, owner| *owner == id);
        tracing::debug!(account = id, %settled, ?recipient, "account closed");

        CloseReceipt {
            account: id,
            settled,
            recipient,
        }
    }

    #[cfg(test)]
    fn with_last_id(last_id: AccountId) -> Self {
        Self {
            last_id: AtomicU64::new(last_id),
            ..Self::new()
        }
    }
}

impl Default for ConcurrentAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

// A panic while a record was locked cannot leave it half-written: every
// mutation validates before it writes.
fn lock(record: &Mutex<Account>) -> MutexGuard<'_, Account> {
    record.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lock two distinct records, lower ID first
///
/// Guards are returned in argument order.
fn lock_pair<'a>(
    first: (AccountId, &'a Mutex<Account>),
    second: (AccountId, &'a Mutex<Account>),
) -> (MutexGuard<'a, Account>, MutexGuard<'a, Account>) {
    if first.0 < second.0 {
        let a = lock(first.1);
        let b = lock(second.1);
        (a, b)
    } else {
        let b = lock(second.1);
        let a = lock(first.1);
        (a, b)
    }
}

fn ensure_active(account: &Account) -> Result<(), LedgerError> {
    if account.is_active() {
        Ok(())
    } else {
        Err(LedgerError::inactive_account(account.id))
    }
}

impl Ledger for Arc<ConcurrentAccountStore> {
    fn create_account(
        &mut self,
        full_name: &str,
        username: &str,
        secret: &str,
        initial_deposit: Decimal,
    ) -> Result<Account, LedgerError> {
        ConcurrentAccountStore::create_account(self, full_name, username, secret, initial_deposit)
    }

    fn authenticate(&self, username: &str, secret: &str) -> Result<Account, LedgerError> {
        ConcurrentAccountStore::authenticate(self, username, secret)
    }

    fn deposit(&mut self, account: AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        ConcurrentAccountStore::deposit(self, account, amount)
    }

    fn withdraw(&mut self, account: AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        ConcurrentAccountStore::withdraw(self, account, amount)
    }

    fn transfer(
        &mut self,
        from: AccountId,
        to: &Recipient,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        ConcurrentAccountStore::transfer(self, from, to, amount)
    }

    fn close(
        &mut self,
        account: AccountId,
        resolution: Option<&CloseResolution>,
    ) -> Result<CloseReceipt, LedgerError> {
        ConcurrentAccountStore::close(self, account, resolution)
    }

    fn find_by_username(&self, username: &str) -> Option<Account> {
        ConcurrentAccountStore::find_by_username(self, username)
    }

    fn find_by_id(&self, account: AccountId) -> Option<Account> {
        ConcurrentAccountStore::find_by_id(self, account)
    }

    fn accounts(&self) -> Vec<Account> {
        self.get_all_accounts()
    }
}
