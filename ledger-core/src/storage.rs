//! In-memory ledger store
//!
//! # Collections
//!
//! - `customers` - Customers (key: customer_id)
//! - `accounts` - Accounts (key: account_id)
//! - `transactions` - Append-only transaction log, insertion ordered
//!
//! Each collection sits behind its own reader/writer lock, so reads proceed
//! in parallel and a write excludes only its own collection. Collection locks
//! are held for the duration of one call and never across an `.await`.
//!
//! Read-modify-write sequences on balances are serialized separately through
//! [`LedgerStore::lock_accounts`], which hands out per-account async locks in
//! a fixed (sorted) order.

use crate::types::{Account, AccountId, Customer, CustomerId, Transaction, TransactionId};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Append-only transaction log with an ID index
#[derive(Default)]
struct TransactionLog {
    entries: Vec<Transaction>,
    index: HashMap<TransactionId, usize>,
}

/// Concurrency-safe repository of customers, accounts and transactions
#[derive(Default)]
pub struct LedgerStore {
    customers: RwLock<HashMap<CustomerId, Customer>>,
    accounts: RwLock<HashMap<AccountId, Account>>,
    transactions: RwLock<TransactionLog>,
    account_locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

/// Exclusive hold on a set of accounts; released on drop
pub struct AccountGuard {
    account_ids: Vec<AccountId>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl std::fmt::Debug for AccountGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountGuard")
            .field("account_ids", &self.account_ids)
            .finish()
    }
}

impl LedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    // Customers

    /// Insert or overwrite a customer
    pub fn add_customer(&self, customer: Customer) {
        self.customers.write().insert(customer.id.clone(), customer);
    }

    /// Get customer by ID
    pub fn get_customer(&self, id: &CustomerId) -> Option<Customer> {
        self.customers.read().get(id).cloned()
    }

    /// Whether a customer exists
    pub fn customer_exists(&self, id: &CustomerId) -> bool {
        self.customers.read().contains_key(id)
    }

    // Accounts

    /// Insert or overwrite an account
    pub fn add_account(&self, account: Account) {
        self.accounts.write().insert(account.id.clone(), account);
    }

    /// Get account by ID
    pub fn get_account(&self, id: &AccountId) -> Option<Account> {
        self.accounts.read().get(id).cloned()
    }

    /// Replace the stored record for `account.id`
    ///
    /// Callers changing balances must hold the account's [`AccountGuard`].
    pub fn update_account(&self, account: Account) {
        self.accounts.write().insert(account.id.clone(), account);
    }

    /// Replace several account records under one write lock
    pub fn update_accounts(&self, accounts: impl IntoIterator<Item = Account>) {
        let mut map = self.accounts.write();
        for account in accounts {
            map.insert(account.id.clone(), account);
        }
    }

    /// All accounts owned by a customer (unordered)
    pub fn list_accounts_by_customer(&self, customer_id: &CustomerId) -> Vec<Account> {
        self.accounts
            .read()
            .values()
            .filter(|account| &account.customer_id == customer_id)
            .cloned()
            .collect()
    }

    // Transactions

    /// Append a transaction
    ///
    /// IDs are unique by construction; a repeated ID is logged and the
    /// record still appended, since the log is never rewritten.
    pub fn add_transaction(&self, transaction: Transaction) {
        let mut log = self.transactions.write();
        let position = log.entries.len();
        if log.index.insert(transaction.id.clone(), position).is_some() {
            tracing::warn!("Duplicate transaction ID appended: {}", transaction.id);
        }
        log.entries.push(transaction);
    }

    /// Append a batch of transactions under one write lock
    pub fn add_transactions(&self, transactions: impl IntoIterator<Item = Transaction>) {
        let mut log = self.transactions.write();
        for transaction in transactions {
            let position = log.entries.len();
            if log.index.insert(transaction.id.clone(), position).is_some() {
                tracing::warn!("Duplicate transaction ID appended: {}", transaction.id);
            }
            log.entries.push(transaction);
        }
    }

    /// Get transaction by ID
    pub fn get_transaction(&self, id: &TransactionId) -> Option<Transaction> {
        let log = self.transactions.read();
        log.index.get(id).map(|&position| log.entries[position].clone())
    }

    /// Transactions posted against any of the customer's accounts, in
    /// insertion order
    pub fn list_transactions_by_customer(&self, customer_id: &CustomerId) -> Vec<Transaction> {
        let account_ids: HashSet<AccountId> = self
            .accounts
            .read()
            .values()
            .filter(|account| &account.customer_id == customer_id)
            .map(|account| account.id.clone())
            .collect();

        self.transactions
            .read()
            .entries
            .iter()
            .filter(|tx| account_ids.contains(&tx.account_id))
            .cloned()
            .collect()
    }

    /// Number of recorded transactions
    pub fn transaction_count(&self) -> usize {
        self.transactions.read().entries.len()
    }

    // Locking

    /// Acquire exclusive holds on the given accounts
    ///
    /// Locks are taken in sorted ID order so two callers locking overlapping
    /// sets cannot deadlock. Duplicate IDs are collapsed.
    pub async fn lock_accounts(&self, ids: &[&AccountId]) -> AccountGuard {
        let mut account_ids: Vec<AccountId> = ids.iter().map(|id| (*id).clone()).collect();
        account_ids.sort();
        account_ids.dedup();

        let mut guards = Vec::with_capacity(account_ids.len());
        for id in &account_ids {
            let lock = self.account_locks.entry(id.clone()).or_default().value().clone();
            guards.push(lock.lock_owned().await);
        }

        AccountGuard {
            account_ids,
            _guards: guards,
        }
    }
}

impl std::fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerStore")
            .field("customers", &self.customers.read().len())
            .field("accounts", &self.accounts.read().len())
            .field("transactions", &self.transactions.read().entries.len())
            .finish()
    }
}
