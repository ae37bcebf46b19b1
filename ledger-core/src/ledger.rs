//! Main ledger orchestration layer
//!
//! This module ties together the store, the partner gateway, the transfer
//! engine and metrics into the high-level API the HTTP layer calls.
//!
//! # Example
//!
//! ```no_run
//! use ledger_core::{Config, Ledger, TransferRequest};
//! use rust_decimal_macros::dec;
//!
//! #[tokio::main]
//! async fn main() -> ledger_core::Result<()> {
//!     let ledger = Ledger::open(Config::default())?;
//!
//!     let jane = ledger.create_customer("Jane Doe", "jane@example.com")?;
//!     let request = TransferRequest::new(
//!         jane.savings_account_id.as_str(),
//!         jane.current_account_id.as_str(),
//!         dec!(100),
//!     );
//!     let result = ledger.transfer(&jane.customer_id, &request).await?;
//!     println!("committed {}", result.transaction_id);
//!
//!     Ok(())
//! }
//! ```

use crate::{
    metrics::Metrics,
    onboarding,
    partner::{MockPartnerBank, PartnerGateway},
    storage::LedgerStore,
    transfer::TransferEngine,
    types::{
        Account, AccountId, AccountKind, CustomerId, OnboardedCustomer, PartnerBalance,
        Transaction, TransactionFilter, TransactionKind, TransferRequest, TransferResult,
    },
    Config, Error, Result,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

/// Main ledger interface
pub struct Ledger {
    /// Shared store
    store: Arc<LedgerStore>,

    /// Partner bank
    partner: Arc<dyn PartnerGateway>,

    /// Transfer engine
    engine: TransferEngine,

    /// Metrics
    metrics: Arc<Metrics>,

    /// Configuration
    config: Config,
}

impl Ledger {
    /// Open a ledger backed by the simulated partner bank
    pub fn open(config: Config) -> Result<Self> {
        let partner = Arc::new(MockPartnerBank::new(&config.partner));
        Self::with_partner(config, partner)
    }

    /// Open a ledger against a specific partner gateway
    pub fn with_partner(config: Config, partner: Arc<dyn PartnerGateway>) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(LedgerStore::new());
        let metrics = Arc::new(Metrics::new()?);
        let engine = TransferEngine::new(
            store.clone(),
            partner.clone(),
            config.fees.clone(),
            metrics.clone(),
        );

        Ok(Self {
            store,
            partner,
            engine,
            metrics,
            config,
        })
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<LedgerStore> {
        &self.store
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Onboard a customer
    pub fn create_customer(&self, name: &str, email: &str) -> Result<OnboardedCustomer> {
        let created =
            onboarding::create_customer(&self.store, &self.config.onboarding, name, email)?;
        self.metrics.record_customer_created();
        Ok(created)
    }

    /// Accounts of an existing customer; a customer without accounts is an error
    pub fn customer_accounts(&self, customer_id: &CustomerId) -> Result<Vec<Account>> {
        self.ensure_customer(customer_id)?;

        let mut accounts = self.store.list_accounts_by_customer(customer_id);
        if accounts.is_empty() {
            return Err(Error::NoAccounts(customer_id.clone()));
        }
        accounts.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));

        debug!("Fetched {} accounts for customer {}", accounts.len(), customer_id);
        Ok(accounts)
    }

    /// Execute a transfer
    pub async fn transfer(
        &self,
        customer_id: &CustomerId,
        request: &TransferRequest,
    ) -> Result<TransferResult> {
        self.engine.transfer(customer_id, request).await
    }

    /// Balances of the linked partner accounts
    ///
    /// A token failure fails the whole call; a failed lookup for one account
    /// just leaves that account out.
    pub async fn partner_balances(&self, customer_id: &CustomerId) -> Result<Vec<PartnerBalance>> {
        self.ensure_customer(customer_id)?;

        let token = self.partner.get_token().await.map_err(|e| {
            self.metrics.record_partner_failure();
            Error::Partner(e)
        })?;

        let mut balances = Vec::with_capacity(self.config.partner.linked_accounts.len());
        for account_id in &self.config.partner.linked_accounts {
            match self.partner.get_balance(account_id, &token.value).await {
                Ok(balance) => balances.push(PartnerBalance {
                    account_id: AccountId::new(account_id.clone()),
                    balance,
                }),
                Err(e) => {
                    warn!("Skipping Bank Z account {}: {}", account_id, e);
                    self.metrics.record_partner_failure();
                }
            }
        }

        Ok(balances)
    }

    /// Transactions of a customer matching `filter`, in insertion order
    pub fn transactions(
        &self,
        customer_id: &CustomerId,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        self.ensure_customer(customer_id)?;

        let transactions: Vec<Transaction> = self
            .store
            .list_transactions_by_customer(customer_id)
            .into_iter()
            .filter(|tx| filter.matches(tx))
            .collect();

        debug!(
            "Fetched {} transactions for customer {}",
            transactions.len(),
            customer_id
        );
        Ok(transactions)
    }

    /// Check that an account's balance is explained by the transaction log
    ///
    /// Re-derives the balance from the opening balance for the account kind
    /// plus every transaction that credits or debits it.
    pub fn check_balance_consistency(&self, account_id: &AccountId) -> Result<bool> {
        let account = self
            .store
            .get_account(account_id)
            .ok_or_else(|| Error::SourceAccountNotFound(account_id.clone()))?;

        let mut derived = match account.kind {
            AccountKind::Current => self.config.onboarding.current_opening_balance,
            AccountKind::Savings => Decimal::ZERO,
        };

        for tx in self.store.list_transactions_by_customer(&account.customer_id) {
            let posted_here = tx.account_id == account.id;
            let outgoing = tx.from_account_id.as_ref() == Some(&account.id);
            let incoming = tx.to_account_id.as_ref() == Some(&account.id);

            match tx.kind {
                TransactionKind::Bonus | TransactionKind::Interest if posted_here => {
                    derived += tx.amount
                }
                TransactionKind::Fee if posted_here => derived -= tx.amount,
                TransactionKind::Transfer | TransactionKind::BankzTransfer => {
                    if outgoing {
                        derived -= tx.amount;
                    }
                    if incoming {
                        derived += tx.amount;
                    }
                }
                _ => {}
            }
        }

        if derived != account.balance {
            warn!(
                "Account {} balance {} does not match derived {}",
                account.id, account.balance, derived
            );
        }

        Ok(derived == account.balance)
    }

    fn ensure_customer(&self, customer_id: &CustomerId) -> Result<()> {
        if self.store.customer_exists(customer_id) {
            Ok(())
        } else {
            Err(Error::CustomerNotFound(customer_id.clone()))
        }
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("store", &self.store)
            .field("service", &self.config.service_name)
            .finish()
    }
}
