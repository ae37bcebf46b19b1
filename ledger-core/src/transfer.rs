//! Transfer engine
//!
//! Classifies a transfer as internal or external, applies the fee and
//! interest policy, and commits balances plus transaction records.
//!
//! # Commit discipline
//!
//! - Internal: both accounts are locked (sorted order), re-read, checked and
//!   written back before the locks drop. Validation completes before any
//!   mutation.
//! - External: only the source account is locked. The partner is called
//!   first; the local debit happens only after the partner confirms, so a
//!   failed partner call leaves local state untouched. Store collection locks
//!   are never held while waiting on the partner.

use crate::config::FeeConfig;
use crate::metrics::Metrics;
use crate::partner::{PartnerError, PartnerGateway};
use crate::storage::LedgerStore;
use crate::types::{
    Account, AccountId, AccountKind, CustomerId, Transaction, TransactionId, TransactionKind,
    TransferRequest, TransferResult, TransferRoute, TransferStatus,
};
use crate::{Error, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Fee and interest amounts for an internal transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charges {
    /// Deducted from the source on top of the amount
    pub fee: Decimal,
    /// Credited to the destination on top of the amount
    pub interest: Decimal,
}

impl Charges {
    /// Total debit from the source
    pub fn required(&self, amount: Decimal) -> Result<Decimal> {
        amount.checked_add(self.fee).ok_or_else(amount_too_large)
    }

    /// Total credit to the destination
    pub fn credited(&self, amount: Decimal) -> Result<Decimal> {
        amount.checked_add(self.interest).ok_or_else(amount_too_large)
    }
}

/// Compute charges from the account kinds
pub fn compute_charges(
    policy: &FeeConfig,
    source: AccountKind,
    destination: AccountKind,
    amount: Decimal,
) -> Result<Charges> {
    let fee = match source {
        AccountKind::Current => amount
            .checked_mul(policy.current_account_fee_rate)
            .ok_or_else(amount_too_large)?,
        AccountKind::Savings => Decimal::ZERO,
    };
    let interest = match destination {
        AccountKind::Savings => amount
            .checked_mul(policy.savings_interest_rate)
            .ok_or_else(amount_too_large)?,
        AccountKind::Current => Decimal::ZERO,
    };
    Ok(Charges { fee, interest })
}

fn amount_too_large() -> Error {
    Error::validation("Amount too large")
}

/// Resolved destination
enum Destination {
    Local(Account),
    Partner,
}

/// Transfer engine
pub struct TransferEngine {
    store: Arc<LedgerStore>,
    partner: Arc<dyn PartnerGateway>,
    policy: FeeConfig,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for TransferEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferEngine")
            .field("policy", &self.policy)
            .finish()
    }
}

impl TransferEngine {
    /// Create new engine
    pub fn new(
        store: Arc<LedgerStore>,
        partner: Arc<dyn PartnerGateway>,
        policy: FeeConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            partner,
            policy,
            metrics,
        }
    }

    /// Move money on behalf of a customer
    pub async fn transfer(
        &self,
        customer_id: &CustomerId,
        request: &TransferRequest,
    ) -> Result<TransferResult> {
        let start = Instant::now();

        let result = self.execute(customer_id, request).await;

        match &result {
            Ok(outcome) => {
                self.metrics
                    .record_transfer(outcome.route.as_str(), start.elapsed().as_secs_f64());
            }
            Err(err) => {
                warn!(
                    "Transfer {} -> {} for customer {} rejected: {}",
                    request.from_account_id, request.to_account_id, customer_id, err
                );
                self.metrics.record_rejection(err.reason());
            }
        }

        result
    }

    async fn execute(
        &self,
        customer_id: &CustomerId,
        request: &TransferRequest,
    ) -> Result<TransferResult> {
        validate_request(request)?;

        if !self.store.customer_exists(customer_id) {
            return Err(Error::CustomerNotFound(customer_id.clone()));
        }

        let source = self
            .store
            .get_account(&request.from_account_id)
            .ok_or_else(|| Error::SourceAccountNotFound(request.from_account_id.clone()))?;
        if !source.is_owned_by(customer_id) {
            return Err(Error::SourceNotOwned(source.id));
        }

        match self.resolve_destination(customer_id, &request.to_account_id).await? {
            Destination::Local(destination) => {
                self.transfer_internal(customer_id, request, &destination.id).await
            }
            Destination::Partner => self.transfer_external(customer_id, request).await,
        }
    }

    /// Look the destination up locally, then at the partner
    async fn resolve_destination(
        &self,
        customer_id: &CustomerId,
        to_account_id: &AccountId,
    ) -> Result<Destination> {
        if let Some(account) = self.store.get_account(to_account_id) {
            debug!("Destination {} found locally", to_account_id);
            if !account.is_owned_by(customer_id) {
                return Err(Error::DestinationNotOwned(account.id));
            }
            return Ok(Destination::Local(account));
        }

        debug!("Destination {} not local, asking partner", to_account_id);
        let token = self.partner.get_token().await.map_err(|e| self.partner_failure(e))?;

        match self.partner.get_balance(to_account_id.as_str(), &token.value).await {
            Ok(_) => Ok(Destination::Partner),
            Err(PartnerError::AccountNotFound(_)) => {
                Err(Error::DestinationNotFound(to_account_id.clone()))
            }
            Err(other) => Err(self.partner_failure(other)),
        }
    }

    async fn transfer_internal(
        &self,
        customer_id: &CustomerId,
        request: &TransferRequest,
        destination_id: &AccountId,
    ) -> Result<TransferResult> {
        let amount = request.amount;
        let _guard = self
            .store
            .lock_accounts(&[&request.from_account_id, destination_id])
            .await;

        // Re-read under the guard: balances may have moved since resolution
        let mut source = self
            .store
            .get_account(&request.from_account_id)
            .ok_or_else(|| Error::SourceAccountNotFound(request.from_account_id.clone()))?;
        let mut destination = self
            .store
            .get_account(destination_id)
            .ok_or_else(|| Error::DestinationNotFound(destination_id.clone()))?;

        let charges = compute_charges(&self.policy, source.kind, destination.kind, amount)?;
        let required = charges.required(amount)?;
        if source.balance < required {
            return Err(Error::InsufficientFunds {
                required,
                available: source.balance,
            });
        }

        let credited = destination
            .balance
            .checked_add(charges.credited(amount)?)
            .ok_or_else(amount_too_large)?;

        source.balance -= required;
        destination.balance = credited;

        let now = Utc::now();
        let transfer_id = TransactionId::generate();
        let mut records = vec![Transaction {
            id: transfer_id.clone(),
            account_id: source.id.clone(),
            customer_id: customer_id.clone(),
            kind: TransactionKind::Transfer,
            amount,
            from_account_id: Some(source.id.clone()),
            to_account_id: Some(destination.id.clone()),
            created_at: now,
        }];

        if charges.fee > Decimal::ZERO {
            records.push(Transaction {
                id: TransactionId::generate(),
                account_id: source.id.clone(),
                customer_id: customer_id.clone(),
                kind: TransactionKind::Fee,
                amount: charges.fee,
                from_account_id: None,
                to_account_id: None,
                created_at: now,
            });
        }

        if charges.interest > Decimal::ZERO {
            records.push(Transaction {
                id: TransactionId::generate(),
                account_id: destination.id.clone(),
                customer_id: customer_id.clone(),
                kind: TransactionKind::Interest,
                amount: charges.interest,
                from_account_id: None,
                to_account_id: None,
                created_at: now,
            });
        }

        info!(
            "Internal transfer {}: {} -> {}, amount {}, fee {}, interest {}",
            transfer_id, source.id, destination.id, amount, charges.fee, charges.interest
        );

        self.store.update_accounts([source, destination]);
        self.store.add_transactions(records);

        Ok(TransferResult {
            transaction_id: transfer_id,
            status: TransferStatus::Success,
            route: TransferRoute::Internal,
            fee: charges.fee,
            interest: charges.interest,
        })
    }

    async fn transfer_external(
        &self,
        customer_id: &CustomerId,
        request: &TransferRequest,
    ) -> Result<TransferResult> {
        let amount = request.amount;
        let _guard = self.store.lock_accounts(&[&request.from_account_id]).await;

        let mut source = self
            .store
            .get_account(&request.from_account_id)
            .ok_or_else(|| Error::SourceAccountNotFound(request.from_account_id.clone()))?;

        if source.balance < amount {
            return Err(Error::InsufficientFunds {
                required: amount,
                available: source.balance,
            });
        }

        let token = self.partner.get_token().await.map_err(|e| self.partner_failure(e))?;
        let partner_tx_id = self
            .partner
            .initiate_transfer(
                &source.id,
                request.to_account_id.as_str(),
                &token.value,
                amount,
            )
            .await
            .map_err(|e| self.partner_failure(e))?;

        source.balance -= amount;
        let transaction_id = TransactionId::new(partner_tx_id);

        info!(
            "Bank Z transfer {}: {} -> {}, amount {}",
            transaction_id, source.id, request.to_account_id, amount
        );

        self.store.add_transaction(Transaction {
            id: transaction_id.clone(),
            account_id: source.id.clone(),
            customer_id: customer_id.clone(),
            kind: TransactionKind::BankzTransfer,
            amount,
            from_account_id: Some(source.id.clone()),
            to_account_id: Some(request.to_account_id.clone()),
            created_at: Utc::now(),
        });
        self.store.update_account(source);

        Ok(TransferResult {
            transaction_id,
            status: TransferStatus::Success,
            route: TransferRoute::External,
            fee: Decimal::ZERO,
            interest: Decimal::ZERO,
        })
    }

    fn partner_failure(&self, err: PartnerError) -> Error {
        warn!("Bank Z call failed: {}", err);
        self.metrics.record_partner_failure();
        Error::Partner(err)
    }
}

/// Request-shape checks, first failure wins
pub fn validate_request(request: &TransferRequest) -> Result<()> {
    if request.amount <= Decimal::ZERO {
        return Err(Error::validation("Amount must be positive"));
    }
    if request.from_account_id == request.to_account_id {
        return Err(Error::validation("Cannot transfer to the same account"));
    }
    if request.from_account_id.is_empty() {
        return Err(Error::validation("From account ID cannot be empty"));
    }
    if request.to_account_id.is_empty() {
        return Err(Error::validation("To account ID cannot be empty"));
    }
    Ok(())
}
