//! Core types for the ledger
//!
//! All types are designed for:
//! - JSON exchange with the HTTP layer (camelCase field names)
//! - Exact arithmetic (Decimal for money)
//! - Cheap cloning out of the store (records are small, owned values)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Customer identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Create new customer ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, time-ordered ID
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account identifier
///
/// Local account IDs are generated UUIDs. Partner account IDs share the same
/// representation, since a transfer destination may be either.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, time-ordered ID
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty string (never a valid account)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create new transaction ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, time-ordered ID
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bank customer. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID
    pub id: CustomerId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
}

/// Account kind, which drives fee and interest policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Current (checking) account; outgoing internal transfers pay a fee
    Current,
    /// Savings account; incoming internal transfers earn interest
    Savings,
}

impl AccountKind {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Current => "current",
            AccountKind::Savings => "savings",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local account held in the ledger store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account ID
    pub id: AccountId,
    /// Owning customer (fixed for the account's lifetime)
    pub customer_id: CustomerId,
    /// Current or savings
    #[serde(rename = "type")]
    pub kind: AccountKind,
    /// Balance; never negative after a committed transfer
    pub balance: Decimal,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Whether this account belongs to the given customer
    pub fn is_owned_by(&self, customer_id: &CustomerId) -> bool {
        &self.customer_id == customer_id
    }
}

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Onboarding bonus credited to the savings account
    Bonus,
    /// Internal transfer, posted on the source account
    Transfer,
    /// Transfer to the partner bank, posted on the source account
    BankzTransfer,
    /// Fee charged to a current source account
    Fee,
    /// Interest credited to a savings destination account
    Interest,
}

impl TransactionKind {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Bonus => "bonus",
            TransactionKind::Transfer => "transfer",
            TransactionKind::BankzTransfer => "bankz_transfer",
            TransactionKind::Fee => "fee",
            TransactionKind::Interest => "interest",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable, append-only transaction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Globally unique ID
    pub id: TransactionId,
    /// Account the transaction is posted against
    pub account_id: AccountId,
    /// Customer owning that account
    pub customer_id: CustomerId,
    /// Transaction kind
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Amount (always positive)
    pub amount: Decimal,
    /// Source account for transfer-like kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_account_id: Option<AccountId>,
    /// Destination account for transfer-like kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<AccountId>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Money movement requested by a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Source account (must be local and owned by the customer)
    #[serde(default = "empty_account")]
    pub from_account_id: AccountId,
    /// Destination account (local or partner)
    #[serde(default = "empty_account")]
    pub to_account_id: AccountId,
    /// Amount to move
    #[serde(default)]
    pub amount: Decimal,
}

fn empty_account() -> AccountId {
    AccountId::new("")
}

impl TransferRequest {
    /// Build a request
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: Decimal) -> Self {
        Self {
            from_account_id: AccountId::new(from),
            to_account_id: AccountId::new(to),
            amount,
        }
    }
}

/// Where a transfer's destination lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferRoute {
    /// Both accounts in the local ledger
    Internal,
    /// Destination held by the partner bank
    External,
}

impl TransferRoute {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferRoute::Internal => "internal",
            TransferRoute::External => "external",
        }
    }
}

/// Transfer status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Committed
    Success,
}

/// Outcome of a committed transfer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    /// Local transfer transaction ID, or the partner's transaction ID
    pub transaction_id: TransactionId,
    /// Status
    pub status: TransferStatus,
    /// Internal or external
    #[serde(skip_serializing)]
    pub route: TransferRoute,
    /// Fee charged on the source account
    #[serde(skip_serializing)]
    pub fee: Decimal,
    /// Interest credited on the destination account
    #[serde(skip_serializing)]
    pub interest: Decimal,
}

/// IDs handed back after onboarding a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardedCustomer {
    /// New customer
    pub customer_id: CustomerId,
    /// Seeded current account
    pub current_account_id: AccountId,
    /// Seeded savings account
    pub savings_account_id: AccountId,
}

/// Balance of one partner account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerBalance {
    /// Partner account ID
    pub account_id: AccountId,
    /// Balance reported by the partner
    pub balance: Decimal,
}

/// Exact-match filters for transaction listings. Empty fields match all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only transactions posted against this account
    pub account_id: Option<AccountId>,
    /// Only transactions whose wire type equals this string
    pub kind: Option<String>,
}

impl TransactionFilter {
    /// Whether a transaction passes the filter
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(account_id) = &self.account_id {
            if &transaction.account_id != account_id {
                return false;
            }
        }
        if let Some(kind) = &self.kind {
            if transaction.kind.as_str() != kind {
                return false;
            }
        }
        true
    }
}
