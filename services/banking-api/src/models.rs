use chrono::SecondsFormat;
use ledger_core::{Account, AccountId, CustomerId, PartnerBalance, Transaction, TransactionFilter};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Create customer request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsResponse {
    pub customer_id: CustomerId,
    pub accounts: Vec<Account>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesResponse {
    pub customer_id: CustomerId,
    pub balances: Vec<PartnerBalance>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    pub customer_id: CustomerId,
    pub transactions: Vec<TransactionResponse>,
}

/// Transaction as rendered on the wire
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    pub account_id: String,
    pub customer_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<String>,
    /// RFC3339, seconds precision
    pub created_at: String,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id.to_string(),
            account_id: tx.account_id.to_string(),
            customer_id: tx.customer_id.to_string(),
            kind: tx.kind.as_str().to_string(),
            amount: tx.amount,
            from_account_id: tx.from_account_id.map(|id| id.to_string()),
            to_account_id: tx.to_account_id.map(|id| id.to_string()),
            created_at: tx.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Query string for transaction listings; empty values mean "no filter"
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    #[serde(rename = "accountId")]
    pub account_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl TransactionQuery {
    pub fn into_filter(self) -> TransactionFilter {
        TransactionFilter {
            account_id: self
                .account_id
                .filter(|id| !id.is_empty())
                .map(AccountId::new),
            kind: self.kind.filter(|kind| !kind.is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
}
