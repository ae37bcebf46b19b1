//! Partner bank integration
//!
//! The ledger reaches the partner bank ("Bank Z") only through the
//! [`PartnerGateway`] trait. Every call may fail independently of local
//! state, and every call except [`PartnerGateway::get_token`] requires the
//! token most recently minted by the partner.
//!
//! [`MockPartnerBank`] simulates the partner's OAuth-protected API in memory.

use crate::config::{
    PartnerConfig, MAX_TOKEN_TTL_SECS, PARTNER_CLIENT_ID, PARTNER_CLIENT_SECRET,
};
use crate::error::ErrorKind;
use crate::types::AccountId;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Partner bank errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartnerError {
    /// Credentials rejected by the token endpoint
    #[error("Partner authentication failed: {0}")]
    Auth(String),

    /// Token unknown or expired
    #[error("Invalid or expired partner token")]
    InvalidToken,

    /// No such partner account
    #[error("Bank Z account {0} not found")]
    AccountNotFound(String),

    /// Request rejected by the partner
    #[error("{0}")]
    Validation(String),
}

impl PartnerError {
    /// Classify for the request boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            PartnerError::Auth(_) | PartnerError::InvalidToken => ErrorKind::Auth,
            PartnerError::AccountNotFound(_) => ErrorKind::NotFound,
            PartnerError::Validation(_) => ErrorKind::Validation,
        }
    }
}

/// Short-lived OAuth access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Opaque token value
    pub value: String,
    /// Expiry instant
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Whether the token is still usable at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// External bank reachable from the ledger
#[async_trait]
pub trait PartnerGateway: Send + Sync {
    /// Return the cached token if unexpired, otherwise mint and cache a new one
    async fn get_token(&self) -> Result<AccessToken, PartnerError>;

    /// Balance of a partner account
    async fn get_balance(&self, account_id: &str, token: &str) -> Result<Decimal, PartnerError>;

    /// Credit `amount` to a partner account on behalf of a local account;
    /// returns the partner's transaction ID
    async fn initiate_transfer(
        &self,
        from_account_id: &AccountId,
        to_account_id: &str,
        token: &str,
        amount: Decimal,
    ) -> Result<String, PartnerError>;
}

#[derive(Debug)]
struct PartnerState {
    accounts: HashMap<String, Decimal>,
    token: Option<AccessToken>,
}

/// In-memory simulation of the partner bank
#[derive(Debug)]
pub struct MockPartnerBank {
    client_id: String,
    client_secret: String,
    token_ttl: ChronoDuration,
    latency: Duration,
    state: Mutex<PartnerState>,
}

impl MockPartnerBank {
    /// Create from configuration
    pub fn new(config: &PartnerConfig) -> Self {
        let accounts = config
            .accounts
            .iter()
            .map(|seed| (seed.account_id.clone(), seed.balance))
            .collect();

        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_ttl: ChronoDuration::seconds(
                config.token_ttl_secs.min(MAX_TOKEN_TTL_SECS) as i64,
            ),
            latency: Duration::from_millis(config.latency_ms),
            state: Mutex::new(PartnerState {
                accounts,
                token: None,
            }),
        }
    }

    /// Simulate network latency
    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn validate_token(state: &PartnerState, token: &str) -> Result<(), PartnerError> {
        match &state.token {
            Some(current) if current.value == token && current.is_valid_at(Utc::now()) => Ok(()),
            _ => Err(PartnerError::InvalidToken),
        }
    }
}

#[async_trait]
impl PartnerGateway for MockPartnerBank {
    async fn get_token(&self) -> Result<AccessToken, PartnerError> {
        self.simulate_latency().await;

        let mut state = self.state.lock();
        let now = Utc::now();

        if let Some(token) = &state.token {
            if token.is_valid_at(now) {
                return Ok(token.clone());
            }
        }

        if self.client_id != PARTNER_CLIENT_ID || self.client_secret != PARTNER_CLIENT_SECRET {
            warn!("Bank Z rejected client credentials for {}", self.client_id);
            return Err(PartnerError::Auth("invalid client credentials".to_string()));
        }

        let token = AccessToken {
            value: format!("token-{}", Uuid::now_v7().simple()),
            expires_at: now + self.token_ttl,
        };
        info!("Generated new Bank Z token expiring at {}", token.expires_at);
        state.token = Some(token.clone());

        Ok(token)
    }

    async fn get_balance(&self, account_id: &str, token: &str) -> Result<Decimal, PartnerError> {
        self.simulate_latency().await;

        let state = self.state.lock();
        Self::validate_token(&state, token)?;

        let balance = state
            .accounts
            .get(account_id)
            .copied()
            .ok_or_else(|| PartnerError::AccountNotFound(account_id.to_string()))?;
        debug!("Bank Z balance for {}: {}", account_id, balance);

        Ok(balance)
    }

    async fn initiate_transfer(
        &self,
        from_account_id: &AccountId,
        to_account_id: &str,
        token: &str,
        amount: Decimal,
    ) -> Result<String, PartnerError> {
        self.simulate_latency().await;

        let mut state = self.state.lock();
        Self::validate_token(&state, token)?;

        if amount <= Decimal::ZERO {
            return Err(PartnerError::Validation("amount must be positive".to_string()));
        }

        // Only the destination is a partner account; the source is informational
        let balance = state.accounts.get_mut(to_account_id).ok_or_else(|| {
            PartnerError::AccountNotFound(to_account_id.to_string())
        })?;
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| PartnerError::Validation("amount too large".to_string()))?;

        let transaction_id = format!("bankz-tx-{}", Uuid::now_v7().simple());
        info!(
            "Bank Z transfer: from {} to {}, amount {}, txID {}",
            from_account_id, to_account_id, amount, transaction_id
        );

        Ok(transaction_id)
    }
}
