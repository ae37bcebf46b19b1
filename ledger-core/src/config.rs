//! Configuration for the ledger

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Client ID the simulated partner bank accepts
pub const PARTNER_CLIENT_ID: &str = "mock-client-id";

/// Client secret the simulated partner bank accepts
pub const PARTNER_CLIENT_SECRET: &str = "mock-client-secret";

/// Longest partner token lifetime accepted (seconds)
pub const MAX_TOKEN_TTL_SECS: u64 = 86_400; // 24 hours

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Fee and interest policy
    pub fees: FeeConfig,

    /// Onboarding seed amounts
    pub onboarding: OnboardingConfig,

    /// Partner bank configuration
    pub partner: PartnerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "ledger-core".to_string(),
            fees: FeeConfig::default(),
            onboarding: OnboardingConfig::default(),
            partner: PartnerConfig::default(),
        }
    }
}

/// Fee and interest rates applied to internal transfers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Fraction of the amount charged when the source is a current account
    pub current_account_fee_rate: Decimal,

    /// Fraction of the amount credited when the destination is a savings account
    pub savings_interest_rate: Decimal,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            current_account_fee_rate: dec!(0.0005), // 0.05%
            savings_interest_rate: dec!(0.005),     // 0.5%
        }
    }
}

/// Opening balances for new customers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingConfig {
    /// Opening balance of the current account
    pub current_opening_balance: Decimal,

    /// Bonus credited to the savings account (recorded as a transaction)
    pub savings_opening_bonus: Decimal,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            current_opening_balance: Decimal::ZERO,
            savings_opening_bonus: dec!(500.0),
        }
    }
}

/// Seeded partner account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerAccountSeed {
    /// Partner account ID
    pub account_id: String,

    /// Opening balance
    pub balance: Decimal,
}

/// Partner bank configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerConfig {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Token lifetime (seconds)
    pub token_ttl_secs: u64,

    /// Simulated network latency per call (milliseconds)
    pub latency_ms: u64,

    /// Accounts held at the partner
    pub accounts: Vec<PartnerAccountSeed>,

    /// Partner accounts listed by the balances endpoint
    pub linked_accounts: Vec<String>,
}

impl Default for PartnerConfig {
    fn default() -> Self {
        Self {
            client_id: PARTNER_CLIENT_ID.to_string(),
            client_secret: PARTNER_CLIENT_SECRET.to_string(),
            token_ttl_secs: 3600, // 1 hour
            latency_ms: 0,
            accounts: vec![
                PartnerAccountSeed {
                    account_id: "bankz-acc-123".to_string(),
                    balance: dec!(1000.0),
                },
                PartnerAccountSeed {
                    account_id: "bankz-acc-456".to_string(),
                    balance: dec!(500.0),
                },
            ],
            linked_accounts: vec!["bankz-acc-123".to_string(), "bankz-acc-456".to_string()],
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the ledger cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.fees.current_account_fee_rate < Decimal::ZERO
            || self.fees.savings_interest_rate < Decimal::ZERO
        {
            return Err(crate::Error::Config("Rates cannot be negative".to_string()));
        }

        if self.onboarding.current_opening_balance < Decimal::ZERO
            || self.onboarding.savings_opening_bonus < Decimal::ZERO
        {
            return Err(crate::Error::Config(
                "Opening balances cannot be negative".to_string(),
            ));
        }

        if self.partner.token_ttl_secs == 0 {
            return Err(crate::Error::Config("Token TTL must be positive".to_string()));
        }

        if self.partner.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(crate::Error::Config(format!(
                "Token TTL cannot exceed {} seconds",
                MAX_TOKEN_TTL_SECS
            )));
        }

        Ok(())
    }
}
