//! Customer onboarding
//!
//! A new customer starts with a current account and a savings account. The
//! savings account is seeded with an opening bonus, recorded as a `bonus`
//! transaction so that the transaction log explains the balance from the
//! first moment.

use crate::config::OnboardingConfig;
use crate::storage::LedgerStore;
use crate::types::{
    Account, AccountId, AccountKind, Customer, CustomerId, OnboardedCustomer, Transaction,
    TransactionId, TransactionKind,
};
use crate::{Error, Result};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

// ASCII letters and ASCII whitespace only
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z \t\n\f\r]+$").expect("valid name pattern"));

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

/// Check name and email; every failing rule is reported
pub fn validate_customer(name: &str, email: &str) -> Result<()> {
    let mut errors = Vec::new();

    if name.is_empty() {
        errors.push("Name cannot be empty".to_string());
    } else if !NAME_PATTERN.is_match(name) {
        errors.push("Name must contain only letters and spaces".to_string());
    }

    if email.is_empty() {
        errors.push("Email cannot be empty".to_string());
    } else if !EMAIL_PATTERN.is_match(email) {
        errors.push("Invalid email format".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

/// Create a customer with its two seeded accounts and the opening bonus
///
/// Writes go customer first, then accounts, then the bonus transaction, so a
/// reader that can see an account can always resolve its owner.
pub fn create_customer(
    store: &LedgerStore,
    config: &OnboardingConfig,
    name: &str,
    email: &str,
) -> Result<OnboardedCustomer> {
    validate_customer(name, email)?;

    let now = Utc::now();
    let customer_id = CustomerId::generate();
    let current_account_id = AccountId::generate();
    let savings_account_id = AccountId::generate();

    store.add_customer(Customer {
        id: customer_id.clone(),
        name: name.to_string(),
        email: email.to_string(),
    });

    store.add_account(Account {
        id: current_account_id.clone(),
        customer_id: customer_id.clone(),
        kind: AccountKind::Current,
        balance: config.current_opening_balance,
        created_at: now,
    });

    store.add_account(Account {
        id: savings_account_id.clone(),
        customer_id: customer_id.clone(),
        kind: AccountKind::Savings,
        balance: config.savings_opening_bonus,
        created_at: now,
    });

    if config.savings_opening_bonus > Decimal::ZERO {
        store.add_transaction(Transaction {
            id: TransactionId::generate(),
            account_id: savings_account_id.clone(),
            customer_id: customer_id.clone(),
            kind: TransactionKind::Bonus,
            amount: config.savings_opening_bonus,
            from_account_id: None,
            to_account_id: None,
            created_at: now,
        });
    }

    tracing::info!(
        "Created customer {} (current {}, savings {})",
        customer_id,
        current_account_id,
        savings_account_id
    );

    Ok(OnboardedCustomer {
        customer_id,
        current_account_id,
        savings_account_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_accepts_plain_names() {
        assert!(validate_customer("Jane Doe", "jane@example.com").is_ok());
        assert!(validate_customer("Mary Ann Smith", "m.a+smith@mail.example.org").is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let err = validate_customer("", "").unwrap_err();
        assert_eq!(
            err.messages(),
            vec!["Name cannot be empty".to_string(), "Email cannot be empty".to_string()]
        );

        let err = validate_customer("R2-D2", "not-an-email").unwrap_err();
        assert_eq!(
            err.messages(),
            vec![
                "Name must contain only letters and spaces".to_string(),
                "Invalid email format".to_string()
            ]
        );
    }

    #[test]
    fn test_validate_rejects_non_ascii_whitespace() {
        for name in ["Jane\u{00A0}Doe", "Jane\u{2003}Doe", "Jos\u{00E9}"] {
            let err = validate_customer(name, "jane@example.com").unwrap_err();
            assert_eq!(
                err.messages(),
                vec!["Name must contain only letters and spaces".to_string()],
                "{:?}",
                name
            );
        }
        assert!(validate_customer("Jane\tDoe", "jane@example.com").is_ok());
    }

    #[test]
    fn test_create_customer_seeds_accounts_and_bonus() {
        let store = LedgerStore::new();
        let created =
            create_customer(&store, &OnboardingConfig::default(), "Jane Doe", "jane@example.com")
                .unwrap();

        let customer = store.get_customer(&created.customer_id).unwrap();
        assert_eq!(customer.email, "jane@example.com");

        let current = store.get_account(&created.current_account_id).unwrap();
        assert_eq!(current.kind, AccountKind::Current);
        assert_eq!(current.balance, Decimal::ZERO);

        let savings = store.get_account(&created.savings_account_id).unwrap();
        assert_eq!(savings.kind, AccountKind::Savings);
        assert_eq!(savings.balance, dec!(500.0));
        assert_eq!(savings.created_at, current.created_at);

        let transactions = store.list_transactions_by_customer(&created.customer_id);
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].kind, TransactionKind::Bonus);
        assert_eq!(transactions[0].amount, dec!(500.0));
        assert_eq!(transactions[0].account_id, created.savings_account_id);
    }

    #[test]
    fn test_invalid_customer_writes_nothing() {
        let store = LedgerStore::new();
        assert!(create_customer(&store, &OnboardingConfig::default(), "", "x").is_err());
        assert_eq!(store.transaction_count(), 0);
    }
}
