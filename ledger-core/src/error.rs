//! Error types for the ledger

use crate::partner::PartnerError;
use crate::types::{AccountId, CustomerId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed, missing or contradictory input; one message per problem
    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Customer not found
    #[error("Customer not found")]
    CustomerNotFound(CustomerId),

    /// Customer exists but holds no accounts
    #[error("No accounts found for customer")]
    NoAccounts(CustomerId),

    /// Transfer source is not a local account
    #[error("Source account {0} not found")]
    SourceAccountNotFound(AccountId),

    /// Transfer source belongs to another customer
    #[error("Source account does not belong to the customer")]
    SourceNotOwned(AccountId),

    /// Transfer destination is neither local nor a partner account
    #[error("Destination account {0} not found")]
    DestinationNotFound(AccountId),

    /// Local transfer destination belongs to another customer
    #[error("Destination account does not belong to the customer")]
    DestinationNotOwned(AccountId),

    /// Source balance cannot cover amount plus fee
    #[error("Insufficient funds")]
    InsufficientFunds {
        /// Amount the transfer needs
        required: Decimal,
        /// Balance at check time
        available: Decimal,
    },

    /// Partner bank call failed
    #[error(transparent)]
    Partner(#[from] PartnerError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error classes that the request boundary translates into responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User-correctable input problem
    Validation,
    /// Customer, account or partner account absent
    NotFound,
    /// Partner credential or token problem
    Auth,
    /// Business-rule rejection
    InsufficientFunds,
    /// Anything else
    Internal,
}

impl Error {
    /// Shorthand for a single-message validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(vec![message.into()])
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_)
            | Error::SourceNotOwned(_)
            | Error::DestinationNotOwned(_) => ErrorKind::Validation,
            Error::CustomerNotFound(_)
            | Error::NoAccounts(_)
            | Error::SourceAccountNotFound(_)
            | Error::DestinationNotFound(_) => ErrorKind::NotFound,
            Error::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Error::Partner(err) => err.kind(),
            Error::Config(_) | Error::Metrics(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }

    /// Machine-readable message list
    pub fn messages(&self) -> Vec<String> {
        match self {
            Error::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Short label used for rejection metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::CustomerNotFound(_) | Error::NoAccounts(_) => "customer_not_found",
            Error::SourceAccountNotFound(_) => "source_not_found",
            Error::SourceNotOwned(_) | Error::DestinationNotOwned(_) => "ownership",
            Error::DestinationNotFound(_) => "destination_not_found",
            Error::InsufficientFunds { .. } => "insufficient_funds",
            Error::Partner(_) => "partner",
            Error::Config(_) | Error::Metrics(_) | Error::Io(_) => "internal",
        }
    }
}
