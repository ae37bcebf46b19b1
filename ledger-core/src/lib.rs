//! Go-Banking Ledger Core
//!
//! In-memory retail-banking ledger: customers, current and savings accounts,
//! an append-only transaction log, and transfers between local accounts or
//! out to the partner bank.
//!
//! # Architecture
//!
//! - **Store**: Each collection sits behind its own lock; no lock is held across `.await`
//! - **Account locks**: Transfers serialize per account, taken in sorted order
//! - **Partner gateway**: The partner bank is reached only through [`PartnerGateway`]
//! - **Facade**: [`Ledger`] is the single entry point for the HTTP layer
//!
//! # Invariants
//!
//! - Balances never go negative
//! - Every balance change is explained by the transaction log
//! - Internal transfers conserve money net of fee and interest
//! - A failed transfer leaves no trace

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod onboarding;
pub mod partner;
pub mod storage;
pub mod transfer;
pub mod types;

// Re-exports
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use ledger::Ledger;
pub use partner::{AccessToken, MockPartnerBank, PartnerError, PartnerGateway};
pub use storage::LedgerStore;
pub use transfer::TransferEngine;
pub use types::{
    Account, AccountId, AccountKind, Customer, CustomerId, OnboardedCustomer, PartnerBalance,
    Transaction, TransactionFilter, TransactionId, TransactionKind, TransferRequest,
    TransferResult, TransferRoute, TransferStatus,
};
