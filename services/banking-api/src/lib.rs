// Go-Banking API Library
// Exposes the router and its modules for the binary and integration tests

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;

pub use config::ApiConfig;
pub use errors::ApiError;

use axum::{
    routing::{get, post},
    Router,
};
use ledger_core::Ledger;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
}

impl AppState {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }
}

/// Build the HTTP application
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/customers", post(handlers::create_customer))
        .route(
            "/api/customers/:customer_id/accounts",
            get(handlers::get_customer_accounts),
        )
        .route(
            "/api/customers/:customer_id/transfers",
            post(handlers::create_transfer),
        )
        .route(
            "/api/customers/:customer_id/bankz/balances",
            get(handlers::get_partner_balances),
        )
        .route(
            "/api/customers/:customer_id/transactions",
            get(handlers::get_customer_transactions),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
