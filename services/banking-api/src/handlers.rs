use crate::errors::{ApiError, Result};
use crate::models::{
    AccountsResponse, BalancesResponse, CreateCustomerRequest, HealthResponse, TransactionQuery,
    TransactionResponse, TransactionsResponse,
};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use ledger_core::{CustomerId, OnboardedCustomer, TransferRequest, TransferResult};
use tracing::info;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: state.ledger.config().service_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus metrics endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let body = state
        .ledger
        .metrics()
        .export()
        .map_err(|e| ApiError::Internal(format!("Failed to export metrics: {}", e)))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}

/// POST /api/customers
pub async fn create_customer(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OnboardedCustomer>)> {
    let Json(request) = payload?;

    let created = state.ledger.create_customer(&request.name, &request.email)?;
    info!("Created customer {}", created.customer_id);

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/customers/:customer_id/accounts
pub async fn get_customer_accounts(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<AccountsResponse>> {
    let customer_id = CustomerId::new(customer_id);
    let accounts = state.ledger.customer_accounts(&customer_id)?;

    Ok(Json(AccountsResponse {
        customer_id,
        accounts,
    }))
}

/// POST /api/customers/:customer_id/transfers
pub async fn create_transfer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
    payload: std::result::Result<Json<TransferRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransferResult>)> {
    let Json(request) = payload?;
    let customer_id = CustomerId::new(customer_id);

    let result = state.ledger.transfer(&customer_id, &request).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/customers/:customer_id/bankz/balances
pub async fn get_partner_balances(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<BalancesResponse>> {
    let customer_id = CustomerId::new(customer_id);
    let balances = state.ledger.partner_balances(&customer_id).await?;

    Ok(Json(BalancesResponse {
        customer_id,
        balances,
    }))
}

/// GET /api/customers/:customer_id/transactions?accountId=&type=
pub async fn get_customer_transactions(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<TransactionsResponse>> {
    let customer_id = CustomerId::new(customer_id);
    let transactions = state
        .ledger
        .transactions(&customer_id, &query.into_filter())?
        .into_iter()
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(TransactionsResponse {
        customer_id,
        transactions,
    }))
}
