use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ledger_core::{Error as LedgerError, ErrorKind};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, ApiError>;

const PARTNER_AUTH_MESSAGE: &str = "Failed to authenticate with Bank Z";
const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request body")]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(err) => match err {
                // Existence queries
                LedgerError::CustomerNotFound(_) | LedgerError::NoAccounts(_) => {
                    StatusCode::NOT_FOUND
                }
                // Lookups embedded in a transfer make the request itself invalid
                LedgerError::Validation(_)
                | LedgerError::SourceAccountNotFound(_)
                | LedgerError::SourceNotOwned(_)
                | LedgerError::DestinationNotFound(_)
                | LedgerError::DestinationNotOwned(_)
                | LedgerError::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
                LedgerError::Partner(partner) => match partner.kind() {
                    ErrorKind::Validation | ErrorKind::NotFound => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                },
                LedgerError::Config(_) | LedgerError::Metrics(_) | LedgerError::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Messages safe to show the client
    pub fn messages(&self) -> Vec<String> {
        match self {
            ApiError::InvalidBody(_) => vec![self.to_string()],
            ApiError::Ledger(LedgerError::Partner(partner))
                if partner.kind() == ErrorKind::Auth =>
            {
                vec![PARTNER_AUTH_MESSAGE.to_string()]
            }
            ApiError::Ledger(_) if self.status_code().is_server_error() => {
                vec![INTERNAL_MESSAGE.to_string()]
            }
            ApiError::Ledger(err) => err.messages(),
            ApiError::Internal(_) => vec![INTERNAL_MESSAGE.to_string()],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else if let ApiError::InvalidBody(rejection) = &self {
            warn!("Rejected request body: {}", rejection.body_text());
        }

        (status, Json(json!({ "errors": self.messages() }))).into_response()
    }
}
