use atlas_store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Central error type for the gateway's HTTP surface
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("insufficient funds/inventory")]
    InsufficientFunds,

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            // A failed balance predicate is a user error, not a fault.
            StoreError::ConditionFailed => GatewayError::InsufficientFunds,
            other => GatewayError::Internal(other.into()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            GatewayError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            GatewayError::InsufficientFunds => (
                StatusCode::BAD_REQUEST,
                "insufficient funds/inventory".to_string(),
                "INSUFFICIENT_FUNDS",
            ),
            GatewayError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "error": code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}
