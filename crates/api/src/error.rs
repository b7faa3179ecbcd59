//! API error taxonomy
//!
//! Every credential and session-guard operation returns one of these kinds;
//! nothing in the auth core throws through the handler boundary. Expected
//! authentication failures are normal traffic and log at debug; only
//! `Internal` logs as an error, and its detail never reaches the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use medrec_shared::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required field is missing or malformed
    #[error("{0}")]
    InvalidInput(String),
    /// An account with this email already exists
    #[error("Email is already registered")]
    DuplicateAccount,
    /// Unknown email or wrong password - deliberately the same message for
    /// both so responses cannot be used to enumerate accounts
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// No bearer token on a protected operation
    #[error("Authentication required")]
    AuthenticationRequired,
    /// Malformed, forged, or expired token, or its account no longer exists
    #[error("Invalid or expired token")]
    InvalidToken,
    /// Unexpected lower-layer fault; detail is logged, not returned
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateAccount => StatusCode::CONFLICT,
            ApiError::InvalidCredentials
            | ApiError::AuthenticationRequired
            | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => ApiError::DuplicateAccount,
            StoreError::Database(e) => ApiError::Internal(format!("store error: {e}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
            }
            other => {
                tracing::debug!(error = %other, "request rejected");
            }
        }

        let body = Json(json!({
            "success": false,
            "message": self.client_message(),
        }));

        (self.status(), body).into_response()
    }
}
