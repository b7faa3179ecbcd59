//! Session-guard middleware for axum
//!
//! Every protected route passes through [`require_auth`] before its handler
//! runs: extract the bearer token, verify it, re-resolve the subject against
//! the account store, then attach the caller identity to the request. Any
//! failure short-circuits with a 401 and the downstream handler is never
//! invoked.
//!
//! The guard always re-resolves the subject rather than trusting the token
//! claims alone, so a deleted account's tokens stop working before expiry.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use medrec_shared::AccountStore;

use crate::auth::jwt::{self, JwtManager};
use crate::error::ApiError;

/// State needed by the session guard
#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtManager,
    pub store: Arc<dyn AccountStore>,
}

/// Caller identity attached to a request after the guard succeeds.
/// Lives in request extensions for exactly one request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: Uuid,
    pub email: String,
}

/// Middleware that requires a valid session token
pub async fn require_auth(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(jwt::extract_bearer)
    {
        Some(token) => token,
        None => {
            tracing::debug!(path = %request.uri().path(), "no bearer token on protected route");
            return ApiError::AuthenticationRequired.into_response();
        }
    };

    let claims = match auth_state.jwt.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(path = %request.uri().path(), error = %e, "token rejected");
            return ApiError::InvalidToken.into_response();
        }
    };

    // Confirm the account still exists; a stale token for a removed account
    // is indistinguishable from any other invalid token.
    let account = match auth_state.store.find_by_id(claims.sub).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            tracing::warn!(subject = %claims.sub, "valid token for nonexistent account");
            return ApiError::InvalidToken.into_response();
        }
        Err(e) => {
            return ApiError::Internal(format!("account lookup failed: {e}")).into_response();
        }
    };

    request.extensions_mut().insert(AuthUser {
        account_id: account.id,
        email: account.email,
    });

    next.run(request).await
}
