//! Credential endpoints
//!
//! Thin JSON shaping over [`CredentialService`]; all contracts (validation,
//! anti-enumeration, failure taxonomy) live in the service, not here.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::Date;

use crate::auth::service::{AuthOutcome, LoginInput, RegisterInput};
use crate::auth::{AccountSummary, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response envelope shared by all credential endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn ok(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
        }
    }

    fn ok_empty(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// ISO date, e.g. "1990-04-21"
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

pub async fn register_handler(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthOutcome>>)> {
    let date_of_birth = req.date_of_birth.as_deref().map(parse_date).transpose()?;

    let outcome = state
        .credentials
        .register(RegisterInput {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            date_of_birth,
            gender: req.gender,
            phone: req.phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Account created", outcome)),
    ))
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthOutcome>>> {
    let outcome = state
        .credentials
        .login(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(ApiResponse::ok("Login successful", outcome)))
}

pub async fn forgot_password_handler(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.credentials.request_password_reset(&req.email).await?;

    // Same body whether or not the email is registered
    Ok(Json(ApiResponse::ok_empty(
        "If that email is registered, reset instructions have been sent",
    )))
}

/// Return the authenticated caller's account summary
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<ApiResponse<AccountSummary>>> {
    let account = state
        .store
        .find_by_id(auth_user.account_id)
        .await?
        .ok_or(ApiError::InvalidToken)?;

    Ok(Json(ApiResponse::ok(
        "Account details",
        AccountSummary::from(&account),
    )))
}

fn parse_date(raw: &str) -> ApiResult<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(raw, &format)
        .map_err(|_| ApiError::InvalidInput("dateOfBirth must be YYYY-MM-DD".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let date = parse_date("1990-04-21").unwrap();
        assert_eq!(date.year(), 1990);
    }

    #[test]
    fn rejects_non_iso_dates() {
        assert!(parse_date("21/04/1990").is_err());
        assert!(parse_date("not a date").is_err());
    }
}
