//! Credential service: registration, login, password reset requests
//!
//! Orchestrates the password hasher, token codec, and account store. Every
//! operation returns an explicit [`ApiError`] kind; nothing here panics or
//! leaks whether an email is registered.

use std::sync::Arc;

use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use medrec_shared::{AccountStore, NewAccount};

use crate::auth::jwt::JwtManager;
use crate::auth::password;
use crate::error::{ApiError, ApiResult};

/// Registration input, already deserialized from the transport layer
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<Date>,
    pub gender: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Account fields safe to return to callers. No password, no hash.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub onboarding_complete: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<OffsetDateTime>,
}

impl From<&medrec_shared::Account> for AccountSummary {
    fn from(account: &medrec_shared::Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            onboarding_complete: account.onboarding_complete,
            last_login_at: account.last_login_at,
        }
    }
}

/// Successful registration or login
#[derive(Debug, Serialize)]
pub struct AuthOutcome {
    pub account: AccountSummary,
    pub token: String,
}

#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn AccountStore>,
    jwt: JwtManager,
    bcrypt_cost: u32,
}

impl CredentialService {
    pub fn new(store: Arc<dyn AccountStore>, jwt: JwtManager, bcrypt_cost: u32) -> Self {
        Self {
            store,
            jwt,
            bcrypt_cost,
        }
    }

    /// Register a new account and issue its first session token.
    pub async fn register(&self, input: RegisterInput) -> ApiResult<AuthOutcome> {
        let email = normalize_required(&input.email, "email")?;
        require_plausible_email(&email)?;
        let first_name = normalize_required(&input.first_name, "firstName")?;
        let last_name = normalize_required(&input.last_name, "lastName")?;
        if input.password.is_empty() {
            return Err(ApiError::InvalidInput("password is required".to_string()));
        }

        // Advisory pre-check for the common path. The storage-layer unique
        // constraint is what actually decides a concurrent race.
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(ApiError::DuplicateAccount);
        }

        let password_hash = self.hash_on_blocking_pool(input.password).await?;

        let account = self
            .store
            .create(NewAccount {
                email,
                password_hash,
                first_name,
                last_name,
                date_of_birth: input.date_of_birth,
                gender: input.gender,
                phone: input.phone,
            })
            .await?;

        let token = self
            .jwt
            .issue(account.id, &account.email)
            .map_err(|e| ApiError::Internal(format!("token issuance failed: {e}")))?;

        tracing::info!(account_id = %account.id, "account registered");

        Ok(AuthOutcome {
            account: AccountSummary::from(&account),
            token,
        })
    }

    /// Authenticate with email and password.
    ///
    /// Unknown email and wrong password both surface as
    /// [`ApiError::InvalidCredentials`]; the two are indistinguishable to
    /// the caller.
    pub async fn login(&self, input: LoginInput) -> ApiResult<AuthOutcome> {
        let email = normalize_required(&input.email, "email")?;
        if input.password.is_empty() {
            return Err(ApiError::InvalidInput("password is required".to_string()));
        }

        let account = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        let verified = self
            .verify_on_blocking_pool(input.password, account.password_hash.clone())
            .await?;
        if !verified {
            tracing::debug!(account_id = %account.id, "password mismatch");
            return Err(ApiError::InvalidCredentials);
        }

        let account = self
            .store
            .touch_last_login(account.id)
            .await?
            .ok_or_else(|| ApiError::Internal("account vanished during login".to_string()))?;

        let token = self
            .jwt
            .issue(account.id, &account.email)
            .map_err(|e| ApiError::Internal(format!("token issuance failed: {e}")))?;

        tracing::info!(account_id = %account.id, "login succeeded");

        Ok(AuthOutcome {
            account: AccountSummary::from(&account),
            token,
        })
    }

    /// Accept a password-reset request.
    ///
    /// The response is identical whether or not the email is registered.
    /// Dispatching the reset message is an external collaborator's job.
    pub async fn request_password_reset(&self, email: &str) -> ApiResult<()> {
        match self.store.find_by_email(email.trim()).await? {
            Some(account) => {
                tracing::debug!(account_id = %account.id, "password reset requested");
            }
            None => {
                tracing::debug!("password reset requested for unknown email");
            }
        }

        Ok(())
    }

    async fn hash_on_blocking_pool(&self, plaintext: String) -> ApiResult<String> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || password::hash_password(&plaintext, cost))
            .await
            .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
    }

    async fn verify_on_blocking_pool(&self, plaintext: String, hash: String) -> ApiResult<bool> {
        tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &hash))
            .await
            .map_err(|e| ApiError::Internal(format!("verification task failed: {e}")))
    }
}

fn normalize_required(value: &str, field: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Reject strings that cannot be an email address. Full RFC validation is
/// not the goal; the store's unique key is on the literal string.
fn require_plausible_email(email: &str) -> ApiResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    };

    if !valid {
        return Err(ApiError::InvalidInput(
            "email is not a valid address".to_string(),
        ));
    }
    Ok(())
}
