//! Account model and store abstraction
//!
//! The auth core only touches accounts through [`AccountStore`]; the
//! production implementation is Postgres-backed, tests use the in-memory
//! variant. Email uniqueness is the store's responsibility and must hold
//! atomically under concurrent creates.

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// A registered account. The password hash never leaves the auth core.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<Date>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub onboarding_complete: bool,
    pub last_login_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields required to create an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<Date>,
    pub gender: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An account with the same email already exists (unique constraint)
    #[error("duplicate account")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence seam for accounts
///
/// `create` must reject a duplicate email atomically - a lost race between
/// two concurrent creates surfaces as [`StoreError::Duplicate`] for exactly
/// one of them, never as two rows.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create(&self, new: NewAccount) -> Result<Account, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Advance the account's last-authenticated timestamp to now
    async fn touch_last_login(&self, id: Uuid) -> Result<Option<Account>, StoreError>;
}
