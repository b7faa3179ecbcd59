//! Account store implementations
//!
//! `PgAccountStore` backs production; `InMemoryAccountStore` backs tests and
//! local development without Postgres. Both uphold the same contract: email
//! uniqueness is decided atomically inside the store.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::account::{Account, AccountStore, NewAccount, StoreError};

/// Postgres unique-violation SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres-backed account store
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, new: NewAccount) -> Result<Account, StoreError> {
        let result = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (
                email,
                password_hash,
                first_name,
                last_name,
                date_of_birth,
                gender,
                phone
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.date_of_birth)
        .bind(&new.gender)
        .bind(&new.phone)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(account) => Ok(account),
            Err(e) => {
                // The unique constraint on email is the authoritative
                // duplicate check; the loser of a concurrent create lands here.
                if let Some(db) = e.as_database_error() {
                    if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                        return Err(StoreError::Duplicate);
                    }
                }
                Err(StoreError::Database(e))
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET last_login_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}

/// In-memory account store
///
/// A single async mutex serializes creates, so the duplicate-email check and
/// the insert are one atomic step - same observable contract as the Postgres
/// unique constraint.
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<Mutex<HashMap<Uuid, Account>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create(&self, new: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().await;

        if accounts.values().any(|a| a.email == new.email) {
            return Err(StoreError::Duplicate);
        }

        let now = OffsetDateTime::now_utc();
        let account = Account {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            date_of_birth: new.date_of_birth,
            gender: new.gender,
            phone: new.phone,
            onboarding_complete: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts.lock().await;

        Ok(accounts.get_mut(&id).map(|account| {
            let now = OffsetDateTime::now_utc();
            account.last_login_at = Some(now);
            account.updated_at = now;
            account.clone()
        }))
    }
}

impl InMemoryAccountStore {
    /// Remove an account, used by tests that exercise stale-token handling
    pub async fn remove(&self, id: Uuid) -> Option<Account> {
        self.accounts.lock().await.remove(&id)
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.accounts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.lock().await.is_empty()
    }
}
