// Shared crate clippy configuration
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Medrec Shared Library
//!
//! Infrastructure shared across the medrec services: database pool
//! construction, migrations, and the account store used by the auth core.

pub mod account;
pub mod db;
pub mod store;

pub use account::{Account, AccountStore, NewAccount, StoreError};
pub use db::{create_pool, run_migrations};
pub use store::{InMemoryAccountStore, PgAccountStore};
