//! Authentication core for Medrec

#[cfg(test)]
mod edge_case_tests;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{extract_bearer, Claims, JwtManager};
pub use middleware::{require_auth, AuthState, AuthUser};
pub use password::{hash_password, verify_password};
pub use service::{AccountSummary, AuthOutcome, CredentialService, LoginInput, RegisterInput};
