//! Application state

use std::sync::Arc;

use medrec_shared::AccountStore;

use crate::{
    auth::{AuthState, CredentialService, JwtManager},
    config::Config,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn AccountStore>,
    pub jwt: JwtManager,
    pub credentials: CredentialService,
}

impl AppState {
    pub fn new(store: Arc<dyn AccountStore>, config: Config) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret, config.token_lifetime);
        let credentials = CredentialService::new(store.clone(), jwt.clone(), config.bcrypt_cost);

        Self {
            config,
            store,
            jwt,
            credentials,
        }
    }

    /// Get auth state for the session-guard middleware
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt: self.jwt.clone(),
            store: self.store.clone(),
        }
    }
}
