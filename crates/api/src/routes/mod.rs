//! Route wiring

pub mod auth;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::auth::require_auth;
use crate::state::AppState;

/// Build the application router.
///
/// Everything under the protected router runs behind the session guard;
/// the credential endpoints and the health probe are public.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/v1/auth/me", get(auth::me_handler))
        .route_layer(middleware::from_fn_with_state(
            state.auth_state(),
            require_auth,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/auth/register", post(auth::register_handler))
        .route("/api/v1/auth/login", post(auth::login_handler))
        .route(
            "/api/v1/auth/forgot-password",
            post(auth::forgot_password_handler),
        )
        .merge(protected)
        .with_state(state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
