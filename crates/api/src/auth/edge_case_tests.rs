//! Edge case tests for the credential service and the full auth surface
//!
//! Tests cover:
//! - Registration validation and the duplicate-email invariant
//! - Login anti-enumeration (unknown email vs wrong password)
//! - Concurrent registration of the same email
//! - Token lifecycle through the real router

#[cfg(test)]
mod service_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use medrec_shared::{AccountStore, InMemoryAccountStore};

    use crate::auth::jwt::JwtManager;
    use crate::auth::service::{CredentialService, LoginInput, RegisterInput};
    use crate::error::ApiError;

    // Minimum bcrypt cost keeps these tests fast
    const TEST_COST: u32 = 4;

    fn service(store: Arc<InMemoryAccountStore>) -> CredentialService {
        let jwt = JwtManager::new("test-signing-secret", Duration::from_secs(3600));
        CredentialService::new(store, jwt, TEST_COST)
    }

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_string(),
            password: "correct horse battery staple".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            date_of_birth: None,
            gender: None,
            phone: None,
        }
    }

    #[tokio::test]
    async fn register_then_login_round_trips() {
        let store = Arc::new(InMemoryAccountStore::new());
        let service = service(store);

        let registered = service.register(register_input("ada@example.com")).await.unwrap();
        assert_eq!(registered.account.email, "ada@example.com");
        assert!(!registered.account.onboarding_complete);
        assert!(registered.account.last_login_at.is_none());
        assert!(!registered.token.is_empty());

        let logged_in = service
            .login(LoginInput {
                email: "ada@example.com".to_string(),
                password: "correct horse battery staple".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.account.id, registered.account.id);
    }

    #[tokio::test]
    async fn issued_token_verifies_back_to_the_account() {
        let store = Arc::new(InMemoryAccountStore::new());
        let jwt = JwtManager::new("test-signing-secret", Duration::from_secs(3600));
        let service = CredentialService::new(store, jwt.clone(), TEST_COST);

        let outcome = service.register(register_input("ada@example.com")).await.unwrap();

        let claims = jwt.verify(&outcome.token).unwrap();
        assert_eq!(claims.sub, outcome.account.id);
        assert_eq!(claims.email, "ada@example.com");
    }

    #[tokio::test]
    async fn register_requires_all_mandatory_fields() {
        let store = Arc::new(InMemoryAccountStore::new());
        let service = service(store.clone());

        let mut missing_email = register_input("ada@example.com");
        missing_email.email = "  ".to_string();
        let mut missing_password = register_input("b@example.com");
        missing_password.password = String::new();
        let mut missing_first = register_input("c@example.com");
        missing_first.first_name = String::new();
        let mut missing_last = register_input("d@example.com");
        missing_last.last_name = String::new();

        for input in [missing_email, missing_password, missing_first, missing_last] {
            let err = service.register(input).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidInput(_)), "got {err:?}");
        }
        assert!(store.is_empty().await, "no account may be created");
    }

    #[tokio::test]
    async fn register_rejects_implausible_emails() {
        let store = Arc::new(InMemoryAccountStore::new());
        let service = service(store);

        let err = service.register(register_input("not-an-email")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn duplicate_registration_fails_and_first_account_is_unchanged() {
        let store = Arc::new(InMemoryAccountStore::new());
        let service = service(store.clone());

        let first = service.register(register_input("ada@example.com")).await.unwrap();

        let mut second_input = register_input("ada@example.com");
        second_input.first_name = "Impostor".to_string();
        let err = service.register(second_input).await.unwrap_err();
        assert!(matches!(err, ApiError::DuplicateAccount));

        let stored = store
            .find_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, first.account.id);
        assert_eq!(stored.first_name, "Ada", "first registration must be untouched");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_registration_of_same_email_admits_exactly_one() {
        let store = Arc::new(InMemoryAccountStore::new());
        let service = service(store.clone());

        let a = service.register(register_input("race@example.com"));
        let b = service.register(register_input("race@example.com"));
        let (ra, rb) = tokio::join!(a, b);

        let winners = [ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(winners, 1, "exactly one registration may win");

        for result in [ra, rb] {
            if let Err(err) = result {
                assert!(matches!(err, ApiError::DuplicateAccount), "got {err:?}");
            }
        }
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let store = Arc::new(InMemoryAccountStore::new());
        let service = service(store);

        service.register(register_input("ada@example.com")).await.unwrap();

        let unknown_email = service
            .login(LoginInput {
                email: "nobody@example.com".to_string(),
                password: "correct horse battery staple".to_string(),
            })
            .await
            .unwrap_err();

        let wrong_password = service
            .login(LoginInput {
                email: "ada@example.com".to_string(),
                password: "wrong password entirely".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(unknown_email.status(), wrong_password.status());
        assert_eq!(unknown_email.client_message(), wrong_password.client_message());
    }

    #[tokio::test]
    async fn login_advances_last_authenticated_timestamp() {
        let store = Arc::new(InMemoryAccountStore::new());
        let service = service(store.clone());

        let registered = service.register(register_input("ada@example.com")).await.unwrap();
        assert!(registered.account.last_login_at.is_none());

        let logged_in = service
            .login(LoginInput {
                email: "ada@example.com".to_string(),
                password: "correct horse battery staple".to_string(),
            })
            .await
            .unwrap();
        assert!(logged_in.account.last_login_at.is_some());

        let stored = store.find_by_id(registered.account.id).await.unwrap().unwrap();
        assert_eq!(stored.last_login_at, logged_in.account.last_login_at);
    }

    #[tokio::test]
    async fn password_reset_succeeds_for_known_and_unknown_emails_alike() {
        let store = Arc::new(InMemoryAccountStore::new());
        let service = service(store);

        service.register(register_input("ada@example.com")).await.unwrap();

        assert!(service.request_password_reset("ada@example.com").await.is_ok());
        assert!(service.request_password_reset("nobody@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn auth_outcome_never_serializes_password_material() {
        let store = Arc::new(InMemoryAccountStore::new());
        let service = service(store);

        let outcome = service.register(register_input("ada@example.com")).await.unwrap();
        let json = serde_json::to_string(&outcome).unwrap();

        assert!(!json.contains("password"), "no password field in responses");
        assert!(!json.contains("$2"), "no bcrypt hash in responses");
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use medrec_shared::InMemoryAccountStore;

    use crate::config::Config;
    use crate::routes::create_router;
    use crate::state::AppState;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            bind_address: "127.0.0.1:0".to_string(),
            jwt_secret: "test-signing-secret".to_string(),
            token_lifetime: Duration::from_secs(3600),
            bcrypt_cost: 4,
        }
    }

    fn test_app() -> Router {
        let store = Arc::new(InMemoryAccountStore::new());
        create_router(AppState::new(store, test_config()))
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    async fn get_with_token(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = app
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    fn register_body(email: &str) -> Value {
        json!({
            "email": email,
            "password": "correct horse battery staple",
            "firstName": "Ada",
            "lastName": "Lovelace",
        })
    }

    #[tokio::test]
    async fn register_returns_201_with_account_and_token() {
        let app = test_app();

        let (status, body) = post_json(
            &app,
            "/api/v1/auth/register",
            register_body("ada@example.com"),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["account"]["email"], "ada@example.com");
        assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(body["data"]["account"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn duplicate_registration_via_endpoint_is_409() {
        let app = test_app();

        let (first, _) = post_json(
            &app,
            "/api/v1/auth/register",
            register_body("ada@example.com"),
        )
        .await;
        assert_eq!(first, StatusCode::CREATED);

        let (second, body) = post_json(
            &app,
            "/api/v1/auth/register",
            register_body("ada@example.com"),
        )
        .await;
        assert_eq!(second, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Email is already registered");
    }

    #[tokio::test]
    async fn register_missing_fields_is_400() {
        let app = test_app();

        let (status, body) = post_json(
            &app,
            "/api/v1/auth/register",
            json!({ "email": "ada@example.com", "password": "pw" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn login_then_me_round_trips_through_the_guard() {
        let app = test_app();

        post_json(
            &app,
            "/api/v1/auth/register",
            register_body("ada@example.com"),
        )
        .await;

        let (status, body) = post_json(
            &app,
            "/api/v1/auth/login",
            json!({ "email": "ada@example.com", "password": "correct horse battery staple" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, body) = get_with_token(&app, "/api/v1/auth/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "ada@example.com");
        assert_eq!(body["data"]["first_name"], "Ada");
    }

    #[tokio::test]
    async fn me_without_token_is_401() {
        let app = test_app();

        let (status, body) = get_with_token(&app, "/api/v1/auth/me", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Authentication required");
    }

    #[tokio::test]
    async fn login_failure_bodies_do_not_reveal_account_existence() {
        let app = test_app();

        post_json(
            &app,
            "/api/v1/auth/register",
            register_body("ada@example.com"),
        )
        .await;

        let (unknown_status, unknown_body) = post_json(
            &app,
            "/api/v1/auth/login",
            json!({ "email": "nobody@example.com", "password": "whatever whatever" }),
        )
        .await;
        let (wrong_status, wrong_body) = post_json(
            &app,
            "/api/v1/auth/login",
            json!({ "email": "ada@example.com", "password": "whatever whatever" }),
        )
        .await;

        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, wrong_status);
        assert_eq!(unknown_body, wrong_body, "bodies must be byte-identical");
    }

    #[tokio::test]
    async fn forgot_password_response_is_identical_for_any_email() {
        let app = test_app();

        post_json(
            &app,
            "/api/v1/auth/register",
            register_body("ada@example.com"),
        )
        .await;

        let (known_status, known_body) = post_json(
            &app,
            "/api/v1/auth/forgot-password",
            json!({ "email": "ada@example.com" }),
        )
        .await;
        let (unknown_status, unknown_body) = post_json(
            &app,
            "/api/v1/auth/forgot-password",
            json!({ "email": "nobody@example.com" }),
        )
        .await;

        assert_eq!(known_status, StatusCode::OK);
        assert_eq!(known_status, unknown_status);
        assert_eq!(known_body, unknown_body);
    }

    #[tokio::test]
    async fn health_endpoint_is_public() {
        let app = test_app();

        let (status, body) = get_with_token(&app, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
