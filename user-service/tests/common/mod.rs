//! Test helper module for user-service integration tests.
//!
//! Spawns the full router over fresh in-memory stores; requests are
//! driven through `tower::ServiceExt::oneshot`, no listener needed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::util::ServiceExt;
use user_service::{
    bootstrap, build_router,
    config::{
        Environment, JwtConfig, RootAccountConfig, SecurityConfig, SwaggerConfig, SwaggerMode,
        UserServiceConfig,
    },
    models::User,
    repos::{InMemorySessionRepository, InMemoryUserRepository, SessionRepository, UserRepository},
    services::{AccountService, CredentialService, JwtService, SessionService},
    AppState,
};

pub const ROOT_EMAIL: &str = "root@example.com";
pub const ROOT_PASSWORD: &str = "root-password-123";

pub const TEST_ACCESS_SECRET: &str = "test-access-secret";
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret";

/// Test application with isolated in-memory state.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub root: User,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("info")
            .try_init();

        let config = test_config();

        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let sessions: Arc<dyn SessionRepository> = Arc::new(InMemorySessionRepository::new());

        let jwt = JwtService::new(&config.jwt);
        let credentials =
            CredentialService::new(users.clone()).expect("failed to create credential service");
        let session_service = SessionService::new(credentials, jwt.clone(), sessions.clone());
        let accounts = AccountService::new(users.clone(), sessions.clone());

        let root = bootstrap::ensure_root(&users, &config.root)
            .await
            .expect("failed to bootstrap root account");

        let state = AppState {
            config,
            users,
            sessions,
            jwt,
            session_service,
            accounts,
        };

        let router = build_router(state.clone())
            .await
            .expect("failed to build router");

        Self {
            router,
            state,
            root,
        }
    }

    /// Issue a request and return status plus parsed JSON body (Null
    /// when the body is empty).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
        token: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("failed to build request"),
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body is not JSON")
        };

        (status, json)
    }

    /// Issue a GET with a raw Authorization header value (or none).
    pub async fn get_with_auth_header(
        &self,
        uri: &str,
        auth_header: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(value) = auth_header {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = builder.body(Body::empty()).expect("failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body is not JSON")
        };

        (status, json)
    }

    /// Register a customer account; asserts success and returns the
    /// created user's id.
    pub async fn register(&self, email: &str, password: &str) -> uuid::Uuid {
        let (status, body) = self
            .request(
                "POST",
                "/auth/register",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["id"]
            .as_str()
            .expect("register response has no id")
            .parse()
            .expect("id is not a uuid")
    }

    /// Login; asserts success and returns (access_token, refresh_token).
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let (status, body) = self
            .request(
                "POST",
                "/auth/login",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn register_and_login(
        &self,
        email: &str,
        password: &str,
    ) -> (uuid::Uuid, String, String) {
        let id = self.register(email, password).await;
        let (access, refresh) = self.login(email, password).await;
        (id, access, refresh)
    }

    /// An expired-token issuer sharing this app's secrets.
    pub fn expired_issuer(&self) -> JwtService {
        JwtService::new(&JwtConfig {
            access_token_secret: TEST_ACCESS_SECRET.to_string(),
            refresh_token_secret: TEST_REFRESH_SECRET.to_string(),
            access_token_expiry_minutes: -5,
            refresh_token_expiry_days: -1,
        })
    }
}

fn test_config() -> UserServiceConfig {
    UserServiceConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
        },
        environment: Environment::Dev,
        service_name: "user-service-test".to_string(),
        service_version: "0.0.0-test".to_string(),
        log_level: "debug".to_string(),
        jwt: JwtConfig {
            access_token_secret: TEST_ACCESS_SECRET.to_string(),
            refresh_token_secret: TEST_REFRESH_SECRET.to_string(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        },
        root: RootAccountConfig {
            email: ROOT_EMAIL.to_string(),
            password: ROOT_PASSWORD.to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        swagger: SwaggerConfig {
            enabled: SwaggerMode::Disabled,
        },
    }
}
