//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An in-memory store seeded with the demo accounts and tasks
//! - Login helpers returning bearer tokens
//! - Request/response helpers over `tower::ServiceExt::oneshot`

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use taskdesk_api::app::{build_router, AppState};
use taskdesk_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, LogFormat, StorageBackend};
use taskdesk_api::seed;
use taskdesk_shared::models::User;
use taskdesk_shared::store::{MemoryStore, UserStore};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            backend: StorageBackend::Memory,
            url: None,
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            expiration_hours: 24,
        },
        seed_demo_data: true,
        log_format: LogFormat::Pretty,
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
    pub admin: User,
    pub user: User,
}

/// A response with its body parsed as JSON (`Null` when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    /// Creates a new test context over a freshly seeded in-memory store
    pub async fn new() -> anyhow::Result<Self> {
        let store = Arc::new(MemoryStore::new());
        seed::seed_demo_data(store.as_ref()).await?;

        let admin = UserStore::find_by_username(store.as_ref(), seed::ADMIN_USERNAME)
            .await?
            .ok_or_else(|| anyhow::anyhow!("seeded admin missing"))?;
        let user = UserStore::find_by_username(store.as_ref(), seed::USER_USERNAME)
            .await?
            .ok_or_else(|| anyhow::anyhow!("seeded user missing"))?;

        let app = build_router(AppState::new(store.clone(), test_config()));

        Ok(TestContext {
            store,
            app,
            admin,
            user,
        })
    }

    /// Sends a request, optionally with a bearer token and JSON body
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse { status, body }
    }

    /// Logs in and returns the token, panicking on failure
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);

        response.body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(seed::ADMIN_USERNAME, seed::ADMIN_PASSWORD).await
    }

    pub async fn user_token(&self) -> String {
        self.login(seed::USER_USERNAME, seed::USER_PASSWORD).await
    }
}
