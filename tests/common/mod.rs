#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use learnhub::router::init_router;
use learnhub::state::AppState;
use learnhub_config::{
    AppConfig, AppEnvironment, CookieConfig, CorsConfig, DatabaseConfig, JwtConfig, ServerConfig,
};
use learnhub_db::{MemoryStore, Store};
use learnhub_models::{RoleName, UserId};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<dyn Store>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: AppEnvironment::Development,
        jwt: JwtConfig::with_secret(TEST_SECRET),
        cookie: CookieConfig::default(),
        cors: CorsConfig::default(),
        database: DatabaseConfig::default(),
        server: ServerConfig::default(),
        bcrypt_cost: 4,
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_store(Arc::new(MemoryStore::new())).await
}

pub async fn spawn_app_with_store(store: Arc<dyn Store>) -> TestApp {
    let state = AppState::new(store.clone(), &test_config());
    state.roles.initialize_default_roles().await.unwrap();

    TestApp {
        router: init_router(state.clone()),
        state,
        store,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

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

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn register(&self, email: &str, password: &str) -> UserId {
        let response = self
            .post(
                "/api/auth/register",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        UserId::new(response.body["id"].as_i64().unwrap())
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Access token of a fresh login.
    pub async fn access_token(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["accessToken"].as_str().unwrap().to_string()
    }

    pub async fn grant(&self, user_id: UserId, role: RoleName) {
        self.state
            .roles
            .assign_role_by_name(user_id, role)
            .await
            .unwrap();
    }

    /// Registers a user with an extra role and returns its id and token.
    pub async fn user_with_role(&self, email: &str, role: RoleName) -> (UserId, String) {
        let id = self.register(email, "password123").await;
        self.grant(id, role).await;
        (id, self.access_token(email, "password123").await)
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", uuid::Uuid::new_v4())
}
