#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use voxboard_api::auth::{AppState, AppStateInner, AuthConfig};
use voxboard_api::oauth::GoogleConfig;
use voxboard_db::Database;
use voxboard_db::users::NewUser;
use voxboard_types::models::User;
use voxboard_types::roles::GlobalRole;

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let db = Database::open_in_memory().unwrap();
        let state = AppStateInner::new(
            db,
            AuthConfig {
                jwt_secret: "integration-test-secret".into(),
                token_ttl: Duration::hours(1),
                admin_emails: Vec::new(),
                google: GoogleConfig::default(),
            },
        );
        let router = voxboard_api::router(state.clone());
        Self { state, router }
    }

    /// Create a user and return it with a valid bearer token.
    pub fn user(&self, email: &str, role: GlobalRole) -> (User, String) {
        let user = self
            .state
            .db
            .create_user(&NewUser {
                email,
                name: "Test User",
                picture: "",
                provider: "google",
                role,
            })
            .unwrap();
        let token = self.state.tokens.issue(&user).unwrap();
        (user, token)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }
}
