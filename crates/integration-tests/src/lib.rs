//! Integration tests for Rocky Gym.
//!
//! Tests run the full storefront router against the in-memory backend, so
//! they need no network, database or credentials.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocky-gym-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `lockers` - Reservation flow through the coordinator
//! - `storefront_api` - HTTP routes end to end
//! - `members` - Sign-up, subscriptions, cart and profile

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use rocky_gym_storefront::config::StorefrontConfig;
use rocky_gym_storefront::routes;
use rocky_gym_storefront::state::AppState;
use rocky_gym_storefront::supabase::InMemoryBackend;

/// Largest response body the helpers will read.
const MAX_BODY: usize = 1024 * 1024;

/// A storefront wired to a demo in-memory backend.
pub struct TestContext {
    pub backend: InMemoryBackend,
    pub state: AppState,
}

impl TestContext {
    /// Storefront over the demo data set.
    #[must_use]
    pub fn demo() -> Self {
        Self::with_backend(InMemoryBackend::demo())
    }

    #[must_use]
    pub fn with_backend(backend: InMemoryBackend) -> Self {
        let config = StorefrontConfig::in_memory().unwrap();
        let state = AppState::with_backend(config, Arc::new(backend.clone())).unwrap();
        Self { backend, state }
    }

    #[must_use]
    pub fn router(&self) -> Router {
        routes::app(self.state.clone())
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), MAX_BODY).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), None).await
    }

    /// Register a member and return their access token.
    pub async fn member(&self, phone: &str) -> String {
        let credentials = json!({
            "email": format!("{phone}@rockygym.com"),
            "password": "barbell-42",
        });
        let (status, _) = self.post("/auth/signup", credentials.clone()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, session) = self.post("/auth/login", credentials).await;
        assert_eq!(status, StatusCode::OK);
        session["access_token"].as_str().unwrap().to_string()
    }

    /// A locker row as stored by the backend.
    pub async fn stored_locker(&self, id: i64) -> Value {
        self.backend
            .rows("lockers")
            .await
            .into_iter()
            .find(|row| row["id"] == id)
            .unwrap()
    }
}

/// A locker row in the backend's format.
#[must_use]
pub fn locker_row(id: i64, number: &str, status: &str) -> Value {
    json!({
        "id": id,
        "number": number,
        "available": status == "available",
        "status": status,
    })
}
