//! Integration tests for the Pet Buddy server.
//!
//! These tests drive a running server (and its store) over HTTP. They are
//! `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p pet-buddy-server &
//! PETBUDDY_TEST_TOKEN=... PETBUDDY_TEST_EMAIL=... \
//!     cargo test -p pet-buddy-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `PETBUDDY_BASE_URL` - Server URL (default: `http://localhost:5000`)
//! - `PETBUDDY_TEST_TOKEN` - Firebase ID token of the test user
//! - `PETBUDDY_TEST_EMAIL` - Email in that token
//! - `PETBUDDY_REQUESTER_TOKEN` - Token of a second user, for adoption flows

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

/// Server under test and the credentials to call it with.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub token: String,
    pub email: String,
}

impl TestContext {
    /// Build a context from the environment.
    ///
    /// # Panics
    ///
    /// Panics if `PETBUDDY_TEST_TOKEN` or `PETBUDDY_TEST_EMAIL` is unset.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn from_env() -> Self {
        Self {
            client: Client::new(),
            base_url: base_url(),
            token: std::env::var("PETBUDDY_TEST_TOKEN").expect("PETBUDDY_TEST_TOKEN must be set"),
            email: std::env::var("PETBUDDY_TEST_EMAIL").expect("PETBUDDY_TEST_EMAIL must be set"),
        }
    }

    /// The same server, called as the second test user.
    ///
    /// # Panics
    ///
    /// Panics if `PETBUDDY_REQUESTER_TOKEN` is unset.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn requester(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: std::env::var("PETBUDDY_REQUESTER_TOKEN")
                .expect("PETBUDDY_REQUESTER_TOKEN must be set"),
            email: String::new(),
        }
    }

    /// Send an authenticated request and decode the JSON response.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be reached.
    pub async fn call(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.client, method, &self.url(path), Some(&self.token), body).await
    }

    /// Send a request without a bearer token.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be reached.
    pub async fn anonymous(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.client, method, &self.url(path), None, body).await
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

/// Base URL for the server (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("PETBUDDY_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// A name no earlier run has used.
#[must_use]
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

#[allow(clippy::expect_used)]
async fn send(
    client: &Client,
    method: Method,
    url: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = client.request(method, url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await.expect("server unreachable");
    let status = response.status();
    let json = response.json().await.unwrap_or(Value::Null);
    (status, json)
}
