//! Integration tests for Crowe Logic.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests (no services required)
//! cargo test -p crowe-logic-integration-tests
//!
//! # Including PostgreSQL-backed tests
//! cl-cli migrate
//! cargo test -p crowe-logic-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Public product, ingredient and document reads
//! - `batches` - Batch transparency lookups and admin batch management
//! - `auth_admin` - Login, sessions, admin guards and rate limiting
//! - `exports` - Shopify, QR and CSV exports
//! - `quiz` - Recommendation quiz
//! - `postgres` - The same API against `PostgreSQL` (ignored by default)

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crowe_logic_storefront::config::StorefrontConfig;
use crowe_logic_storefront::db::Storage;
use crowe_logic_storefront::seed::BOOTSTRAP_ADMIN_USERNAME;
use crowe_logic_storefront::state::AppState;
use crowe_logic_storefront::{Backend, build_router};

/// Password of the bootstrap admin on every in-memory test server.
pub const ADMIN_PASSWORD: &str = "Mycelium-Tincture-42";

/// A storefront served on an ephemeral local port.
///
/// The server task is aborted when this is dropped.
pub struct TestServer {
    pub base_url: String,
    /// Client with its own cookie jar.
    pub client: Client,
    /// The server's storage, for arranging data the API cannot create.
    pub storage: Arc<dyn Storage>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server backed by the in-memory store and the sample catalog.
    pub async fn spawn() -> Self {
        Self::spawn_with(StorefrontConfig {
            admin_password: Some(SecretString::from(ADMIN_PASSWORD)),
            images_dir: std::env::temp_dir().join("crowe-logic-test-images"),
            ..StorefrontConfig::default()
        })
        .await
    }

    /// Spawn a server with a custom configuration. `base_url` and `port`
    /// are overwritten with the bound address.
    pub async fn spawn_with(mut config: StorefrontConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        config.host = addr.ip();
        config.port = addr.port();
        config.base_url = format!("http://{addr}");

        let backend = Backend::connect(&config)
            .await
            .expect("Failed to initialize storage");
        let base_url = config.base_url.clone();
        let storage = Arc::clone(&backend.storage);
        let app = build_router(AppState::new(config, backend.storage), backend.sessions);

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Test server failed");
        });

        Self {
            base_url,
            client: new_client(),
            storage,
            handle,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A second client with an empty cookie jar.
    #[must_use]
    pub fn anonymous_client(&self) -> Client {
        new_client()
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PUT request failed")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE request failed")
    }

    /// Log `self.client` in as the bootstrap admin.
    pub async fn login_admin(&self) {
        self.login(BOOTSTRAP_ADMIN_USERNAME, ADMIN_PASSWORD).await;
    }

    /// Log `self.client` in, asserting success.
    pub async fn login(&self, username: &str, password: &str) {
        let resp = self
            .post_json(
                "/api/auth/login",
                &json!({"username": username, "password": password}),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK, "login failed for {username}");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Assert the status and decode the JSON body.
pub async fn expect_json(resp: Response, status: StatusCode) -> Value {
    assert_eq!(resp.status(), status, "unexpected status for {}", resp.url());
    resp.json().await.expect("Response body is not JSON")
}

/// Assert an error response and return its `message`.
pub async fn expect_error(resp: Response, status: StatusCode) -> String {
    let body = expect_json(resp, status).await;
    body["message"]
        .as_str()
        .expect("Error body has no message")
        .to_string()
}
