//! Common test utilities for API testing against a mock fetcher.
//!
//! The fixture builds an in-process router over a real provider pool whose
//! HTTP layer is a `MockFetcher`, so no indexer is ever contacted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use tvnab_core::{load_config, testing::MockFetcher, Fetcher};

/// Re-export fixtures for test convenience
pub use tvnab_core::testing::fixtures;

/// One newznab indexer, one torznab tracker and one enabled provider without a key.
pub const TEST_CATALOG: &str = concat!(
    "MyIndexer|https://my.example/|secret-key|5030,5040|1|episode|0|0|0",
    "!!!Tracker|https://tracker.example/api|tracker-key|5000,5070|1|episode|0|0|0",
    "!!!NoKey|https://nokey.example/||5030|1|episode|0|0|0",
);

/// Write a config with pacing disabled and the given catalogs.
fn write_config(path: &Path, default_catalog: &str, custom: &str) {
    let content = format!(
        r#"
[server]
host = "127.0.0.1"
port = 8080

[search]
load_preset = "disabled"

[providers]
custom = '{}'
default_catalog = '{}'
"#,
        custom, default_catalog
    );
    std::fs::write(path, content).expect("Failed to write test config");
}

/// Test fixture with an in-process router.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     let response = fixture.post("/api/v1/search", json!({ "requests": [] })).await;
///     assert_eq!(response.status, 400);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock fetcher - configure indexer responses
    pub fetcher: Arc<MockFetcher>,
    /// Config file read by catalog reloads
    pub config_path: PathBuf,
    _temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture whose indexers answer with the stock fixtures.
    pub async fn new() -> Self {
        let fixture = Self::empty();
        fixture
            .fetcher
            .set_handler(|url, params| {
                let caps = params.get("t") == Some("caps");
                let body = match (url.contains("tracker.example"), caps) {
                    (true, true) => fixtures::TORZNAB_CAPS,
                    (true, false) => fixtures::TORZNAB_RESULTS,
                    (false, true) => fixtures::NEWZNAB_CAPS,
                    (false, false) => fixtures::NEWZNAB_RESULTS,
                };
                Ok(body.to_string())
            })
            .await;
        fixture
    }

    /// Create a fixture whose fetcher answers every request with an empty body.
    pub fn empty() -> Self {
        Self::with_catalogs("", TEST_CATALOG)
    }

    /// Create a fixture from a default catalog and a user catalog.
    ///
    /// The config is written to a temporary file so catalog reloads read it
    /// back the way the binary does.
    pub fn with_catalogs(default_catalog: &str, custom: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        write_config(&config_path, default_catalog, custom);

        let config = load_config(&config_path).expect("Failed to load test config");
        let fetcher = Arc::new(MockFetcher::new());
        let state = Arc::new(tvnab_server::state::AppState::new(
            config,
            config_path.clone(),
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        ));
        let router = tvnab_server::api::create_router(state);

        Self {
            router,
            fetcher,
            config_path,
            _temp_dir: temp_dir,
        }
    }

    /// Replace the config file; takes effect on the next reload.
    pub fn rewrite_config(&self, default_catalog: &str, custom: &str) {
        write_config(&self.config_path, default_catalog, custom);
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with no body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
