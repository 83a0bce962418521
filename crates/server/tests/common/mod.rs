//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling E2E testing without reaching
//! any provider or debrid service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use debridge_core::{
    config::{AuthConfig, DebridBackend, DebridConfig, ScraperConfig, ServerConfig},
    testing::{MockDebridClient, MockProvider},
    ApiKeyAuthenticator, AuthMethod, Authenticator, Config, CredentialStore, DebridResolver,
    NoneAuthenticator, ResolverOptions, ScrapeCoordinator, StaticCredentialStore,
    StreamProvider,
};

/// Re-export fixtures for test convenience
pub use debridge_core::testing::fixtures;

/// Debrid token given to every caller unless the test overrides it.
pub const TEST_TOKEN: &str = "test-debrid-token";

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - Stream providers (MockProvider)
/// - The debrid service (MockDebridClient)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_scrape() {
///     let fixture = TestFixture::new().await;
///     fixture.providers[0].set_candidates(vec![...]).await;
///
///     let response = fixture.get("/api/v1/stream/scrape?external_id=tt1&type=movie").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock providers, in registration order
    pub providers: Vec<Arc<MockProvider>>,
    /// Mock debrid client (present unless debrid is disabled)
    pub debrid: Option<Arc<MockDebridClient>>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let providers: Vec<Arc<MockProvider>> = test_config
            .provider_names
            .iter()
            .map(|name| Arc::new(MockProvider::new(name.as_str())))
            .collect();
        let registered: Vec<Arc<dyn StreamProvider>> = providers
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn StreamProvider>)
            .collect();
        let coordinator = ScrapeCoordinator::new(registered, test_config.provider_timeout)
            .expect("mock provider names must be unique");

        let auth = match &test_config.api_key {
            Some(key) => AuthConfig {
                method: AuthMethod::ApiKey,
                api_key: Some(key.clone()),
            },
            None => AuthConfig {
                method: AuthMethod::None,
                api_key: None,
            },
        };
        let authenticator: Arc<dyn Authenticator> = match &test_config.api_key {
            Some(key) => Arc::new(ApiKeyAuthenticator::new(key.clone())),
            None => Arc::new(NoneAuthenticator),
        };

        let debrid_config = test_config.enable_debrid.then(|| DebridConfig {
            backend: DebridBackend::RealDebrid,
            url: "http://debrid.invalid".to_string(),
            timeout_secs: 5,
            select_all_files: false,
            api_token: test_config.default_token.clone(),
            user_tokens: test_config.user_tokens.clone(),
        });

        let (debrid, resolver, credentials): (
            Option<Arc<MockDebridClient>>,
            Option<DebridResolver>,
            Arc<dyn CredentialStore>,
        ) = match &debrid_config {
            Some(cfg) => {
                let client = Arc::new(MockDebridClient::new());
                let resolver = DebridResolver::new(client.clone(), ResolverOptions::default());
                (
                    Some(client),
                    Some(resolver),
                    Arc::new(StaticCredentialStore::from_config(cfg)),
                )
            }
            None => (None, None, Arc::new(StaticCredentialStore::default())),
        };

        let config = Config {
            auth,
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            scraper: ScraperConfig::default(),
            debrid: debrid_config,
        };

        let state = Arc::new(debridge_server::state::AppState::new(
            config,
            authenticator,
            coordinator,
            resolver,
            credentials,
        ));

        let router = debridge_server::api::create_router(state);

        Self {
            router,
            providers,
            debrid,
        }
    }

    /// The mock debrid client; panics when debrid is disabled.
    pub fn debrid(&self) -> &Arc<MockDebridClient> {
        self.debrid.as_ref().expect("debrid is disabled in this fixture")
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, &[]).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), &[]).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request("GET", path, None, headers).await
    }

    /// Send a POST request with JSON body and extra headers.
    pub async fn post_with_headers(
        &self,
        path: &str,
        body: Value,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        self.request("POST", path, Some(body), headers).await
    }

    /// Send a POST request with a raw body and an optional content type.
    pub async fn post_raw(
        &self,
        path: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method("POST").uri(path);
        if let Some(content_type) = content_type {
            request_builder = request_builder.header("Content-Type", content_type);
        }
        let request = request_builder.body(Body::from(body.to_string())).unwrap();
        self.send(request).await
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
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
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

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Names of the mock providers to register
    pub provider_names: Vec<String>,
    /// Per-provider scrape deadline
    pub provider_timeout: Duration,
    /// Configure a debrid backend backed by `MockDebridClient`
    pub enable_debrid: bool,
    /// Token used for callers without a dedicated entry
    pub default_token: Option<String>,
    /// Per-user debrid tokens
    pub user_tokens: HashMap<String, String>,
    /// Require this API key when set
    pub api_key: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            provider_names: vec!["alpha".to_string(), "beta".to_string()],
            provider_timeout: Duration::from_millis(300),
            enable_debrid: true,
            default_token: Some(TEST_TOKEN.to_string()),
            user_tokens: HashMap::new(),
            api_key: None,
        }
    }
}

impl TestConfig {
    /// No `[debrid]` section.
    pub fn without_debrid() -> Self {
        Self {
            enable_debrid: false,
            default_token: None,
            ..Self::default()
        }
    }

    /// Debrid configured, but nobody has a token.
    pub fn without_tokens() -> Self {
        Self {
            default_token: None,
            ..Self::default()
        }
    }

    /// API key auth with a per-user token for the key's identity.
    pub fn with_api_key(key: &str, user_token: &str) -> Self {
        let mut user_tokens = HashMap::new();
        user_tokens.insert("api_key_user".to_string(), user_token.to_string());
        Self {
            api_key: Some(key.to_string()),
            default_token: None,
            user_tokens,
            ..Self::default()
        }
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
