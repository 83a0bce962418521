//! Mock stream provider for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::scraper::{ProviderError, ScrapeRequest, StreamCandidate, StreamProvider};

/// Mock implementation of the StreamProvider trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable candidates
/// - Track scrape requests for assertions
/// - Simulate failures, slow responses and panics
///
/// # Example
///
/// ```rust,ignore
/// use debridge_core::testing::{fixtures, MockProvider};
///
/// let provider = MockProvider::new("mock")
///     .with_candidates(vec![fixtures::stream_candidate("Movie 1080p", "abc123")]);
///
/// let candidates = provider.scrape(&ScrapeRequest::movie("tt1")).await?;
/// assert_eq!(candidates.len(), 1);
/// assert_eq!(provider.recorded_requests().await.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    candidates: Arc<RwLock<Vec<StreamCandidate>>>,
    requests: Arc<RwLock<Vec<ScrapeRequest>>>,
    /// Returned on every call while set.
    error: Arc<RwLock<Option<ProviderError>>>,
    /// Returned on the next call only.
    next_error: Arc<RwLock<Option<ProviderError>>>,
    delay: Option<Duration>,
    panics: bool,
}

impl MockProvider {
    /// Create a provider that returns no candidates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            candidates: Arc::new(RwLock::new(Vec::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
            error: Arc::new(RwLock::new(None)),
            next_error: Arc::new(RwLock::new(None)),
            delay: None,
            panics: false,
        }
    }

    pub fn with_candidates(self, candidates: Vec<StreamCandidate>) -> Self {
        Self {
            candidates: Arc::new(RwLock::new(candidates)),
            ..self
        }
    }

    /// Fail every scrape with the given error.
    pub fn with_error(self, error: ProviderError) -> Self {
        Self {
            error: Arc::new(RwLock::new(Some(error))),
            ..self
        }
    }

    /// Sleep before answering.
    pub fn with_delay(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    /// Panic inside `scrape`.
    pub fn with_panic(self) -> Self {
        Self {
            panics: true,
            ..self
        }
    }

    pub async fn set_candidates(&self, candidates: Vec<StreamCandidate>) {
        *self.candidates.write().await = candidates;
    }

    /// Configure the next scrape to fail with the given error.
    pub async fn set_next_error(&self, error: ProviderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get recorded scrape requests.
    pub async fn recorded_requests(&self) -> Vec<ScrapeRequest> {
        self.requests.read().await.clone()
    }

    pub async fn scrape_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl StreamProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<StreamCandidate>, ProviderError> {
        self.requests.write().await.push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.panics {
            panic!("mock provider {} panicked", self.name);
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if let Some(error) = self.error.read().await.clone() {
            return Err(error);
        }

        Ok(self.candidates.read().await.clone())
    }
}
