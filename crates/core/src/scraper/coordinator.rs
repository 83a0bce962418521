//! Fan-out of one scrape request to every registered provider.

use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::metrics;

use super::ranker::rank;
use super::{
    CoordinatorError, ProviderError, ProviderStatus, ScrapeRequest, ScrapeResult,
    StreamCandidate, StreamProvider,
};

/// Queries all providers concurrently and merges their candidates.
pub struct ScrapeCoordinator {
    providers: Vec<Arc<dyn StreamProvider>>,
    provider_timeout: Duration,
    status: RwLock<HashMap<String, ProviderStatus>>,
}

/// Outcome of one provider task after the join.
type ProviderOutcome = (String, Duration, Result<Vec<StreamCandidate>, ProviderError>);

impl ScrapeCoordinator {
    /// Provider names key both the health status and `provider_errors`, so
    /// they must be unique.
    pub fn new(
        providers: Vec<Arc<dyn StreamProvider>>,
        provider_timeout: Duration,
    ) -> Result<Self, CoordinatorError> {
        let mut status = HashMap::with_capacity(providers.len());
        for provider in &providers {
            let name = provider.name();
            if status
                .insert(name.to_string(), ProviderStatus::new(name))
                .is_some()
            {
                return Err(CoordinatorError::DuplicateProvider(name.to_string()));
            }
        }

        Ok(Self {
            providers,
            provider_timeout,
            status: RwLock::new(status),
        })
    }

    /// Names of the registered providers, in registration order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Scrape every provider and return the deduplicated, ranked candidates.
    ///
    /// Never fails: a provider that errors, exceeds the deadline or panics
    /// contributes no candidates and is reported in `provider_errors`.
    pub async fn scrape_all(&self, request: &ScrapeRequest) -> ScrapeResult {
        let start = Instant::now();

        let mut request = request.clone();
        request.external_id = normalize_external_id(&request.external_id);

        debug!(
            providers = self.providers.len(),
            external_id = %request.external_id,
            media_type = %request.media_type,
            season = request.season,
            episode = request.episode,
            "Starting scrape"
        );

        let handles: Vec<_> = self
            .providers
            .iter()
            .map(|provider| {
                let provider = Arc::clone(provider);
                let request = request.clone();
                let deadline = self.provider_timeout;
                tokio::spawn(async move {
                    let started = Instant::now();
                    let result = tokio::time::timeout(deadline, provider.scrape(&request))
                        .await
                        .unwrap_or_else(|_| {
                            Err(ProviderError::DeadlineExceeded(deadline.as_millis() as u64))
                        });
                    (started.elapsed(), result)
                })
            })
            .collect();

        let joined = futures::future::join_all(handles).await;

        // Join results come back in registration order.
        let outcomes: Vec<ProviderOutcome> = self
            .providers
            .iter()
            .zip(joined)
            .map(|(provider, joined)| {
                let name = provider.name().to_string();
                match joined {
                    Ok((elapsed, result)) => (name, elapsed, result),
                    Err(e) => (
                        name,
                        start.elapsed(),
                        Err(ProviderError::TaskFailed(e.to_string())),
                    ),
                }
            })
            .collect();

        let mut merged: Vec<StreamCandidate> = Vec::new();
        let mut provider_errors: HashMap<String, String> = HashMap::new();

        for (name, elapsed, result) in outcomes {
            metrics::PROVIDER_SCRAPE_DURATION
                .with_label_values(&[name.as_str()])
                .observe(elapsed.as_secs_f64());

            match result {
                Ok(mut candidates) => {
                    metrics::PROVIDER_SCRAPES
                        .with_label_values(&[name.as_str(), "success"])
                        .inc();
                    self.record_success(&name, candidates.len(), elapsed).await;
                    merged.append(&mut candidates);
                }
                Err(e) => {
                    let label = match &e {
                        ProviderError::DeadlineExceeded(_) => "timeout",
                        _ => "error",
                    };
                    metrics::PROVIDER_SCRAPES
                        .with_label_values(&[name.as_str(), label])
                        .inc();
                    warn!(provider = %name, error = %e, "Provider scrape failed");
                    self.record_failure(&name, &e, elapsed).await;
                    provider_errors.insert(name, e.to_string());
                }
            }
        }

        let candidates = rank(deduplicate(merged));
        let duration_ms = start.elapsed().as_millis() as u64;

        metrics::SCRAPE_CANDIDATES
            .with_label_values(&[])
            .observe(candidates.len() as f64);

        debug!(
            results = candidates.len(),
            failed_providers = provider_errors.len(),
            duration_ms = duration_ms,
            "Scrape complete"
        );

        ScrapeResult {
            candidates,
            provider_errors,
            duration_ms,
        }
    }

    /// Health snapshot of every provider, in registration order.
    pub async fn provider_status(&self) -> Vec<ProviderStatus> {
        let status = self.status.read().await;
        self.providers
            .iter()
            .map(|p| {
                status
                    .get(p.name())
                    .cloned()
                    .unwrap_or_else(|| ProviderStatus::new(p.name()))
            })
            .collect()
    }

    async fn record_success(&self, name: &str, candidates: usize, elapsed: Duration) {
        let mut status = self.status.write().await;
        if let Some(s) = status.get_mut(name) {
            s.last_success = Some(Utc::now());
            s.last_error = None;
            s.last_candidates = candidates;
            s.last_duration_ms = Some(elapsed.as_millis() as u64);
        }
    }

    async fn record_failure(&self, name: &str, error: &ProviderError, elapsed: Duration) {
        let mut status = self.status.write().await;
        if let Some(s) = status.get_mut(name) {
            s.last_error = Some(error.to_string());
            s.last_duration_ms = Some(elapsed.as_millis() as u64);
        }
    }
}

/// Drop repeated info hashes, keeping the first occurrence.
///
/// Hashes compare case-insensitively. Candidates without a hash are dropped
/// since they cannot be resolved.
pub fn deduplicate(candidates: Vec<StreamCandidate>) -> Vec<StreamCandidate> {
    let mut seen: HashSet<String> = HashSet::new();
    candidates
        .into_iter()
        .filter_map(|mut c| {
            let hash = c.info_hash.trim().to_lowercase();
            if hash.is_empty() || !seen.insert(hash.clone()) {
                return None;
            }
            c.info_hash = hash;
            Some(c)
        })
        .collect()
}

/// Strip an `imdb:` prefix from an external id.
pub fn normalize_external_id(id: &str) -> String {
    let id = id.trim();
    if id.starts_with("tt") {
        return id.to_string();
    }
    match id.strip_prefix("imdb:") {
        Some(rest) => rest.to_string(),
        None => id.to_string(),
    }
}
