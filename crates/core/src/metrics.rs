//! Prometheus metrics for core components.
//!
//! - Scraping (per-provider outcomes and latency, merged candidate counts)
//! - Resolution (outcomes of the debrid protocol)
//! - Debrid service calls

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Scraping
// =============================================================================

/// Provider scrapes total by provider and result.
pub static PROVIDER_SCRAPES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "debridge_provider_scrapes_total",
            "Total provider scrape calls",
        ),
        &["provider", "result"], // "success", "error", "timeout"
    )
    .unwrap()
});

/// Provider scrape duration in seconds.
pub static PROVIDER_SCRAPE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "debridge_provider_scrape_duration_seconds",
            "Duration of provider scrape calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0]),
        &["provider"],
    )
    .unwrap()
});

/// Candidates returned per scrape after deduplication.
pub static SCRAPE_CANDIDATES: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "debridge_scrape_candidates",
            "Number of deduplicated candidates returned per scrape",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Resolution
// =============================================================================

/// Resolve calls by outcome.
pub static RESOLVE_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("debridge_resolve_outcomes_total", "Total resolve outcomes"),
        // "cached", "pending", "add_failed", "info_fetch_failed",
        // "selection_failed", "file_not_found"
        &["outcome"],
    )
    .unwrap()
});

/// Resolve calls that joined an identical in-flight resolve.
pub static RESOLVE_SHARED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "debridge_resolve_shared_total",
            "Resolve calls served by an identical in-flight resolve",
        ),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Debrid service
// =============================================================================

/// Debrid service requests total.
pub static DEBRID_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "debridge_debrid_requests_total",
            "Total debrid service requests",
        ),
        &["operation", "result"], // "success", "error"
    )
    .unwrap()
});

/// Debrid service request duration.
pub static DEBRID_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "debridge_debrid_request_duration_seconds",
            "Duration of debrid service requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0]),
        &["operation"],
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PROVIDER_SCRAPES.clone()),
        Box::new(PROVIDER_SCRAPE_DURATION.clone()),
        Box::new(SCRAPE_CANDIDATES.clone()),
        Box::new(RESOLVE_OUTCOMES.clone()),
        Box::new(RESOLVE_SHARED.clone()),
        Box::new(DEBRID_REQUESTS.clone()),
        Box::new(DEBRID_REQUEST_DURATION.clone()),
    ]
}
