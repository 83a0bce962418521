//! Types for stream discovery.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Video quality tier parsed from a release title.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Quality {
    #[serde(rename = "4k")]
    UltraHd,
    #[serde(rename = "1080p")]
    FullHd,
    #[serde(rename = "720p")]
    Hd,
    #[serde(rename = "480p")]
    Sd,
    #[serde(rename = "unknown")]
    #[default]
    Unknown,
}

impl Quality {
    /// Ordering weight used by the ranker. Higher is better.
    pub fn rank(&self) -> u32 {
        match self {
            Quality::UltraHd => 40,
            Quality::FullHd => 30,
            Quality::Hd => 20,
            Quality::Sd => 10,
            Quality::Unknown => 0,
        }
    }

    /// Loose, case-insensitive parse of a quality label.
    ///
    /// Matches by substring so "2160p", "4K" and "WEB-DL 2160p HDR" all map to
    /// [`Quality::UltraHd`].
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("2160p") || label.contains("4k") {
            Quality::UltraHd
        } else if label.contains("1080p") {
            Quality::FullHd
        } else if label.contains("720p") {
            Quality::Hd
        } else if label.contains("480p") {
            Quality::Sd
        } else {
            Quality::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::UltraHd => "4k",
            Quality::FullHd => "1080p",
            Quality::Hd => "720p",
            Quality::Sd => "480p",
            Quality::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of content being looked up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    #[serde(alias = "series", alias = "tv")]
    Show,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Show => "show",
        }
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Ok(MediaType::Movie),
            "show" | "series" | "tv" => Ok(MediaType::Show),
            other => Err(format!("unknown media type: {}", other)),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lookup for streams of one movie or one episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub media_type: MediaType,
    /// External catalog id, e.g. "tt0133093".
    pub external_id: String,
    /// 0 for movies.
    #[serde(default)]
    pub season: u32,
    /// 0 for movies.
    #[serde(default)]
    pub episode: u32,
}

impl ScrapeRequest {
    pub fn movie(external_id: impl Into<String>) -> Self {
        Self {
            media_type: MediaType::Movie,
            external_id: external_id.into(),
            season: 0,
            episode: 0,
        }
    }

    pub fn episode(external_id: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            media_type: MediaType::Show,
            external_id: external_id.into(),
            season,
            episode,
        }
    }
}

/// A single streamable torrent found by a provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamCandidate {
    /// Release title (first line of the provider's title).
    pub title: String,
    /// Size in bytes, 0 when unknown.
    #[serde(rename = "size")]
    pub size_bytes: u64,
    /// Info hash (lowercase hex). Deduplication key.
    #[serde(rename = "hash")]
    pub info_hash: String,
    #[serde(rename = "magnet")]
    pub magnet_uri: String,
    pub quality: Quality,
    #[serde(rename = "seeds")]
    pub seeders: u32,
    /// Provider that returned this candidate.
    pub source: String,
    /// Index of the matching file inside the torrent, when the provider knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_index: Option<u32>,
}

/// Merged output of one scrape across all providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// Deduplicated, ranked candidates.
    pub candidates: Vec<StreamCandidate>,
    /// Providers that failed (name -> error message).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub provider_errors: HashMap<String, String>,
    pub duration_ms: u64,
}

/// Health snapshot of a registered provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Candidates returned by the last successful scrape.
    pub last_candidates: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_duration_ms: Option<u64>,
}

impl ProviderStatus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_success: None,
            last_error: None,
            last_candidates: 0,
            last_duration_ms: None,
        }
    }
}

/// Errors from a single provider call.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Provider connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Provider request timed out")]
    Timeout,

    #[error("Provider returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Provider exceeded the {0}ms scrape deadline")]
    DeadlineExceeded(u64),

    #[error("Provider task failed: {0}")]
    TaskFailed(String),
}

/// Errors building a [`ScrapeCoordinator`](super::ScrapeCoordinator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("Provider name registered twice: {0}")]
    DuplicateProvider(String),
}

/// A source of stream candidates.
#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Provider name for logging, metrics and candidate `source`.
    fn name(&self) -> &str;

    /// Look up candidates for one movie or episode.
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<StreamCandidate>, ProviderError>;
}
