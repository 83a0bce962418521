//! Torrentio stream index provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::TorrentioConfig;

use super::title_parser::parse_title_metadata;
use super::{MediaType, ProviderError, ScrapeRequest, StreamCandidate, StreamProvider};

const SOURCE_NAME: &str = "Torrentio";

/// Queries a Torrentio-compatible stream index.
pub struct TorrentioProvider {
    client: Client,
    config: TorrentioConfig,
}

impl TorrentioProvider {
    /// Create a provider with its own HTTP client.
    pub fn new(config: TorrentioConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Build the stream lookup URL for a request.
    fn build_stream_url(&self, request: &ScrapeRequest) -> String {
        let kind = match request.media_type {
            MediaType::Movie => "movie",
            MediaType::Show => "series",
        };

        let target = match request.media_type {
            MediaType::Movie => request.external_id.clone(),
            MediaType::Show => format!(
                "{}:{}:{}",
                request.external_id, request.season, request.episode
            ),
        };

        let base = self.config.url.trim_end_matches('/');
        let options = self.config.options.trim_matches('/');

        if options.is_empty() {
            format!("{}/stream/{}/{}.json", base, kind, target)
        } else {
            format!(
                "{}/{}/stream/{}/{}.json",
                base,
                options.replace('|', "%7C"),
                kind,
                target
            )
        }
    }
}

#[async_trait]
impl StreamProvider for TorrentioProvider {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<StreamCandidate>, ProviderError> {
        let url = self.build_stream_url(request);
        debug!(provider = SOURCE_NAME, url = %url, "Requesting streams");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::ConnectionFailed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::HttpStatus {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: TorrentioResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let candidates: Vec<StreamCandidate> = parsed
            .streams
            .into_iter()
            .filter_map(stream_to_candidate)
            .collect();

        debug!(
            provider = SOURCE_NAME,
            results = candidates.len(),
            "Torrentio scrape complete"
        );

        Ok(candidates)
    }
}

fn stream_to_candidate(stream: TorrentioStream) -> Option<StreamCandidate> {
    let info_hash = stream.info_hash?.trim().to_lowercase();
    if info_hash.is_empty() {
        return None;
    }

    let raw_title = stream.title.unwrap_or_default();
    let meta = parse_title_metadata(&raw_title);
    let title = raw_title.lines().next().unwrap_or_default().to_string();

    Some(StreamCandidate {
        title,
        size_bytes: meta.size_bytes,
        magnet_uri: format!("magnet:?xt=urn:btih:{}", info_hash),
        info_hash,
        quality: meta.quality,
        seeders: meta.seeders,
        source: SOURCE_NAME.to_string(),
        file_index: stream.file_idx,
    })
}

// Torrentio API response types
#[derive(Debug, Deserialize)]
struct TorrentioResponse {
    #[serde(default)]
    streams: Vec<TorrentioStream>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TorrentioStream {
    title: Option<String>,
    info_hash: Option<String>,
    file_idx: Option<u32>,
}
