//! Turns a magnet into a playable URL through a debrid service.
//!
//! The protocol is strictly sequential per request:
//!
//! 1. add the magnet
//! 2. fetch torrent info and pick the file to stream
//! 3. if the service waits for a file selection, select and re-fetch
//! 4. if the torrent is downloaded, unrestrict its first link
//!
//! Anything short of a direct URL is reported as [`ResolutionOutcome::Pending`]
//! and the caller is expected to retry later.

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::metrics;

use super::file_selector::select_file;
use super::{
    DebridAccount, DebridClient, DebridClientError, FileSelection, TorrentStatus,
    UnrestrictedLink,
};

/// Resolve request as sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolveRequest {
    #[serde(default)]
    pub magnet: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub season: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub episode: u32,
    /// 0-based file index, usually the `file_index` a provider or an earlier
    /// resolve returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_index: Option<u32>,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

impl ResolveRequest {
    pub fn is_episode(&self) -> bool {
        self.season != 0 && self.episode != 0
    }
}

/// Result of a resolve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status")]
pub enum ResolutionOutcome {
    /// The file is ready to play.
    #[serde(rename = "cached")]
    Cached {
        url: String,
        #[serde(rename = "file_id")]
        torrent_id: String,
        /// 0-based; can be sent back verbatim as `file_index`.
        file_index: u32,
    },
    /// The service accepted the torrent but has no link yet.
    #[serde(rename = "downloading")]
    Pending {
        message: String,
        #[serde(rename = "file_id")]
        torrent_id: String,
    },
}

impl ResolutionOutcome {
    fn metric_label(&self) -> &'static str {
        match self {
            ResolutionOutcome::Cached { .. } => "cached",
            ResolutionOutcome::Pending { .. } => "pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebridError {
    #[error("failed adding to cloud: {0}")]
    AddFailed(String),

    #[error("failed checking torrent info: {0}")]
    InfoFetchFailed(String),

    #[error("failed selecting file: {0}")]
    SelectionFailed(String),

    #[error("{0}")]
    FileNotFound(String),
}

impl DebridError {
    fn metric_label(&self) -> &'static str {
        match self {
            DebridError::AddFailed(_) => "add_failed",
            DebridError::InfoFetchFailed(_) => "info_fetch_failed",
            DebridError::SelectionFailed(_) => "selection_failed",
            DebridError::FileNotFound(_) => "file_not_found",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Select every file instead of only the target one.
    pub select_all_files: bool,
}

type ResolveResult = Result<ResolutionOutcome, DebridError>;
type SharedResolve = Shared<BoxFuture<'static, ResolveResult>>;

/// Identity of a resolve for single-flight purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FlightKey {
    token_digest: [u8; 32],
    info_hash: String,
    season: u32,
    episode: u32,
    file_index: Option<u32>,
}

impl FlightKey {
    fn new(token: &str, request: &ResolveRequest) -> Self {
        Self {
            token_digest: Sha256::digest(token.as_bytes()).into(),
            info_hash: magnet_info_hash(&request.magnet),
            season: request.season,
            episode: request.episode,
            file_index: request.file_index,
        }
    }
}

/// Extract the lowercase btih from a magnet URI, or the whole trimmed URI if
/// it has none.
pub fn magnet_info_hash(magnet: &str) -> String {
    let magnet = magnet.trim();
    let lower = magnet.to_lowercase();
    match lower.find("urn:btih:") {
        Some(pos) => {
            let rest = &lower[pos + "urn:btih:".len()..];
            rest.split('&').next().unwrap_or_default().to_string()
        }
        None => lower,
    }
}

struct ResolverInner {
    client: Arc<dyn DebridClient>,
    options: ResolverOptions,
    in_flight: Mutex<HashMap<FlightKey, Flight>>,
}

/// A running resolve and the number of callers awaiting it.
struct Flight {
    future: SharedResolve,
    callers: usize,
}

impl ResolverInner {
    fn in_flight(&self) -> MutexGuard<'_, HashMap<FlightKey, Flight>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn run(&self, token: &str, request: &ResolveRequest) -> ResolveResult {
        let result = self.run_protocol(token, request).await;
        let label = match &result {
            Ok(outcome) => outcome.metric_label(),
            Err(e) => e.metric_label(),
        };
        metrics::RESOLVE_OUTCOMES.with_label_values(&[label]).inc();
        result
    }

    async fn run_protocol(&self, token: &str, request: &ResolveRequest) -> ResolveResult {
        let torrent_id = self
            .client
            .add_magnet(token, &request.magnet)
            .await
            .map_err(|e| DebridError::AddFailed(e.to_string()))?;
        debug!(torrent_id = %torrent_id, "Magnet added");

        let mut info = self
            .client
            .torrent_info(token, &torrent_id)
            .await
            .map_err(|e| DebridError::InfoFetchFailed(e.to_string()))?;

        let target = select_file(
            &info.files,
            request.season,
            request.episode,
            request.file_index,
        )
        .map_err(|e| DebridError::FileNotFound(e.to_string()))?;
        debug!(
            torrent_id = %torrent_id,
            file_id = target,
            status = info.status.as_str(),
            "Target file selected"
        );

        if info.status == TorrentStatus::WaitingFileSelection {
            let selection = if self.options.select_all_files {
                FileSelection::All
            } else {
                FileSelection::Ids(vec![target])
            };

            self.client
                .select_files(token, &torrent_id, &selection)
                .await
                .map_err(|e| DebridError::SelectionFailed(e.to_string()))?;

            info = self
                .client
                .torrent_info(token, &torrent_id)
                .await
                .map_err(|e| DebridError::InfoFetchFailed(e.to_string()))?;
        }

        if info.status == TorrentStatus::Downloaded {
            if let Some(link) = info.links.first() {
                match self.client.unrestrict_link(token, link).await {
                    Ok(unrestricted) => {
                        info!(torrent_id = %torrent_id, "Resolved cached stream");
                        return Ok(ResolutionOutcome::Cached {
                            url: unrestricted.download,
                            torrent_id,
                            file_index: target.saturating_sub(1),
                        });
                    }
                    Err(e) => {
                        warn!(
                            torrent_id = %torrent_id,
                            error = %e,
                            "Unrestrict failed, reporting as pending"
                        );
                    }
                }
            }
        }

        let message = if request.is_episode() {
            format!(
                "Episode S{:02}E{:02} added to cloud.",
                request.season, request.episode
            )
        } else {
            "Movie added to cloud.".to_string()
        };

        info!(
            torrent_id = %torrent_id,
            status = info.status.as_str(),
            "Torrent not ready yet"
        );

        Ok(ResolutionOutcome::Pending {
            message,
            torrent_id,
        })
    }
}

/// Held by every caller of a flight. The entry is removed once the last
/// caller finishes or is dropped.
struct FlightGuard {
    inner: Arc<ResolverInner>,
    key: FlightKey,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut in_flight = self.inner.in_flight();
        if let Some(flight) = in_flight.get_mut(&self.key) {
            flight.callers -= 1;
            if flight.callers == 0 {
                in_flight.remove(&self.key);
            }
        }
    }
}

/// Drives the debrid protocol, sharing identical concurrent resolves.
#[derive(Clone)]
pub struct DebridResolver {
    inner: Arc<ResolverInner>,
}

impl DebridResolver {
    pub fn new(client: Arc<dyn DebridClient>, options: ResolverOptions) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                client,
                options,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Backend name of the underlying client.
    pub fn backend_name(&self) -> &str {
        self.inner.client.name()
    }

    /// Resolve a magnet with the caller's service token.
    ///
    /// Concurrent calls with the same token, torrent and file target share a
    /// single run of the protocol. Nothing is cached once it completes.
    pub async fn resolve(&self, token: &str, request: &ResolveRequest) -> ResolveResult {
        let key = FlightKey::new(token, request);

        let (future, joined) = {
            let mut in_flight = self.inner.in_flight();
            match in_flight.get_mut(&key) {
                Some(flight) => {
                    flight.callers += 1;
                    (flight.future.clone(), true)
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let token = token.to_string();
                    let request = request.clone();
                    let future = async move { inner.run(&token, &request).await }
                        .boxed()
                        .shared();
                    in_flight.insert(
                        key.clone(),
                        Flight {
                            future: future.clone(),
                            callers: 1,
                        },
                    );
                    (future, false)
                }
            }
        };
        let guard = FlightGuard {
            inner: Arc::clone(&self.inner),
            key,
        };

        if joined {
            debug!("Joining in-flight resolve");
            metrics::RESOLVE_SHARED.with_label_values(&[]).inc();
        }

        let result = future.await;
        drop(guard);
        result
    }

    /// Pass-through to the client's unrestrict call.
    pub async fn unrestrict(
        &self,
        token: &str,
        link: &str,
    ) -> Result<UnrestrictedLink, DebridClientError> {
        self.inner.client.unrestrict_link(token, link).await
    }

    /// Pass-through to the client's account call.
    pub async fn account(&self, token: &str) -> Result<DebridAccount, DebridClientError> {
        self.inner.client.account(token).await
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.inner.in_flight().len()
    }
}
