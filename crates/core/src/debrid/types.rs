//! Types for debrid service operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by a debrid service client.
#[derive(Debug, Clone, Error)]
pub enum DebridClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Status of a torrent on the debrid service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorrentStatus {
    /// Magnet is being converted to a torrent.
    New,
    /// Waiting for the caller to pick files.
    WaitingFileSelection,
    Queued,
    /// Downloading, compressing or uploading on the service side.
    Downloading,
    /// Ready; links are available.
    Downloaded,
    Error,
    /// A status string this client does not know.
    Unknown,
}

impl TorrentStatus {
    /// Map a service status string.
    pub fn from_service(status: &str) -> Self {
        match status {
            "magnet_conversion" => TorrentStatus::New,
            "waiting_files_selection" => TorrentStatus::WaitingFileSelection,
            "queued" => TorrentStatus::Queued,
            "downloading" | "compressing" | "uploading" => TorrentStatus::Downloading,
            "downloaded" => TorrentStatus::Downloaded,
            "magnet_error" | "error" | "virus" | "dead" => TorrentStatus::Error,
            _ => TorrentStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TorrentStatus::New => "new",
            TorrentStatus::WaitingFileSelection => "waiting_file_selection",
            TorrentStatus::Queued => "queued",
            TorrentStatus::Downloading => "downloading",
            TorrentStatus::Downloaded => "downloaded",
            TorrentStatus::Error => "error",
            TorrentStatus::Unknown => "unknown",
        }
    }
}

/// A torrent as seen by the debrid service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentInfo {
    pub id: String,
    pub filename: String,
    pub status: TorrentStatus,
    /// Progress percentage (0-100).
    pub progress: f32,
    pub files: Vec<TorrentFile>,
    /// Hoster links, populated once the torrent is downloaded.
    pub links: Vec<String>,
}

/// A file inside a torrent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TorrentFile {
    /// Service-assigned id, 1-based.
    pub id: u32,
    /// Path within the torrent, usually with a leading '/'.
    pub path: String,
    pub size_bytes: u64,
    pub selected: bool,
}

/// Which files to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    All,
    Ids(Vec<u32>),
}

impl FileSelection {
    /// Form value expected by the service: "all" or "1,2,3".
    pub fn to_form_value(&self) -> String {
        match self {
            FileSelection::All => "all".to_string(),
            FileSelection::Ids(ids) => ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// A hoster link converted to a direct download URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnrestrictedLink {
    pub id: String,
    pub filename: String,
    /// Direct playback URL.
    pub download: String,
    #[serde(default)]
    pub filesize: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Account details of a debrid token's owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebridAccount {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub premium_days: u64,
    /// "premium" or "free".
    pub account_type: String,
}

/// Client for a debrid caching service.
///
/// Every call takes the caller's service token; implementations hold no
/// per-user state.
#[async_trait]
pub trait DebridClient: Send + Sync {
    /// Backend name for logging and metrics.
    fn name(&self) -> &str;

    /// Submit a magnet. Returns the service's torrent id.
    async fn add_magnet(&self, token: &str, magnet: &str) -> Result<String, DebridClientError>;

    async fn torrent_info(
        &self,
        token: &str,
        torrent_id: &str,
    ) -> Result<TorrentInfo, DebridClientError>;

    async fn select_files(
        &self,
        token: &str,
        torrent_id: &str,
        selection: &FileSelection,
    ) -> Result<(), DebridClientError>;

    /// Convert a hoster link into a direct URL.
    async fn unrestrict_link(
        &self,
        token: &str,
        link: &str,
    ) -> Result<UnrestrictedLink, DebridClientError>;

    async fn account(&self, token: &str) -> Result<DebridAccount, DebridClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(TorrentStatus::from_service("magnet_conversion"), TorrentStatus::New);
        assert_eq!(
            TorrentStatus::from_service("waiting_files_selection"),
            TorrentStatus::WaitingFileSelection
        );
        assert_eq!(TorrentStatus::from_service("queued"), TorrentStatus::Queued);
        for s in ["downloading", "compressing", "uploading"] {
            assert_eq!(TorrentStatus::from_service(s), TorrentStatus::Downloading);
        }
        assert_eq!(TorrentStatus::from_service("downloaded"), TorrentStatus::Downloaded);
        for s in ["magnet_error", "error", "virus", "dead"] {
            assert_eq!(TorrentStatus::from_service(s), TorrentStatus::Error);
        }
        assert_eq!(TorrentStatus::from_service("something_new"), TorrentStatus::Unknown);
    }

    #[test]
    fn test_file_selection_form_value() {
        assert_eq!(FileSelection::All.to_form_value(), "all");
        assert_eq!(FileSelection::Ids(vec![3]).to_form_value(), "3");
        assert_eq!(FileSelection::Ids(vec![1, 2, 5]).to_form_value(), "1,2,5");
    }
}
