//! Testing utilities and mock implementations.
//!
//! Mocks for the provider and debrid traits let the coordinator, the resolver
//! and the HTTP layer be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use debridge_core::testing::{fixtures, MockDebridClient, MockProvider};
//!
//! let provider = MockProvider::new("mock")
//!     .with_candidates(vec![fixtures::stream_candidate("Movie 1080p", "abc123")]);
//! let debrid = MockDebridClient::new();
//!
//! // Use in AppState...
//! ```

mod mock_debrid;
mod mock_provider;

pub use mock_debrid::{MockCall, MockDebridClient};
pub use mock_provider::MockProvider;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::debrid::{TorrentFile, TorrentInfo, TorrentStatus};
    use crate::scraper::{Quality, StreamCandidate};

    /// Create a test candidate; quality is parsed from the title.
    pub fn stream_candidate(title: &str, info_hash: &str) -> StreamCandidate {
        StreamCandidate {
            title: title.to_string(),
            size_bytes: 1024 * 1024 * 1024, // 1 GB
            info_hash: info_hash.to_string(),
            magnet_uri: format!("magnet:?xt=urn:btih:{}", info_hash),
            quality: Quality::from_label(title),
            seeders: 50,
            source: "mock".to_string(),
            file_index: None,
        }
    }

    /// Create a test candidate with explicit ranking fields.
    pub fn ranked_candidate(
        info_hash: &str,
        quality: Quality,
        seeders: u32,
        size_bytes: u64,
    ) -> StreamCandidate {
        StreamCandidate {
            quality,
            seeders,
            size_bytes,
            ..stream_candidate(&format!("Release {}", info_hash), info_hash)
        }
    }

    /// Files of a season pack: `/{show}.S{season}E{n}.1080p.mkv` plus an nfo.
    pub fn season_pack(show: &str, season: u32, episodes: u32) -> Vec<TorrentFile> {
        let mut files: Vec<TorrentFile> = (1..=episodes)
            .map(|e| TorrentFile {
                id: e,
                path: format!("/{}.S{:02}E{:02}.1080p.mkv", show, season, e),
                size_bytes: 1024 * 1024 * 500,
                selected: false,
            })
            .collect();
        files.push(TorrentFile {
            id: episodes + 1,
            path: format!("/{}.S{:02}.nfo", show, season),
            size_bytes: 2048,
            selected: false,
        });
        files
    }

    /// A single movie file plus a sample.
    pub fn movie_files(title: &str) -> Vec<TorrentFile> {
        vec![
            TorrentFile {
                id: 1,
                path: format!("/{}/Sample.mkv", title),
                size_bytes: 1024 * 1024 * 50,
                selected: false,
            },
            TorrentFile {
                id: 2,
                path: format!("/{}/{}.2160p.mkv", title, title),
                size_bytes: 1024 * 1024 * 1024 * 20,
                selected: false,
            },
        ]
    }

    /// Torrent info with the mock client's default torrent id.
    pub fn torrent_info(
        status: TorrentStatus,
        files: Vec<TorrentFile>,
        links: Vec<&str>,
    ) -> TorrentInfo {
        TorrentInfo {
            id: "T1".to_string(),
            filename: "Mock.Release".to_string(),
            progress: if status == TorrentStatus::Downloaded {
                100.0
            } else {
                0.0
            },
            status,
            files,
            links: links.into_iter().map(String::from).collect(),
        }
    }
}
