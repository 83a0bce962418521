//! Stream discovery across torrent index providers.
//!
//! A [`ScrapeCoordinator`] fans a [`ScrapeRequest`] out to every registered
//! [`StreamProvider`], waits for all of them, drops duplicate info hashes and
//! ranks what is left.

mod coordinator;
mod ranker;
mod title_parser;
mod torrentio;
mod types;

pub use coordinator::{deduplicate, normalize_external_id, ScrapeCoordinator};
pub use ranker::rank;
pub use title_parser::{parse_title_metadata, TitleMetadata};
pub use torrentio::TorrentioProvider;
pub use types::*;
