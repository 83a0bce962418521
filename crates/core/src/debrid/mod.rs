//! Debrid service integration.
//!
//! A [`DebridClient`] talks to the caching service (Real-Debrid today). The
//! [`DebridResolver`] drives it from a magnet to either a direct URL or a
//! "still downloading" placeholder, using [`select_file`] to find the right
//! file in multi-file torrents.

mod file_selector;
mod real_debrid;
mod resolver;
mod types;

pub use file_selector::{select_file, FileSelectError};
pub use real_debrid::RealDebridClient;
pub use resolver::{
    magnet_info_hash, DebridError, DebridResolver, ResolutionOutcome, ResolveRequest,
    ResolverOptions,
};
pub use types::*;
