//! Picks the file to stream from a multi-file torrent.

use regex_lite::Regex;
use thiserror::Error;

use super::TorrentFile;

const VIDEO_EXTENSIONS: &[&str] = &[".mkv", ".mp4", ".avi"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileSelectError {
    #[error("{0}")]
    NotFound(String),
}

/// Choose the service file id to stream.
///
/// Movies (`season == 0 || episode == 0`) get the largest file. For episodes a
/// caller-supplied 0-based `requested_index` is tried first, then the
/// `SxxEyy` / `NxMM` naming patterns among video files.
pub fn select_file(
    files: &[TorrentFile],
    season: u32,
    episode: u32,
    requested_index: Option<u32>,
) -> Result<u32, FileSelectError> {
    if season == 0 || episode == 0 {
        return largest_file(files)
            .map(|f| f.id)
            .ok_or_else(|| FileSelectError::NotFound("no files in torrent".to_string()));
    }

    if let Some(index) = requested_index {
        if let Some(id) = by_requested_index(files, index) {
            return Ok(id);
        }
    }

    if let Some(id) = by_episode_pattern(files, season, episode) {
        return Ok(id);
    }

    Err(FileSelectError::NotFound(format!(
        "episode S{:02}E{:02} not found in torrent",
        season, episode
    )))
}

/// First file with the maximum size.
fn largest_file(files: &[TorrentFile]) -> Option<&TorrentFile> {
    files.iter().fold(None, |best: Option<&TorrentFile>, f| match best {
        Some(b) if b.size_bytes >= f.size_bytes => Some(b),
        _ => Some(f),
    })
}

/// Resolve a 0-based caller index against 1-based service ids.
fn by_requested_index(files: &[TorrentFile], index: u32) -> Option<u32> {
    let target = index.checked_add(1)?;

    if let Some(f) = files.iter().find(|f| f.id == target) {
        return Some(f.id);
    }

    // Ids are not always contiguous; fall back to array position.
    files
        .get(target as usize)
        .filter(|f| is_video(&f.path))
        .map(|f| f.id)
}

fn by_episode_pattern(files: &[TorrentFile], season: u32, episode: u32) -> Option<u32> {
    let pattern = format!(
        r"(?i)(S0?{s}\s?E0?{e}\b|\b{s}x0?{e}\b)",
        s = season,
        e = episode
    );
    let re = Regex::new(&pattern).ok()?;

    files
        .iter()
        .filter(|f| is_video(&f.path))
        .find(|f| re.is_match(&f.path))
        .map(|f| f.id)
}

fn is_video(path: &str) -> bool {
    let lower = path.to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
