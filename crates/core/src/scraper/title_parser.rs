//! Best-effort metadata extraction from provider release titles.
//!
//! Titles look like:
//!
//! ```text
//! Show.S01E02.1080p.WEB.x264
//! 👤 42 💾 1.4 GB ⚙️ ThePirateBay
//! ```
//!
//! Each field is extracted independently. A field that cannot be parsed is
//! reported as unknown (0 or [`Quality::Unknown`]), never as an error.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::Quality;

static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"💾\s+(\d+(?:\.\d+)?)\s+(GB|MB)").unwrap());

static SEEDS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"👤\s*(\d+)").unwrap());

static QUALITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(2160p|4k|1080p|720p|480p)\b").unwrap());

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Metadata recovered from a release title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TitleMetadata {
    pub size_bytes: u64,
    pub seeders: u32,
    pub quality: Quality,
}

/// Extract size, seeders and quality from a raw title.
pub fn parse_title_metadata(title: &str) -> TitleMetadata {
    TitleMetadata {
        size_bytes: parse_size(title),
        seeders: parse_seeders(title),
        quality: parse_quality(title),
    }
}

fn parse_size(title: &str) -> u64 {
    let Some(caps) = SIZE_RE.captures(title) else {
        return 0;
    };
    let Ok(value) = caps[1].parse::<f64>() else {
        return 0;
    };
    let multiplier = match &caps[2] {
        "GB" => GIB,
        _ => MIB,
    };
    (value * multiplier) as u64
}

fn parse_seeders(title: &str) -> u32 {
    SEEDS_RE
        .captures(title)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

fn parse_quality(title: &str) -> Quality {
    QUALITY_RE
        .captures(title)
        .map(|caps| Quality::from_label(&caps[1]))
        .unwrap_or(Quality::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_title() {
        let title = "Show.S01E02.1080p.WEB.x264\n👤 42 💾 1.5 GB ⚙️ ThePirateBay";
        let meta = parse_title_metadata(title);
        assert_eq!(meta.size_bytes, (1.5 * GIB) as u64);
        assert_eq!(meta.seeders, 42);
        assert_eq!(meta.quality, Quality::FullHd);
    }

    #[test]
    fn test_parse_size_megabytes() {
        let meta = parse_title_metadata("Movie 720p\n💾 700 MB");
        assert_eq!(meta.size_bytes, 700 * 1024 * 1024);
        assert_eq!(meta.quality, Quality::Hd);
    }

    #[test]
    fn test_parse_2160p_maps_to_4k() {
        assert_eq!(
            parse_title_metadata("Movie.2160p.HDR").quality,
            Quality::UltraHd
        );
        assert_eq!(parse_title_metadata("Movie 4K remux").quality, Quality::UltraHd);
    }

    #[test]
    fn test_parse_missing_fields_are_unknown() {
        let meta = parse_title_metadata("Just a title");
        assert_eq!(meta, TitleMetadata::default());
    }

    #[test]
    fn test_quality_requires_word_boundary() {
        assert_eq!(parse_title_metadata("x1080p").quality, Quality::Unknown);
    }

    #[test]
    fn test_seeders_without_space() {
        assert_eq!(parse_title_metadata("👤7 💾 1 GB").seeders, 7);
    }

    #[test]
    fn test_size_requires_space_after_icon() {
        assert_eq!(parse_title_metadata("💾1.2 GB").size_bytes, 0);
    }
}
