//! Ordering of merged stream candidates.

use super::StreamCandidate;

/// Sort candidates best-first by quality tier, then seeders, then size.
///
/// The sort is stable: candidates that tie on all three keys keep their
/// input order.
pub fn rank(mut candidates: Vec<StreamCandidate>) -> Vec<StreamCandidate> {
    candidates.sort_by(|a, b| {
        (b.quality.rank(), b.seeders, b.size_bytes).cmp(&(
            a.quality.rank(),
            a.seeders,
            a.size_bytes,
        ))
    });
    candidates
}
