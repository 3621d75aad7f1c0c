//! Ranking & selection: threshold filter, stable descending sort, cap.

use std::cmp::Ordering;

use super::scoring::ScoredArticle;

/// Articles at or below this composite are dropped.
/// Empirically tuned (lowered for source diversity); pinned by tests as current behaviour.
pub const MIN_RELEVANCE_SCORE: f32 = 0.25;

/// Keep articles with `composite > min_score`, sort descending, truncate to `max_count`.
///
/// Ties keep collection order (`sort_by` is stable). An empty result is a
/// valid outcome, not an error.
pub fn select(mut scored: Vec<ScoredArticle>, min_score: f32, max_count: usize) -> Vec<ScoredArticle> {
    scored.retain(|a| a.composite_score > min_score);
    scored.sort_by(|a, b| {
        b.composite_score
            .partial_cmp(&a.composite_score)
            .unwrap_or(Ordering::Equal)
    });
    scored.truncate(max_count);
    scored
}
