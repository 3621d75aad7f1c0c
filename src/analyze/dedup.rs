//! Cross-provider deduplication.
//!
//! Order-preserving, first-seen-wins:
//! - a non-empty `canonical_url` already kept → drop
//! - word-set Jaccard similarity of lowercased titles > [`DUPLICATE_TITLE_THRESHOLD`]
//!   against any kept title → drop as near-duplicate
//!
//! Jaccard ignores word order and stemming, so reworded headlines about the
//! same event can slip through. That false-negative mode is accepted.
//!
//! Quadratic in input size; inputs are bounded by providers × page size.

use std::collections::HashSet;

use crate::ingest::types::Article;

/// Titles strictly above this similarity are treated as the same story.
pub const DUPLICATE_TITLE_THRESHOLD: f32 = 0.85;

/// Word-set Jaccard index of two strings (whitespace-split, lowercased).
///
/// Two strings with no words at all score 0.0.
pub fn jaccard_similarity(a: &str, b: &str) -> f32 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let set_a: HashSet<&str> = a.split_whitespace().collect();
    let set_b: HashSet<&str> = b.split_whitespace().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f32 / union as f32
}

/// Remove URL duplicates and near-duplicate titles, keeping the first occurrence.
pub fn dedupe(articles: Vec<Article>) -> Vec<Article> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut kept_titles: Vec<String> = Vec::new();
    let mut kept = Vec::with_capacity(articles.len());

    for article in articles {
        let url = article.canonical_url.as_str();
        if !url.is_empty() && seen_urls.contains(url) {
            continue;
        }

        let title = article.title.to_lowercase();
        let near_duplicate = kept_titles
            .iter()
            .any(|seen| jaccard_similarity(&title, seen) > DUPLICATE_TITLE_THRESHOLD);
        if near_duplicate {
            continue;
        }

        if !url.is_empty() {
            seen_urls.insert(url.to_string());
        }
        kept_titles.push(title);
        kept.push(article);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::ProviderId;
    use chrono::Utc;

    fn art(title: &str, url: &str) -> Article {
        Article {
            title: title.into(),
            description: String::new(),
            body_text: String::new(),
            url: url.into(),
            canonical_url: url.into(),
            source_name: "x".into(),
            provider: ProviderId::Guardian,
            published_at: Utc::now(),
            image_url: None,
            credibility: 0.9,
        }
    }

    #[test]
    fn jaccard_basics() {
        assert_eq!(jaccard_similarity("a b c", "a b c"), 1.0);
        assert_eq!(jaccard_similarity("a b", "c d"), 0.0);
        assert!((jaccard_similarity("a b c", "a b d") - 0.5).abs() < 1e-6);
        assert_eq!(jaccard_similarity("", ""), 0.0);
        // order and case do not matter
        assert_eq!(jaccard_similarity("Carbon Tax EU", "eu carbon tax"), 1.0);
    }

    #[test]
    fn same_url_dropped_first_kept() {
        let out = dedupe(vec![
            art("First headline", "https://a.com/1"),
            art("Completely different words here", "https://a.com/1"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "First headline");
    }

    #[test]
    fn empty_urls_are_unique() {
        let out = dedupe(vec![
            art("Alpha story one", ""),
            art("Beta story two", ""),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn near_duplicate_title_dropped() {
        // 13 shared words of 14 total → 0.929
        let base = "sabic carbon tax plan hits gulf petrochemical producers as eu border levy looms";
        let variant = format!("{base} again");
        let out = dedupe(vec![
            art(base, "https://a.com/1"),
            art(&variant, "https://b.com/2"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].canonical_url, "https://a.com/1");
    }

    #[test]
    fn similarity_at_threshold_is_kept() {
        // Two sets sharing 17 of 20 words → exactly 0.85, which is not a duplicate.
        let shared: Vec<String> = (0..17).map(|i| format!("w{i}")).collect();
        let a = format!("{} x1 x2", shared.join(" "));
        let b = format!("{} y1", shared.join(" "));
        // union = 17 + 2 + 1 = 20
        assert!((jaccard_similarity(&a, &b) - 0.85).abs() < 1e-6);
        let out = dedupe(vec![art(&a, ""), art(&b, "")]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn dropped_article_does_not_reserve_its_url() {
        let out = dedupe(vec![
            art("market update today", "https://a.com/1"),
            art("market update today", "https://b.com/2"),
            art("unrelated polymer story", "https://b.com/2"),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].title, "unrelated polymer story");
    }
}
