//! Diagnostics over the final selection: per-provider yield, diversity, quality.
//!
//! Pure function of already-computed data; nothing here performs I/O.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::scoring::ScoredArticle;
use crate::ingest::types::{ProviderId, ProviderResult};

/// Impact score above which an article counts toward `high_impact_count`.
pub const HIGH_IMPACT_THRESHOLD: f32 = 0.3;

const Q_RELEVANCE: f32 = 0.3;
const Q_CREDIBILITY: f32 = 0.3;
const Q_DIVERSITY: f32 = 0.2;
const Q_ENTERPRISE: f32 = 0.2;

/// Raw yield and error of one provider for the current call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSummary {
    pub provider: ProviderId,
    pub count: usize,
    pub error: Option<String>,
}

impl From<&ProviderResult> for ProviderSummary {
    fn from(r: &ProviderResult) -> Self {
        Self {
            provider: r.provider,
            count: r.raw_count,
            error: r.error.as_ref().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationStats {
    pub total_providers_configured: usize,
    /// Articles per provider in the final set.
    pub per_provider_counts: BTreeMap<ProviderId, usize>,
    /// Final / raw per provider (0 when the provider returned nothing).
    pub provider_efficiency: BTreeMap<ProviderId, f32>,
    pub unique_providers_used: usize,
    pub diversity_score: f32,
    pub quality_score: f32,
    pub average_articles_per_provider: f32,
    pub high_impact_count: usize,
    pub raw_count: usize,
    pub final_count: usize,
    pub meets_target: bool,
}

/// Derive [`AggregationStats`] from the final ranked set and per-provider summaries.
pub fn summarize(
    final_articles: &[ScoredArticle],
    provider_results: &[ProviderSummary],
    target_count: usize,
) -> AggregationStats {
    let mut per_provider_counts: BTreeMap<ProviderId, usize> = BTreeMap::new();
    for a in final_articles {
        *per_provider_counts.entry(a.article.provider).or_default() += 1;
    }

    let provider_efficiency = provider_results
        .iter()
        .map(|r| {
            let final_count = per_provider_counts.get(&r.provider).copied().unwrap_or(0);
            let eff = if r.count > 0 {
                final_count as f32 / r.count as f32
            } else {
                0.0
            };
            (r.provider, eff)
        })
        .collect();

    let total_providers_configured = provider_results
        .iter()
        .map(|r| r.provider)
        .collect::<BTreeSet<_>>()
        .len();
    let unique_providers_used = per_provider_counts.len();
    let diversity_score = unique_providers_used as f32 / total_providers_configured.max(1) as f32;

    let final_count = final_articles.len();

    AggregationStats {
        total_providers_configured,
        per_provider_counts,
        provider_efficiency,
        unique_providers_used,
        diversity_score,
        quality_score: quality_score(final_articles, diversity_score),
        average_articles_per_provider: final_count as f32 / unique_providers_used.max(1) as f32,
        high_impact_count: final_articles
            .iter()
            .filter(|a| a.impact_score > HIGH_IMPACT_THRESHOLD)
            .count(),
        raw_count: provider_results.iter().map(|r| r.count).sum(),
        final_count,
        meets_target: final_count >= target_count,
    }
}

/// Weighted blend of mean relevance, mean credibility, diversity and enterprise-grade ratio.
fn quality_score(articles: &[ScoredArticle], diversity: f32) -> f32 {
    if articles.is_empty() {
        return 0.0;
    }
    let n = articles.len() as f32;
    let mean_relevance = articles.iter().map(|a| a.relevance_score).sum::<f32>() / n;
    let mean_credibility = articles.iter().map(|a| a.article.credibility).sum::<f32>() / n;
    let enterprise_ratio = articles.iter().filter(|a| a.enterprise_grade).count() as f32 / n;

    (mean_relevance * Q_RELEVANCE
        + mean_credibility * Q_CREDIBILITY
        + diversity * Q_DIVERSITY
        + enterprise_ratio * Q_ENTERPRISE)
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Article;
    use chrono::Utc;

    fn scored(provider: ProviderId, relevance: f32, credibility: f32, composite: f32) -> ScoredArticle {
        ScoredArticle {
            article: Article {
                title: "t".into(),
                description: String::new(),
                body_text: String::new(),
                url: String::new(),
                canonical_url: String::new(),
                source_name: "x".into(),
                provider,
                published_at: Utc::now(),
                image_url: None,
                credibility,
            },
            relevance_score: relevance,
            domain_score: 0.0,
            impact_score: 0.35,
            composite_score: composite,
            enterprise_grade: composite > 0.4,
        }
    }

    fn summary(provider: ProviderId, count: usize, error: Option<&str>) -> ProviderSummary {
        ProviderSummary {
            provider,
            count,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn counts_diversity_and_efficiency() {
        let finals = vec![
            scored(ProviderId::Guardian, 0.5, 0.9, 0.6),
            scored(ProviderId::Guardian, 0.5, 0.9, 0.3),
            scored(ProviderId::GNews, 0.5, 0.8, 0.5),
        ];
        let providers = vec![
            summary(ProviderId::Guardian, 4, None),
            summary(ProviderId::GNews, 2, None),
            summary(ProviderId::Nyt, 0, Some("nyt: daily quota exceeded")),
            summary(ProviderId::NewsApi, 3, None),
        ];
        let s = summarize(&finals, &providers, 3);

        assert_eq!(s.total_providers_configured, 4);
        assert_eq!(s.per_provider_counts[&ProviderId::Guardian], 2);
        assert_eq!(s.unique_providers_used, 2);
        assert!((s.diversity_score - 0.5).abs() < 1e-6);
        assert!((s.provider_efficiency[&ProviderId::Guardian] - 0.5).abs() < 1e-6);
        assert_eq!(s.provider_efficiency[&ProviderId::Nyt], 0.0);
        assert_eq!(s.provider_efficiency[&ProviderId::NewsApi], 0.0);
        assert_eq!(s.raw_count, 9);
        assert_eq!(s.final_count, 3);
        assert!(s.meets_target);
        assert_eq!(s.high_impact_count, 3);
        assert!((s.average_articles_per_provider - 1.5).abs() < 1e-6);

        // 0.5*0.3 + (2.6/3)*0.3 + 0.5*0.2 + (2/3)*0.2
        let expect = 0.15 + (2.6 / 3.0) * 0.3 + 0.1 + (2.0 / 3.0) * 0.2;
        assert!((s.quality_score - expect).abs() < 1e-5);
    }

    #[test]
    fn empty_final_set() {
        let s = summarize(&[], &[summary(ProviderId::Nyt, 5, None)], 18);
        assert_eq!(s.quality_score, 0.0);
        assert_eq!(s.diversity_score, 0.0);
        assert_eq!(s.final_count, 0);
        assert!(!s.meets_target);
        assert_eq!(s.average_articles_per_provider, 0.0);
    }

    #[test]
    fn enterprise_grade_threshold_current_value_pin() {
        assert_eq!(crate::analyze::scoring::ENTERPRISE_GRADE_THRESHOLD, 0.4);
    }
}
