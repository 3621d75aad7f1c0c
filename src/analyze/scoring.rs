//! Relevance/quality scoring.
//!
//! Sub-scores over `lowercase(title + " " + body_text)`:
//! - `relevance` : +0.12 per topic term (len > 2) found, clamped to 1
//! - `domain`    : +0.08 per domain keyword found, clamped to 1
//! - `impact`    : +0.15 per high-value entity, +0.12 per secondary entity, clamped to 1
//!
//! Composite = 0.2 baseline + 0.25·relevance + 0.20·domain + 0.20·impact
//!           + 0.10·credibility + 0.05·provider priority, capped at 1.
//!
//! The baseline keeps lower-weighted providers in contention when they are
//! on topic. Weights are constants; only the keyword lists are configurable.

use serde::Serialize;

use super::keywords::KeywordLists;
use crate::ingest::types::Article;
use crate::source_weights::{clamp01, ProviderWeights};

pub const TOPIC_TERM_WEIGHT: f32 = 0.12;
pub const DOMAIN_KEYWORD_WEIGHT: f32 = 0.08;
pub const HIGH_VALUE_ENTITY_WEIGHT: f32 = 0.15;
pub const SECONDARY_ENTITY_WEIGHT: f32 = 0.12;

pub const BASELINE_SCORE: f32 = 0.2;
pub const W_RELEVANCE: f32 = 0.25;
pub const W_DOMAIN: f32 = 0.20;
pub const W_IMPACT: f32 = 0.20;
pub const W_CREDIBILITY: f32 = 0.10;
pub const W_PRIORITY: f32 = 0.05;

/// Articles above this composite count as "enterprise-grade" in diagnostics.
/// Empirically tuned; diagnostic only, never used for inclusion.
pub const ENTERPRISE_GRADE_THRESHOLD: f32 = 0.4;

/// Topic terms shorter than this (in chars) are ignored.
const MIN_TERM_CHARS: usize = 3;

/// An article plus its derived scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: Article,
    pub relevance_score: f32,
    pub domain_score: f32,
    pub impact_score: f32,
    pub composite_score: f32,
    pub enterprise_grade: bool,
}

/// Pure scorer over fixed keyword lists and the provider weight matrix.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    keywords: KeywordLists,
    weights: ProviderWeights,
}

impl Scorer {
    pub fn new(keywords: KeywordLists, weights: ProviderWeights) -> Self {
        Self {
            keywords: keywords.normalized(),
            weights,
        }
    }

    pub fn weights(&self) -> &ProviderWeights {
        &self.weights
    }

    pub fn score(&self, article: Article, topic: &str) -> ScoredArticle {
        let text = format!("{} {}", article.title, article.body_text).to_lowercase();

        let topic = topic.to_lowercase();
        let term_hits = topic
            .split_whitespace()
            .filter(|t| t.chars().count() >= MIN_TERM_CHARS && text.contains(*t))
            .count();
        let relevance = clamp01(term_hits as f32 * TOPIC_TERM_WEIGHT);

        let domain = clamp01(count_hits(&text, &self.keywords.domain) as f32 * DOMAIN_KEYWORD_WEIGHT);

        let impact = clamp01(
            count_hits(&text, &self.keywords.high_value) as f32 * HIGH_VALUE_ENTITY_WEIGHT
                + count_hits(&text, &self.keywords.secondary) as f32 * SECONDARY_ENTITY_WEIGHT,
        );

        let credibility = clamp01(article.credibility);
        let priority = self.weights.priority_for(article.provider);

        let composite = clamp01(
            BASELINE_SCORE
                + relevance * W_RELEVANCE
                + domain * W_DOMAIN
                + impact * W_IMPACT
                + credibility * W_CREDIBILITY
                + priority * W_PRIORITY,
        );

        ScoredArticle {
            article,
            relevance_score: relevance,
            domain_score: domain,
            impact_score: impact,
            composite_score: composite,
            enterprise_grade: composite > ENTERPRISE_GRADE_THRESHOLD,
        }
    }

    pub fn score_all(&self, articles: Vec<Article>, topic: &str) -> Vec<ScoredArticle> {
        articles.into_iter().map(|a| self.score(a, topic)).collect()
    }
}

/// Number of list entries present in `text` (each entry counts once).
fn count_hits(text: &str, list: &[String]) -> usize {
    list.iter().filter(|k| text.contains(k.as_str())).count()
}
