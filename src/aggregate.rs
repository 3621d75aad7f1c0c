// src/aggregate.rs
//! Fan-out coordinator.
//!
//! One aggregation call:
//! 1) validate the query (`QueryContext`)
//! 2) spawn every provider concurrently, each under its own timeout
//! 3) join in configured order; failures are captured per provider
//! 4) dedupe → score → select → summarize
//!
//! Only `AllProvidersFailed` escalates; partial provider failure never does.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyze::{
    dedupe, select, summarize, AggregationStats, ProviderSummary, ScoredArticle, Scorer,
    MIN_RELEVANCE_SCORE,
};
use crate::config::{AggregatorConfig, DEFAULT_MAX_COUNT, DEFAULT_TARGET_COUNT};
use crate::error::{AggregateError, ProviderError, ProviderFailure};
use crate::ingest::providers::build_http_providers;
use crate::ingest::types::{Article, ArticleProvider, ProviderId, ProviderResult};
use crate::quota::QuotaTracker;
use crate::telemetry::anon_hash;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("aggregate_requests_total", "Aggregation calls started.");
        describe_counter!(
            "aggregate_failures_total",
            "Aggregation calls where every provider failed."
        );
        describe_counter!("provider_requests_total", "Outbound provider requests past the quota gate.");
        describe_counter!("provider_errors_total", "Provider failures by kind.");
        describe_counter!(
            "aggregate_raw_articles_total",
            "Articles collected before deduplication."
        );
        describe_counter!(
            "aggregate_dedup_dropped_total",
            "Articles removed as URL or title duplicates."
        );
        describe_gauge!("aggregate_final_articles", "Size of the last final selection.");
        describe_histogram!("aggregate_duration_ms", "End-to-end aggregation time in milliseconds.");
        describe_histogram!("provider_fetch_ms", "Provider round-trip time in milliseconds.");
        describe_counter!("quota_resets_total", "Daily quota resets performed.");
    });
}

/// Validated input of one aggregation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    topic: String,
    target_count: usize,
    max_count: usize,
}

impl QueryContext {
    /// Trims the topic; rejects an empty topic or zero counts.
    /// A target above the cap is lowered to the cap.
    pub fn new(topic: &str, target_count: usize, max_count: usize) -> Result<Self, AggregateError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AggregateError::InvalidQuery("topic must not be empty".into()));
        }
        if max_count == 0 {
            return Err(AggregateError::InvalidQuery("max_count must be > 0".into()));
        }
        if target_count == 0 {
            return Err(AggregateError::InvalidQuery("target_count must be > 0".into()));
        }
        Ok(Self {
            topic: topic.to_string(),
            target_count: target_count.min(max_count),
            max_count,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }
}

/// Optional per-call overrides of the aggregator's default counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AggregateOptions {
    pub target_count: Option<usize>,
    pub max_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregationResult {
    pub articles: Vec<ScoredArticle>,
    pub stats: AggregationStats,
    pub provider_results: Vec<ProviderSummary>,
    pub processing_ms: u64,
}

/// Holds the configured providers (in collection order), the shared quota
/// tracker and the scorer.
pub struct Aggregator {
    providers: Vec<Arc<dyn ArticleProvider>>,
    quota: Arc<QuotaTracker>,
    scorer: Scorer,
    default_target: usize,
    default_max: usize,
}

impl Aggregator {
    pub fn new(providers: Vec<Arc<dyn ArticleProvider>>, quota: Arc<QuotaTracker>, scorer: Scorer) -> Self {
        Self {
            providers,
            quota,
            scorer,
            default_target: DEFAULT_TARGET_COUNT,
            default_max: DEFAULT_MAX_COUNT,
        }
    }

    pub fn with_default_counts(mut self, target_count: usize, max_count: usize) -> Self {
        self.default_target = target_count;
        self.default_max = max_count;
        self
    }

    /// HTTP adapters, quota ceilings, weights and keywords all from config.
    pub fn from_config(cfg: &AggregatorConfig) -> Self {
        let quota = Arc::new(cfg.quota_tracker());
        let providers = build_http_providers(cfg, &quota);
        if providers.is_empty() {
            warn!(target: "aggregate", "no providers configured; every call will fail");
        }
        let scorer = Scorer::new(cfg.keywords.clone(), cfg.provider_weights());
        Self::new(providers, quota, scorer).with_default_counts(cfg.target_count, cfg.max_count)
    }

    pub fn quota(&self) -> &Arc<QuotaTracker> {
        &self.quota
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Build a [`QueryContext`] from defaults + overrides and run it.
    pub async fn aggregate_topic(
        &self,
        topic: &str,
        options: AggregateOptions,
    ) -> Result<AggregationResult, AggregateError> {
        let max_count = options.max_count.unwrap_or(self.default_max);
        let target_count = options.target_count.unwrap_or(self.default_target);
        let ctx = QueryContext::new(topic, target_count, max_count)?;
        self.aggregate(&ctx).await
    }

    pub async fn aggregate(&self, ctx: &QueryContext) -> Result<AggregationResult, AggregateError> {
        ensure_metrics_described();
        counter!("aggregate_requests_total").increment(1);

        if self.providers.is_empty() {
            return Err(AggregateError::NoProvidersConfigured);
        }

        let t0 = Instant::now();
        let query = anon_hash(ctx.topic());

        let results = self.fan_out(ctx.topic()).await;
        let provider_results: Vec<ProviderSummary> = results.iter().map(ProviderSummary::from).collect();

        if results.iter().all(ProviderResult::is_err) {
            counter!("aggregate_failures_total").increment(1);
            let failures: Vec<ProviderFailure> = results
                .iter()
                .filter_map(|r| r.error.as_ref())
                .map(ProviderFailure::from)
                .collect();
            warn!(target: "aggregate", %query, providers = failures.len(), "all providers failed");
            return Err(AggregateError::AllProvidersFailed(failures));
        }

        let collected: Vec<Article> = results.into_iter().flat_map(|r| r.articles).collect();
        let raw_count = collected.len();
        let unique = dedupe(collected);
        let dropped = raw_count - unique.len();

        let scored = self.scorer.score_all(unique, ctx.topic());
        let articles = select(scored, MIN_RELEVANCE_SCORE, ctx.max_count());
        let stats = summarize(&articles, &provider_results, ctx.target_count());

        let processing_ms = t0.elapsed().as_millis() as u64;
        counter!("aggregate_raw_articles_total").increment(raw_count as u64);
        counter!("aggregate_dedup_dropped_total").increment(dropped as u64);
        gauge!("aggregate_final_articles").set(articles.len() as f64);
        histogram!("aggregate_duration_ms").record(processing_ms as f64);

        info!(
            target: "aggregate",
            %query,
            raw = raw_count,
            dropped,
            selected = articles.len(),
            diversity = stats.diversity_score,
            quality = stats.quality_score,
            meets_target = stats.meets_target,
            ms = processing_ms,
            "aggregation complete"
        );

        Ok(AggregationResult {
            articles,
            stats,
            provider_results,
            processing_ms,
        })
    }

    /// Run every provider concurrently; results come back in configured order.
    async fn fan_out(&self, topic: &str) -> Vec<ProviderResult> {
        let handles: Vec<_> = self
            .providers
            .iter()
            .map(|p| {
                let provider = Arc::clone(p);
                let topic = topic.to_string();
                let id = provider.id();
                let limit = provider.timeout();
                let handle = tokio::spawn(async move {
                    match tokio::time::timeout(limit, provider.fetch(&topic)).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(ProviderError::unavailable(
                            id,
                            format!("timed out after {}ms", limit.as_millis()),
                        )),
                    }
                });
                (id, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(ProviderError::unavailable(id, format!("provider task failed: {e}"))),
            };
            match outcome {
                Ok(articles) => {
                    info!(target: "aggregate", provider = %id, count = articles.len(), "provider ok");
                    results.push(ProviderResult::ok(id, articles));
                }
                Err(e) => {
                    counter!("provider_errors_total", "provider" => id.as_str(), "kind" => e.kind())
                        .increment(1);
                    warn!(target: "aggregate", provider = %id, kind = e.kind(), error = %e, "provider failed");
                    results.push(ProviderResult::failed(id, e));
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_context_trims_and_validates() {
        let ctx = QueryContext::new("  carbon tax \n", 18, 25).unwrap();
        assert_eq!(ctx.topic(), "carbon tax");
        assert_eq!((ctx.target_count(), ctx.max_count()), (18, 25));

        assert!(matches!(
            QueryContext::new("   ", 18, 25),
            Err(AggregateError::InvalidQuery(_))
        ));
        assert!(QueryContext::new("x", 0, 25).is_err());
        assert!(QueryContext::new("x", 5, 0).is_err());
    }

    #[test]
    fn target_is_lowered_to_cap() {
        let ctx = QueryContext::new("esg", 40, 10).unwrap();
        assert_eq!(ctx.target_count(), 10);
    }

    #[tokio::test]
    async fn no_providers_is_an_error() {
        let agg = Aggregator::new(Vec::new(), Arc::new(QuotaTracker::new()), Scorer::default());
        let ctx = QueryContext::new("esg", 5, 5).unwrap();
        assert!(matches!(
            agg.aggregate(&ctx).await,
            Err(AggregateError::NoProvidersConfigured)
        ));
    }

    #[tokio::test]
    async fn options_fall_back_to_defaults() {
        let agg = Aggregator::new(Vec::new(), Arc::new(QuotaTracker::new()), Scorer::default())
            .with_default_counts(3, 4);
        // empty topic fails validation before the provider check
        let err = agg
            .aggregate_topic(" ", AggregateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AggregateError::InvalidQuery(_)));
    }
}
