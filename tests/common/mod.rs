// tests/common/mod.rs
// Shared in-memory providers and builders for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use esg_news_aggregator::ingest::canonical_url;
use esg_news_aggregator::source_weights::ProviderWeights;
use esg_news_aggregator::{Article, ArticleProvider, ProviderError, ProviderId};

pub fn article(provider: ProviderId, title: &str, body: &str, url: &str) -> Article {
    Article {
        title: title.to_string(),
        description: body.chars().take(300).collect(),
        body_text: body.to_string(),
        url: url.to_string(),
        canonical_url: canonical_url(url),
        source_name: provider.display_name().to_string(),
        provider,
        published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        image_url: None,
        credibility: ProviderWeights::default_seed().credibility_for(provider),
    }
}

/// Returns a fixed list and counts invocations.
pub struct StaticProvider {
    pub id: ProviderId,
    pub articles: Vec<Article>,
    pub calls: Arc<AtomicUsize>,
}

impl StaticProvider {
    pub fn new(id: ProviderId, articles: Vec<Article>) -> Self {
        Self {
            id,
            articles,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ArticleProvider for StaticProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn fetch(&self, _topic: &str) -> Result<Vec<Article>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.articles.clone())
    }
}

/// Always fails with `ProviderUnavailable`.
pub struct FailingProvider {
    pub id: ProviderId,
    pub calls: Arc<AtomicUsize>,
}

impl FailingProvider {
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ArticleProvider for FailingProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn fetch(&self, _topic: &str) -> Result<Vec<Article>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::unavailable(self.id, "http status 503 Service Unavailable"))
    }
}

/// Sleeps past its own timeout.
pub struct SlowProvider {
    pub id: ProviderId,
    pub delay: Duration,
    pub limit: Duration,
}

#[async_trait]
impl ArticleProvider for SlowProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn timeout(&self) -> Duration {
        self.limit
    }

    async fn fetch(&self, _topic: &str) -> Result<Vec<Article>, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}

/// Panics inside its task; the coordinator must contain it.
pub struct PanickingProvider(pub ProviderId);

#[async_trait]
impl ArticleProvider for PanickingProvider {
    fn id(&self) -> ProviderId {
        self.0
    }

    async fn fetch(&self, _topic: &str) -> Result<Vec<Article>, ProviderError> {
        panic!("adapter bug");
    }
}
