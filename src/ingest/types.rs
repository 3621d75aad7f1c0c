// src/ingest/types.rs
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Default per-call timeout for provider adapters.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Content-search providers known to the aggregator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Guardian,
    Nyt,
    NewsApi,
    GNews,
    NewsData,
}

impl ProviderId {
    /// Fixed collection order; dedup first-seen-wins and rank tie-breaks depend on it.
    pub const ALL: [ProviderId; 5] = [
        ProviderId::Guardian,
        ProviderId::Nyt,
        ProviderId::NewsApi,
        ProviderId::GNews,
        ProviderId::NewsData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Guardian => "guardian",
            ProviderId::Nyt => "nyt",
            ProviderId::NewsApi => "newsapi",
            ProviderId::GNews => "gnews",
            ProviderId::NewsData => "newsdata",
        }
    }

    /// Human-readable publisher name, used when the payload carries none.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Guardian => "The Guardian",
            ProviderId::Nyt => "The New York Times",
            ProviderId::NewsApi => "NewsAPI",
            ProviderId::GNews => "GNews",
            ProviderId::NewsData => "NewsData",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::source_weights::resolve_provider(s).ok_or_else(|| format!("unknown provider `{s}`"))
    }
}

/// Normalized article as produced by every adapter.
///
/// All fields are total: adapters substitute sentinels for anything the
/// provider payload leaves out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Short excerpt for display (falls back to "No description").
    pub description: String,
    /// Body excerpt used for scoring.
    pub body_text: String,
    /// URL as returned by the provider.
    pub url: String,
    /// Dedup identity key; empty means "always unique".
    pub canonical_url: String,
    pub source_name: String,
    pub provider: ProviderId,
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Static per-provider trust weight in [0,1].
    pub credibility: f32,
}

/// Outcome of one adapter invocation.
#[derive(Debug, Clone)]
pub struct ProviderResult {
    pub provider: ProviderId,
    pub articles: Vec<Article>,
    pub error: Option<ProviderError>,
    pub raw_count: usize,
}

impl ProviderResult {
    pub fn ok(provider: ProviderId, articles: Vec<Article>) -> Self {
        let raw_count = articles.len();
        Self {
            provider,
            articles,
            error: None,
            raw_count,
        }
    }

    pub fn failed(provider: ProviderId, error: ProviderError) -> Self {
        Self {
            provider,
            articles: Vec::new(),
            error: Some(error),
            raw_count: 0,
        }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// A content-search provider adapter.
///
/// Implementations gate on the quota tracker before any network call and
/// never retry internally.
#[async_trait::async_trait]
pub trait ArticleProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Upper bound the coordinator enforces around [`ArticleProvider::fetch`].
    fn timeout(&self) -> Duration {
        DEFAULT_PROVIDER_TIMEOUT
    }

    async fn fetch(&self, topic: &str) -> Result<Vec<Article>, ProviderError>;
}
