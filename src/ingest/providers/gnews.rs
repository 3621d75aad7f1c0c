// src/ingest/providers/gnews.rs
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

use super::{log_outcome, ProviderClient, RawArticle};
use crate::error::ProviderError;
use crate::ingest::types::{Article, ArticleProvider, ProviderId};

pub const DEFAULT_BASE_URL: &str = "https://gnews.io";
const MAX_RESULTS: usize = 10;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    articles: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    source: Option<Source>,
    published_at: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Source {
    name: Option<String>,
}

/// GNews.io search. No date filter: GNews yields too little with one.
pub struct GNewsProvider {
    client: ProviderClient,
}

impl GNewsProvider {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    fn params(&self, topic: &str) -> Vec<(&'static str, String)> {
        vec![
            (
                "q",
                format!("{topic} sustainability OR ESG OR chemical OR petrochemical"),
            ),
            ("token", self.client.api_key().to_string()),
            ("lang", "en".into()),
            ("country", "us,gb,ae,sg".into()),
            ("max", MAX_RESULTS.to_string()),
            ("sortby", "relevance".into()),
        ]
    }

    async fn fetch_inner(&self, topic: &str) -> Result<Vec<Article>, ProviderError> {
        let env: Envelope = self
            .client
            .get_json("/api/v4/search", &self.params(topic))
            .await?;
        let now = Utc::now();

        Ok(env
            .articles
            .iter()
            .filter_map(|it| {
                self.client.build_article(
                    RawArticle {
                        title: it.title.as_deref(),
                        description: it.description.as_deref(),
                        body: it.content.as_deref(),
                        url: it.url.as_deref(),
                        source_name: it.source.as_ref().and_then(|s| s.name.as_deref()),
                        published_at: it.published_at.as_deref(),
                        image_url: it.image.as_deref(),
                    },
                    now,
                )
            })
            .collect())
    }
}

#[async_trait]
impl ArticleProvider for GNewsProvider {
    fn id(&self) -> ProviderId {
        ProviderId::GNews
    }

    fn timeout(&self) -> Duration {
        self.client.endpoint().timeout
    }

    async fn fetch(&self, topic: &str) -> Result<Vec<Article>, ProviderError> {
        let outcome = self.fetch_inner(topic).await;
        log_outcome(self.id(), &outcome);
        outcome
    }
}
