// src/ingest/providers/newsapi.rs
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

use super::{log_outcome, ProviderClient, RawArticle};
use crate::error::ProviderError;
use crate::ingest::date_days_ago;
use crate::ingest::types::{Article, ArticleProvider, ProviderId};

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const PAGE_SIZE: usize = 12;
const LOOKBACK_DAYS: i64 = 21;

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
    url_to_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Source {
    name: Option<String>,
}

/// NewsAPI.org `everything` endpoint; broad publisher coverage.
pub struct NewsApiProvider {
    client: ProviderClient,
}

impl NewsApiProvider {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    fn params(&self, topic: &str) -> Vec<(&'static str, String)> {
        vec![
            (
                "q",
                format!("{topic} AND (petrochemical OR chemical OR sustainability OR ESG)"),
            ),
            ("apiKey", self.client.api_key().to_string()),
            ("sortBy", "relevance".into()),
            ("pageSize", PAGE_SIZE.to_string()),
            ("language", "en".into()),
            ("from", date_days_ago(Utc::now(), LOOKBACK_DAYS, "%Y-%m-%d")),
        ]
    }

    async fn fetch_inner(&self, topic: &str) -> Result<Vec<Article>, ProviderError> {
        let env: Envelope = self
            .client
            .get_json("/v2/everything", &self.params(topic))
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
                        image_url: it.url_to_image.as_deref(),
                    },
                    now,
                )
            })
            .collect())
    }
}

#[async_trait]
impl ArticleProvider for NewsApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::NewsApi
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
