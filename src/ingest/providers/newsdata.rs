// src/ingest/providers/newsdata.rs
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

use super::{log_outcome, ProviderClient, RawArticle};
use crate::error::ProviderError;
use crate::ingest::types::{Article, ArticleProvider, ProviderId};

pub const DEFAULT_BASE_URL: &str = "https://newsdata.io";
const PAGE_SIZE: usize = 8;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    results: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    link: Option<String>,
    source_id: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    image_url: Option<String>,
}

/// NewsData.io latest-news endpoint; international coverage.
pub struct NewsDataProvider {
    client: ProviderClient,
}

impl NewsDataProvider {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    fn params(&self, topic: &str) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", self.client.api_key().to_string()),
            ("q", topic.to_string()),
            ("language", "en".into()),
            ("category", "business,environment".into()),
            ("size", PAGE_SIZE.to_string()),
        ]
    }

    async fn fetch_inner(&self, topic: &str) -> Result<Vec<Article>, ProviderError> {
        let env: Envelope = self.client.get_json("/api/1/news", &self.params(topic)).await?;
        let now = Utc::now();

        Ok(env
            .results
            .iter()
            .filter_map(|it| {
                self.client.build_article(
                    RawArticle {
                        title: it.title.as_deref(),
                        description: it.description.as_deref(),
                        body: it.content.as_deref(),
                        url: it.link.as_deref(),
                        source_name: it.source_id.as_deref(),
                        published_at: it.pub_date.as_deref(),
                        image_url: it.image_url.as_deref(),
                    },
                    now,
                )
            })
            .collect())
    }
}

#[async_trait]
impl ArticleProvider for NewsDataProvider {
    fn id(&self) -> ProviderId {
        ProviderId::NewsData
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
