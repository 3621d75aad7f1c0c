// src/ingest/providers/guardian.rs
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

use super::{log_outcome, ProviderClient, RawArticle};
use crate::error::ProviderError;
use crate::ingest::date_days_ago;
use crate::ingest::types::{Article, ArticleProvider, ProviderId};

pub const DEFAULT_BASE_URL: &str = "https://content.guardianapis.com";
const PAGE_SIZE: usize = 10;
const LOOKBACK_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Option<Body>,
}

#[derive(Debug, Deserialize)]
struct Body {
    #[serde(default)]
    results: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    web_title: Option<String>,
    web_url: Option<String>,
    web_publication_date: Option<String>,
    fields: Option<Fields>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fields {
    body: Option<String>,
    short_url: Option<String>,
    thumbnail: Option<String>,
}

/// The Guardian content API; premium ESG coverage.
pub struct GuardianProvider {
    client: ProviderClient,
}

impl GuardianProvider {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    fn params(&self, topic: &str) -> Vec<(&'static str, String)> {
        vec![
            (
                "q",
                format!("{topic} AND (sustainability OR ESG OR environment OR climate)"),
            ),
            ("api-key", self.client.api_key().to_string()),
            ("page-size", PAGE_SIZE.to_string()),
            ("order-by", "relevance".into()),
            ("section", "business|environment|world".into()),
            ("show-fields", "headline,body,thumbnail,short-url".into()),
            (
                "from-date",
                date_days_ago(Utc::now(), LOOKBACK_DAYS, "%Y-%m-%d"),
            ),
        ]
    }

    async fn fetch_inner(&self, topic: &str) -> Result<Vec<Article>, ProviderError> {
        let env: Envelope = self.client.get_json("/search", &self.params(topic)).await?;
        let now = Utc::now();

        let items = env.response.map(|b| b.results).unwrap_or_default();
        Ok(items
            .iter()
            .filter_map(|it| {
                let fields = it.fields.as_ref();
                let body = fields.and_then(|f| f.body.as_deref());
                self.client.build_article(
                    RawArticle {
                        title: it.web_title.as_deref(),
                        description: body,
                        body,
                        url: fields
                            .and_then(|f| f.short_url.as_deref())
                            .or(it.web_url.as_deref()),
                        source_name: Some(ProviderId::Guardian.display_name()),
                        published_at: it.web_publication_date.as_deref(),
                        image_url: fields.and_then(|f| f.thumbnail.as_deref()),
                    },
                    now,
                )
            })
            .collect())
    }
}

#[async_trait]
impl ArticleProvider for GuardianProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Guardian
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
