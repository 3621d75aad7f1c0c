// src/ingest/providers/nyt.rs
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

use super::{log_outcome, ProviderClient, RawArticle};
use crate::error::ProviderError;
use crate::ingest::date_days_ago;
use crate::ingest::types::{Article, ArticleProvider, ProviderId};

pub const DEFAULT_BASE_URL: &str = "https://api.nytimes.com";
const SEARCH_PATH: &str = "/svc/search/v2/articlesearch.json";
const MAX_DOCS: usize = 8;
const LOOKBACK_DAYS: i64 = 30;
const IMAGE_HOST: &str = "https://www.nytimes.com/";

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Option<Body>,
}

#[derive(Debug, Deserialize)]
struct Body {
    #[serde(default)]
    docs: Vec<Doc>,
}

#[derive(Debug, Deserialize)]
struct Doc {
    headline: Option<Headline>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    lead_paragraph: Option<String>,
    web_url: Option<String>,
    pub_date: Option<String>,
    #[serde(default)]
    multimedia: Vec<Media>,
}

#[derive(Debug, Deserialize)]
struct Headline {
    main: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Media {
    url: Option<String>,
}

/// New York Times article search; business and regulation coverage.
pub struct NytProvider {
    client: ProviderClient,
}

impl NytProvider {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    fn params(&self, topic: &str) -> Vec<(&'static str, String)> {
        let now = Utc::now();
        vec![
            (
                "q",
                format!("{topic} AND (business OR environment OR regulation)"),
            ),
            ("api-key", self.client.api_key().to_string()),
            ("sort", "relevance".into()),
            ("page", "0".into()),
            ("begin_date", date_days_ago(now, LOOKBACK_DAYS, "%Y%m%d")),
            ("end_date", date_days_ago(now, 0, "%Y%m%d")),
        ]
    }

    async fn fetch_inner(&self, topic: &str) -> Result<Vec<Article>, ProviderError> {
        let env: Envelope = self.client.get_json(SEARCH_PATH, &self.params(topic)).await?;
        let now = Utc::now();

        let docs = env.response.map(|b| b.docs).unwrap_or_default();
        Ok(docs
            .iter()
            .take(MAX_DOCS)
            .filter_map(|d| {
                let image = d
                    .multimedia
                    .first()
                    .and_then(|m| m.url.as_deref())
                    .filter(|u| !u.trim().is_empty())
                    .map(|u| format!("{IMAGE_HOST}{}", u.trim_start_matches('/')));
                self.client.build_article(
                    RawArticle {
                        title: d.headline.as_ref().and_then(|h| h.main.as_deref()),
                        description: d
                            .abstract_text
                            .as_deref()
                            .filter(|s| !s.trim().is_empty())
                            .or(d.lead_paragraph.as_deref()),
                        body: d.lead_paragraph.as_deref(),
                        url: d.web_url.as_deref(),
                        source_name: Some(ProviderId::Nyt.display_name()),
                        published_at: d.pub_date.as_deref(),
                        image_url: image.as_deref(),
                    },
                    now,
                )
            })
            .collect())
    }
}

#[async_trait]
impl ArticleProvider for NytProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Nyt
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
