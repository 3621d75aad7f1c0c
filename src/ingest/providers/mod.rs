//! Concrete provider adapters and the HTTP plumbing they share.
//!
//! Every adapter follows the same sequence:
//! 1. `quota.try_acquire(id)`; on exhaustion return `QuotaExceeded` without touching the network
//! 2. one GET with provider-shaped query parameters and the provider's timeout
//! 3. decode into a schema with every field optional, then normalize into [`Article`]s
//!
//! No retries happen here.

pub mod gnews;
pub mod guardian;
pub mod newsapi;
pub mod newsdata;
pub mod nyt;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::ingest::types::{Article, ArticleProvider, ProviderId, DEFAULT_PROVIDER_TIMEOUT};
use crate::ingest::{
    canonical_url, normalize_opt, parse_timestamp, truncate_chars, MAX_DESCRIPTION_CHARS,
    NO_DESCRIPTION, UNKNOWN_SOURCE,
};
use crate::quota::QuotaTracker;

pub use gnews::GNewsProvider;
pub use guardian::GuardianProvider;
pub use newsapi::NewsApiProvider;
pub use newsdata::NewsDataProvider;
pub use nyt::NytProvider;

/// Connection settings for one provider.
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub credibility: f32,
}

impl ProviderEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
            credibility: crate::source_weights::DEFAULT_CREDIBILITY,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credibility(mut self, credibility: f32) -> Self {
        self.credibility = crate::source_weights::clamp01(credibility);
        self
    }
}

/// Quota-gated JSON client shared by the concrete adapters.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    id: ProviderId,
    endpoint: ProviderEndpoint,
    http: reqwest::Client,
    quota: Arc<QuotaTracker>,
}

impl ProviderClient {
    pub fn new(id: ProviderId, endpoint: ProviderEndpoint, quota: Arc<QuotaTracker>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "provider", provider = %id, error = %e, "falling back to default http client");
                reqwest::Client::new()
            });
        Self {
            id,
            endpoint,
            http,
            quota,
        }
    }

    pub fn endpoint(&self) -> &ProviderEndpoint {
        &self.endpoint
    }

    pub fn api_key(&self) -> &str {
        &self.endpoint.api_key
    }

    /// Gate on quota, GET `{base_url}{path}` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        self.quota.try_acquire(self.id)?;
        counter!("provider_requests_total", "provider" => self.id.as_str()).increment(1);

        let url = format!("{}{}", self.endpoint.base_url.trim_end_matches('/'), path);
        let t0 = Instant::now();

        let resp = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.unavailable(describe_reqwest_error(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("http status {status}")));
        }

        let body = resp
            .json::<T>()
            .await
            .map_err(|e| self.unavailable(format!("malformed payload: {e}")))?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("provider_fetch_ms", "provider" => self.id.as_str()).record(ms);
        Ok(body)
    }

    fn unavailable(&self, message: String) -> ProviderError {
        ProviderError::unavailable(self.id, message)
    }

    /// Assemble an [`Article`] from raw optional fields with sentinel defaults.
    ///
    /// Returns `None` if the title normalizes to nothing.
    pub fn build_article(&self, raw: RawArticle<'_>, now: DateTime<Utc>) -> Option<Article> {
        let title = normalize_opt(raw.title)?;
        let description = normalize_opt(raw.description)
            .map(|d| truncate_chars(d, MAX_DESCRIPTION_CHARS))
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());
        let body_text = normalize_opt(raw.body)
            .or_else(|| normalize_opt(raw.description))
            .unwrap_or_default();
        let url = raw.url.map(str::trim).unwrap_or_default().to_string();
        let source_name = normalize_opt(raw.source_name).unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        Some(Article {
            title,
            description,
            body_text,
            canonical_url: canonical_url(&url),
            url,
            source_name,
            provider: self.id,
            published_at: parse_timestamp(raw.published_at, now),
            image_url: raw
                .image_url
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            credibility: self.endpoint.credibility,
        })
    }
}

/// Borrowed view over one provider item before normalization.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawArticle<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub body: Option<&'a str>,
    pub url: Option<&'a str>,
    pub source_name: Option<&'a str>,
    pub published_at: Option<&'a str>,
    pub image_url: Option<&'a str>,
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timeout: {e}")
    } else if e.is_connect() {
        format!("connect: {e}")
    } else {
        e.to_string()
    }
}

/// Log and count the outcome of one adapter call.
pub(crate) fn log_outcome(id: ProviderId, outcome: &Result<Vec<Article>, ProviderError>) {
    match outcome {
        Ok(articles) => {
            tracing::debug!(target: "provider", provider = %id, count = articles.len(), "provider returned articles");
        }
        Err(e) => {
            tracing::warn!(target: "provider", provider = %id, error = %e, "provider call failed");
        }
    }
}

/// Build the five HTTP adapters in configured order from the loaded config.
///
/// Providers that are disabled or lack an API key are skipped.
pub fn build_http_providers(
    cfg: &crate::config::AggregatorConfig,
    quota: &Arc<QuotaTracker>,
) -> Vec<Arc<dyn ArticleProvider>> {
    let mut out: Vec<Arc<dyn ArticleProvider>> = Vec::new();
    for id in ProviderId::ALL {
        let Some(endpoint) = cfg.endpoint_for(id) else {
            continue;
        };
        let client = ProviderClient::new(id, endpoint, Arc::clone(quota));
        let provider: Arc<dyn ArticleProvider> = match id {
            ProviderId::Guardian => Arc::new(GuardianProvider::new(client)),
            ProviderId::Nyt => Arc::new(NytProvider::new(client)),
            ProviderId::NewsApi => Arc::new(NewsApiProvider::new(client)),
            ProviderId::GNews => Arc::new(GNewsProvider::new(client)),
            ProviderId::NewsData => Arc::new(NewsDataProvider::new(client)),
        };
        out.push(provider);
    }
    out
}
