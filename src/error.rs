//! Error taxonomy for the aggregation core.
//!
//! Provider-level errors are recorded per provider and never escalated on
//! their own; only [`AggregateError`] ever reaches the caller.

use serde::Serialize;

use crate::ingest::types::ProviderId;

/// Failure of a single provider adapter invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider's daily ceiling is exhausted; no network call was made.
    #[error("{provider}: daily quota exceeded")]
    QuotaExceeded { provider: ProviderId },

    /// Transport error, timeout, non-2xx status or undecodable payload.
    #[error("{provider}: provider unavailable: {message}")]
    ProviderUnavailable { provider: ProviderId, message: String },
}

impl ProviderError {
    pub fn unavailable(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider,
            message: message.into(),
        }
    }

    pub fn provider(&self) -> ProviderId {
        match self {
            Self::QuotaExceeded { provider } | Self::ProviderUnavailable { provider, .. } => {
                *provider
            }
        }
    }

    /// Short label used for metrics and JSON diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
        }
    }
}

/// One entry of [`AggregateError::AllProvidersFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub kind: &'static str,
    pub message: String,
}

impl From<&ProviderError> for ProviderFailure {
    fn from(e: &ProviderError) -> Self {
        Self {
            provider: e.provider(),
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Errors surfaced by the fan-out coordinator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregateError {
    /// Precondition violation (empty topic, zero caps); raised before any provider runs.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("no providers configured")]
    NoProvidersConfigured,

    /// Every configured provider returned an error.
    #[error("all providers failed: {}", summarize(.0))]
    AllProvidersFailed(Vec<ProviderFailure>),
}

fn summarize(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
