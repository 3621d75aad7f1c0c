//! # Source Weights
//!
//! Static trust/priority matrix for the configured content providers.
//!
//! - `credibility` is stamped onto every article an adapter produces.
//! - `priority` is the provider's ranking weight, looked up at scoring time.
//! - Provider names are resolved case-insensitively with punctuation, dashes
//!   and a leading "the" normalized away, plus a small alias table
//!   (e.g. "New York Times" → `nyt`, "newsapi.org" → `newsapi`).
//!
//! Both values are clamped to `[0.0, 1.0]`.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::ingest::types::ProviderId;

/// Priority used when a provider has no entry in the matrix.
pub const DEFAULT_PRIORITY_WEIGHT: f32 = 0.5;
/// Credibility used when a provider has no entry in the matrix.
pub const DEFAULT_CREDIBILITY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ProviderProfile {
    pub priority: f32,
    pub credibility: f32,
}

/// Provider → profile table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderWeights {
    profiles: BTreeMap<ProviderId, ProviderProfile>,
}

impl Default for ProviderWeights {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl ProviderWeights {
    pub fn empty() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    /// Built-in matrix: Guardian and NYT as premium sources, the aggregators below.
    pub fn default_seed() -> Self {
        let mut profiles = BTreeMap::new();
        for (id, priority, credibility) in [
            (ProviderId::Guardian, 0.95, 0.95),
            (ProviderId::Nyt, 0.92, 0.92),
            (ProviderId::NewsApi, 0.88, 0.85),
            (ProviderId::GNews, 0.82, 0.80),
            (ProviderId::NewsData, 0.78, 0.75),
        ] {
            profiles.insert(
                id,
                ProviderProfile {
                    priority,
                    credibility,
                },
            );
        }
        Self { profiles }
    }

    pub fn set(&mut self, provider: ProviderId, profile: ProviderProfile) {
        self.profiles.insert(
            provider,
            ProviderProfile {
                priority: clamp01(profile.priority),
                credibility: clamp01(profile.credibility),
            },
        );
    }

    pub fn priority_for(&self, provider: ProviderId) -> f32 {
        self.profiles
            .get(&provider)
            .map(|p| clamp01(p.priority))
            .unwrap_or(DEFAULT_PRIORITY_WEIGHT)
    }

    pub fn credibility_for(&self, provider: ProviderId) -> f32 {
        self.profiles
            .get(&provider)
            .map(|p| clamp01(p.credibility))
            .unwrap_or(DEFAULT_CREDIBILITY)
    }
}

/// Resolve a free-form provider name to a [`ProviderId`].
///
/// Steps: normalize → alias table → canonical names.
pub fn resolve_provider(name: &str) -> Option<ProviderId> {
    let s = normalize(name);
    let s = s.strip_prefix("the ").unwrap_or(&s);

    let alias = match s {
        "guardian" | "guardian api" | "theguardian" | "guardian co uk" => {
            Some(ProviderId::Guardian)
        }
        "nyt" | "nytimes" | "new york times" | "ny times" => Some(ProviderId::Nyt),
        "newsapi" | "news api" | "newsapi org" => Some(ProviderId::NewsApi),
        "gnews" | "g news" | "gnews io" => Some(ProviderId::GNews),
        "newsdata" | "news data" | "newsdata io" => Some(ProviderId::NewsData),
        _ => None,
    };
    if alias.is_some() {
        return alias;
    }

    ProviderId::ALL.into_iter().find(|id| id.as_str() == s)
}

/// Lowercase, replace punctuation/dashes with spaces, collapse whitespace.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_ascii_lowercase();

    for ch in ['—', '–', '-', '_', '/', '\\'] {
        out = out.replace(ch, " ");
    }
    out = out.replace(['\n', '\r', '\t', '.', ',', '’', '\''], " ");

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clamp to [0.0, 1.0]; NaN collapses to 0.
pub(crate) fn clamp01(x: f32) -> f32 {
    if x.is_nan() || x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}
