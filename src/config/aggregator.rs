// src/config/aggregator.rs
//! Aggregator configuration: TOML file + environment overrides.
//!
//! Resolution order for the file:
//! 1) `$AGGREGATOR_CONFIG_PATH` (must exist)
//! 2) `config/aggregator.toml` (optional)
//! 3) built-in defaults
//!
//! ```toml
//! [aggregation]
//! target_count = 18
//! max_count = 25
//!
//! [providers.guardian]
//! daily_limit = 1000
//! timeout_secs = 10
//! api_key = "ENV"            # read from api_key_env (default GUARDIAN_API_KEY)
//!
//! [keywords]
//! secondary = ["sabic", "basf"]
//! ```

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analyze::KeywordLists;
use crate::ingest::providers::{gnews, guardian, newsapi, newsdata, nyt, ProviderEndpoint};
use crate::ingest::types::ProviderId;
use crate::quota::QuotaTracker;
use crate::source_weights::{resolve_provider, ProviderProfile, ProviderWeights};

pub const ENV_CONFIG_PATH: &str = "AGGREGATOR_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/aggregator.toml";
pub const ENV_TARGET_COUNT: &str = "TARGET_ARTICLES_PER_QUERY";
pub const ENV_MAX_COUNT: &str = "MAX_ARTICLES_PER_QUERY";

pub const DEFAULT_TARGET_COUNT: usize = 18;
pub const DEFAULT_MAX_COUNT: usize = 25;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/* ----------------------------
File schema
---------------------------- */

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    aggregation: AggregationSection,
    #[serde(default)]
    providers: BTreeMap<String, ProviderSection>,
    #[serde(default)]
    keywords: KeywordLists,
}

#[derive(Debug, Default, Deserialize)]
struct AggregationSection {
    target_count: Option<usize>,
    max_count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderSection {
    enabled: Option<bool>,
    daily_limit: Option<u32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
    /// Literal key, or "ENV" to read `api_key_env`.
    api_key: Option<String>,
    api_key_env: Option<String>,
    priority_weight: Option<f32>,
    credibility: Option<f32>,
}

/* ----------------------------
Resolved config
---------------------------- */

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub enabled: bool,
    pub daily_limit: u32,
    pub timeout: Duration,
    pub base_url: String,
    pub api_key_env: String,
    /// Resolved credential; `None` leaves the provider unconfigured.
    pub api_key: Option<String>,
    pub priority_weight: f32,
    pub credibility: f32,
}

impl ProviderSettings {
    /// Built-in settings for a provider (no credential yet).
    pub fn defaults_for(id: ProviderId) -> Self {
        let seed = ProviderWeights::default_seed();
        let (base_url, api_key_env, daily_limit) = match id {
            ProviderId::Guardian => (guardian::DEFAULT_BASE_URL, "GUARDIAN_API_KEY", 1000),
            ProviderId::Nyt => (nyt::DEFAULT_BASE_URL, "NYT_API_KEY", 1000),
            ProviderId::NewsApi => (newsapi::DEFAULT_BASE_URL, "NEWSAPI_ORG_KEY", 100),
            ProviderId::GNews => (gnews::DEFAULT_BASE_URL, "GNEWS_API_KEY", 100),
            ProviderId::NewsData => (newsdata::DEFAULT_BASE_URL, "NEWSDATA_IO_KEY", 200),
        };
        Self {
            enabled: true,
            daily_limit,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_url: base_url.to_string(),
            api_key_env: api_key_env.to_string(),
            api_key: None,
            priority_weight: seed.priority_for(id),
            credibility: seed.credibility_for(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    pub target_count: usize,
    pub max_count: usize,
    pub providers: BTreeMap<ProviderId, ProviderSettings>,
    pub keywords: KeywordLists,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            max_count: DEFAULT_MAX_COUNT,
            providers: ProviderId::ALL
                .into_iter()
                .map(|id| (id, ProviderSettings::defaults_for(id)))
                .collect(),
            keywords: KeywordLists::default(),
        }
    }
}

impl AggregatorConfig {
    /// Load using `$AGGREGATOR_CONFIG_PATH`, then `config/aggregator.toml`, then defaults,
    /// resolving credentials and count overrides from the process environment.
    pub fn load_default() -> Result<Self> {
        let env = |k: &str| std::env::var(k).ok();

        let path = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
                }
                Some(pb)
            }
            Err(_) => Some(PathBuf::from(DEFAULT_CONFIG_PATH)).filter(|p| p.exists()),
        };

        let cfg = match path {
            Some(p) => Self::load_from_with_env(&p, &env)?,
            None => Self::from_toml_str_with_env("", &env)?,
        };
        tracing::info!(
            target: "config",
            providers = ?cfg.configured_providers(),
            target_count = cfg.target_count,
            max_count = cfg.max_count,
            "aggregator config loaded"
        );
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_from_with_env(path, &|k| std::env::var(k).ok())
    }

    fn load_from_with_env(path: &Path, env: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading aggregator config from {}", path.display()))?;
        Self::from_toml_str_with_env(&content, env)
            .with_context(|| format!("parsing aggregator config {}", path.display()))
    }

    /// Parse TOML and resolve against an explicit environment lookup.
    pub fn from_toml_str_with_env(s: &str, env: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let file: FileConfig = toml::from_str(s)?;
        let mut cfg = Self {
            keywords: file.keywords.normalized(),
            ..Self::default()
        };

        if let Some(t) = file.aggregation.target_count {
            cfg.target_count = t;
        }
        if let Some(m) = file.aggregation.max_count {
            cfg.max_count = m;
        }

        let mut sections: BTreeMap<ProviderId, ProviderSection> = BTreeMap::new();
        for (name, section) in file.providers {
            let id = resolve_provider(&name).ok_or_else(|| anyhow!("unknown provider `{name}`"))?;
            sections.insert(id, section);
        }

        for (id, settings) in cfg.providers.iter_mut() {
            let section = sections.remove(id).unwrap_or_default();
            apply_section(settings, section);
            settings.api_key = resolve_api_key(settings, env);
        }

        for (id, env_name) in cfg.missing_keys() {
            tracing::warn!(target: "config", provider = %id, env = %env_name, "no API key; provider not configured");
        }

        cfg.apply_count_overrides(env);
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_count_overrides(&mut self, env: &dyn Fn(&str) -> Option<String>) {
        if let Some(t) = parse_count(env(ENV_TARGET_COUNT)) {
            self.target_count = t;
        }
        if let Some(m) = parse_count(env(ENV_MAX_COUNT)) {
            self.max_count = m;
        }
    }

    fn validate(&mut self) -> Result<()> {
        if self.target_count == 0 || self.max_count == 0 {
            bail!("target_count and max_count must be > 0");
        }
        if self.target_count > self.max_count {
            tracing::warn!(
                target: "config",
                target_count = self.target_count,
                max_count = self.max_count,
                "target_count exceeds max_count; lowering target"
            );
            self.target_count = self.max_count;
        }
        Ok(())
    }

    /// Providers that are enabled and have a credential, in collection order.
    pub fn configured_providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.endpoint_for(*id).is_some())
            .collect()
    }

    /// Enabled providers without a credential, with the env var they read.
    pub fn missing_keys(&self) -> Vec<(ProviderId, &str)> {
        self.providers
            .iter()
            .filter(|(_, s)| s.enabled && s.api_key.is_none())
            .map(|(id, s)| (*id, s.api_key_env.as_str()))
            .collect()
    }

    /// Connection settings for a provider, or `None` when disabled / missing a key.
    pub fn endpoint_for(&self, id: ProviderId) -> Option<ProviderEndpoint> {
        let s = self.providers.get(&id)?;
        if !s.enabled {
            return None;
        }
        let key = s.api_key.as_deref()?;
        Some(
            ProviderEndpoint::new(s.base_url.clone(), key)
                .with_timeout(s.timeout)
                .with_credibility(s.credibility),
        )
    }

    pub fn quota_tracker(&self) -> QuotaTracker {
        QuotaTracker::with_limits(self.providers.iter().map(|(id, s)| (*id, s.daily_limit)))
    }

    pub fn provider_weights(&self) -> ProviderWeights {
        let mut w = ProviderWeights::empty();
        for (id, s) in &self.providers {
            w.set(
                *id,
                ProviderProfile {
                    priority: s.priority_weight,
                    credibility: s.credibility,
                },
            );
        }
        w
    }
}

fn apply_section(settings: &mut ProviderSettings, section: ProviderSection) {
    if let Some(v) = section.enabled {
        settings.enabled = v;
    }
    if let Some(v) = section.daily_limit {
        settings.daily_limit = v;
    }
    if let Some(v) = section.timeout_secs.filter(|s| *s > 0) {
        settings.timeout = Duration::from_secs(v);
    }
    if let Some(v) = section.base_url.filter(|s| !s.trim().is_empty()) {
        settings.base_url = v.trim().to_string();
    }
    if let Some(v) = section.api_key_env.filter(|s| !s.trim().is_empty()) {
        settings.api_key_env = v.trim().to_string();
    }
    if let Some(v) = section.priority_weight {
        settings.priority_weight = v.clamp(0.0, 1.0);
    }
    if let Some(v) = section.credibility {
        settings.credibility = v.clamp(0.0, 1.0);
    }
    settings.api_key = section.api_key;
}

/// Literal key wins unless it is "ENV" (any case) or blank; then read `api_key_env`.
fn resolve_api_key(settings: &ProviderSettings, env: &dyn Fn(&str) -> Option<String>) -> Option<String> {
    let literal = settings
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty() && !k.eq_ignore_ascii_case("env"));
    match literal {
        Some(k) => Some(k.to_string()),
        None => env(&settings.api_key_env)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()),
    }
}

fn parse_count(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok()).filter(|n| *n > 0)
}
