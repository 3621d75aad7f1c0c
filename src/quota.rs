//! # Quota Tracker
//! In-memory per-provider daily request counters.
//!
//! Counts are process-lifetime only; losing them on restart is accepted.
//! [`QuotaTracker::try_acquire`] checks and increments under one lock so two
//! concurrent adapters can never both slip past the ceiling.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::error::ProviderError;
use crate::ingest::types::ProviderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaUsage {
    pub provider: ProviderId,
    pub used: u32,
    /// `None` means no ceiling.
    pub daily_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
struct Counter {
    used: u32,
    daily_limit: Option<u32>,
}

impl Counter {
    fn has_capacity(&self) -> bool {
        self.daily_limit.is_none_or(|limit| self.used < limit)
    }
}

/// Thread-safe daily quota counters, shared between the coordinator and its adapters.
#[derive(Debug, Default)]
pub struct QuotaTracker {
    inner: Mutex<BTreeMap<ProviderId, Counter>>,
}

impl QuotaTracker {
    /// Tracker with no ceilings; every provider is unlimited until configured.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits<I>(limits: I) -> Self
    where
        I: IntoIterator<Item = (ProviderId, u32)>,
    {
        let tracker = Self::new();
        for (provider, limit) in limits {
            tracker.set_limit(provider, limit);
        }
        tracker
    }

    /// Ceilings used by the upstream APIs' free tiers.
    pub fn default_limits() -> Self {
        Self::with_limits([
            (ProviderId::Guardian, 1000),
            (ProviderId::Nyt, 1000),
            (ProviderId::NewsApi, 100),
            (ProviderId::GNews, 100),
            (ProviderId::NewsData, 200),
        ])
    }

    pub fn set_limit(&self, provider: ProviderId, daily_limit: u32) {
        let mut map = self.lock();
        map.entry(provider)
            .and_modify(|c| c.daily_limit = Some(daily_limit))
            .or_insert(Counter {
                used: 0,
                daily_limit: Some(daily_limit),
            });
    }

    pub fn can_invoke(&self, provider: ProviderId) -> bool {
        self.lock()
            .get(&provider)
            .is_none_or(Counter::has_capacity)
    }

    pub fn record_invocation(&self, provider: ProviderId) {
        let mut map = self.lock();
        let counter = map.entry(provider).or_insert(Counter {
            used: 0,
            daily_limit: None,
        });
        counter.used = counter.used.saturating_add(1);
    }

    /// Atomic `can_invoke` + `record_invocation`.
    ///
    /// The slot is consumed whether or not the subsequent call succeeds.
    pub fn try_acquire(&self, provider: ProviderId) -> Result<(), ProviderError> {
        let mut map = self.lock();
        let counter = map.entry(provider).or_insert(Counter {
            used: 0,
            daily_limit: None,
        });
        if !counter.has_capacity() {
            return Err(ProviderError::QuotaExceeded { provider });
        }
        counter.used = counter.used.saturating_add(1);
        Ok(())
    }

    pub fn used(&self, provider: ProviderId) -> u32 {
        self.lock().get(&provider).map(|c| c.used).unwrap_or(0)
    }

    /// Zero every counter, keeping the ceilings.
    pub fn reset_all(&self) {
        for counter in self.lock().values_mut() {
            counter.used = 0;
        }
        tracing::info!(target: "quota", "daily provider quotas reset");
    }

    pub fn snapshot(&self) -> Vec<QuotaUsage> {
        self.lock()
            .iter()
            .map(|(provider, c)| QuotaUsage {
                provider: *provider,
                used: c.used,
                daily_limit: c.daily_limit,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ProviderId, Counter>> {
        // Counters stay consistent even if a holder panicked mid-update.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
