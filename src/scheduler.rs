// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use metrics::counter;
use tokio::task::JoinHandle;

use crate::quota::QuotaTracker;

/// Time left until the next 00:00:00 UTC (never zero; exactly at midnight waits a full day).
pub fn duration_until_next_utc_midnight(now: DateTime<Utc>) -> Duration {
    let next = (now.date_naive() + chrono::Duration::days(1))
        .and_time(NaiveTime::MIN)
        .and_utc();
    (next - now).to_std().unwrap_or(Duration::from_secs(1))
}

/// Reset all provider quotas at every UTC midnight until the handle is aborted.
pub fn spawn_daily_quota_reset(quota: Arc<QuotaTracker>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = duration_until_next_utc_midnight(Utc::now());
            tracing::debug!(target: "quota", wait_secs = wait.as_secs(), "next quota reset scheduled");
            tokio::time::sleep(wait).await;
            quota.reset_all();
            counter!("quota_resets_total").increment(1);
        }
    })
}
