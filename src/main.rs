//! ESG news aggregator: binary entrypoint.
//! Boots the Axum HTTP server with the aggregator, the daily quota reset and `/metrics`.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;

use esg_news_aggregator::{
    api::{create_router, AppState},
    config::AggregatorConfig,
    metrics::Metrics,
    scheduler::spawn_daily_quota_reset,
    telemetry, Aggregator,
};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cfg = AggregatorConfig::load_default()?;
    let aggregator = Arc::new(Aggregator::from_config(&cfg));
    spawn_daily_quota_reset(Arc::clone(aggregator.quota()));

    let metrics = Metrics::init()?;
    let router = create_router(AppState { aggregator }).merge(metrics.router());

    Ok(router.into())
}
