use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::aggregate::{AggregateOptions, AggregationResult, Aggregator};
use crate::error::{AggregateError, ProviderFailure};
use crate::ingest::types::ProviderId;
use crate::quota::QuotaUsage;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/aggregate", post(aggregate))
        .route("/debug/quota", get(debug_quota))
        .route("/debug/providers", get(debug_providers))
        .route("/admin/reset-quotas", post(admin_reset_quotas))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct AggregateReq {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    target_count: Option<usize>,
    #[serde(default)]
    max_count: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ErrorResp {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<ProviderFailure>,
}

struct ApiError(AggregateError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, failures) = match &self.0 {
            AggregateError::InvalidQuery(_) => (StatusCode::BAD_REQUEST, "invalid_query", Vec::new()),
            AggregateError::NoProvidersConfigured => {
                (StatusCode::SERVICE_UNAVAILABLE, "no_providers_configured", Vec::new())
            }
            AggregateError::AllProvidersFailed(f) => (StatusCode::BAD_GATEWAY, "all_providers_failed", f.clone()),
        };
        let body = ErrorResp {
            error,
            message: self.0.to_string(),
            failures,
        };
        (status, Json(body)).into_response()
    }
}

async fn aggregate(
    State(state): State<AppState>,
    Json(body): Json<AggregateReq>,
) -> Result<Json<AggregationResult>, ApiError> {
    let options = AggregateOptions {
        target_count: body.target_count,
        max_count: body.max_count,
    };
    state
        .aggregator
        .aggregate_topic(&body.topic, options)
        .await
        .map(Json)
        .map_err(ApiError)
}

async fn debug_quota(State(state): State<AppState>) -> Json<Vec<QuotaUsage>> {
    Json(state.aggregator.quota().snapshot())
}

#[derive(Serialize)]
struct ProviderInfo {
    provider: ProviderId,
    priority: f32,
    credibility: f32,
}

async fn debug_providers(State(state): State<AppState>) -> Json<Vec<ProviderInfo>> {
    let weights = state.aggregator.scorer().weights();
    let out = state
        .aggregator
        .provider_ids()
        .into_iter()
        .map(|provider| ProviderInfo {
            provider,
            priority: weights.priority_for(provider),
            credibility: weights.credibility_for(provider),
        })
        .collect();
    Json(out)
}

#[derive(Serialize)]
struct ResetResp {
    reset: bool,
}

async fn admin_reset_quotas(State(state): State<AppState>) -> Json<ResetResp> {
    state.aggregator.quota().reset_all();
    Json(ResetResp { reset: true })
}
