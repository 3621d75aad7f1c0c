// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod analyze;
pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod quota;
pub mod scheduler;
pub mod source_weights;
pub mod telemetry;

pub use crate::aggregate::{AggregateOptions, AggregationResult, Aggregator, QueryContext};
pub use crate::api::{create_router, AppState};
pub use crate::config::AggregatorConfig;
pub use crate::error::{AggregateError, ProviderError};
pub use crate::ingest::types::{Article, ArticleProvider, ProviderId};
pub use crate::quota::QuotaTracker;
