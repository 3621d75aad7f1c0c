// src/config/mod.rs
pub mod aggregator;

pub use aggregator::{
    AggregatorConfig, ProviderSettings, DEFAULT_CONFIG_PATH, DEFAULT_MAX_COUNT,
    DEFAULT_TARGET_COUNT, ENV_CONFIG_PATH, ENV_MAX_COUNT, ENV_TARGET_COUNT,
};
