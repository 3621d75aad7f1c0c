// src/analyze/mod.rs
//! Synchronous post-fetch pipeline: dedup → score → select → summarize.

pub mod dedup;
pub mod keywords;
pub mod rank;
pub mod scoring;
pub mod stats;

pub use dedup::{dedupe, jaccard_similarity, DUPLICATE_TITLE_THRESHOLD};
pub use keywords::KeywordLists;
pub use rank::{select, MIN_RELEVANCE_SCORE};
pub use scoring::{ScoredArticle, Scorer, ENTERPRISE_GRADE_THRESHOLD};
pub use stats::{summarize, AggregationStats, ProviderSummary};
