//! fraudwatch-core: ingestion, caching, querying and aggregation behind the
//! fraud-monitoring dashboard.
//!
//! Data flow:
//!   source text → csv_parser → record_builder → cache
//!     → query (per-request paging) / analytics (per-request summary)
//!     → service (request/response boundary)

pub mod analytics;
pub mod cache;
pub mod clock;
pub mod config;
pub mod csv_parser;
pub mod error;
pub mod export;
pub mod query;
pub mod record;
pub mod record_builder;
pub mod risk_model;
pub mod rng;
pub mod service;
pub mod source;
pub mod synthesizer;
pub mod types;
