//! `engine` crate — the enrichment core and the article use case built on it.
//!
//! [`Enricher`] resolves the foreign references of a record batch: one
//! concurrent lookup per distinct key, bounded by a deadline, with failures
//! isolated per key and results merged back in input order.

pub mod config;
pub mod error;
pub mod keys;
pub mod fanout;
pub mod guard;
pub mod merge;
pub mod enricher;
pub mod service;

pub use config::{DeadlinePolicy, EnrichConfig, ServiceConfig};
pub use error::{EnrichError, LookupFailure, ServiceError};
pub use enricher::{enrich, Enricher};
pub use merge::{Enriched, EnrichedBatch, Resolution};
pub use service::ArticleService;
