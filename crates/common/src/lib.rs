//! Cartograph Common Library
//!
//! Shared code for the Cartograph services including:
//! - Data contracts (spec, work records, compiled graph)
//! - External bibliographic sources (ORCID, Crossref)
//! - Error types and handling
//! - Configuration management
//! - Scholar/concept catalog
//! - Compiled graph cache
//! - Metrics and observability

pub mod cache;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod sources;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use models::{Graph, Mode, Spec, WorkRecord};
pub use sources::{IdentityResolver, RecordEnricher, ScholarLookup, WorkSource};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
