//! External bibliographic sources
//!
//! The compiler depends on three contracts:
//! - `WorkSource`: raw work records per scholar identifier (ORCID)
//! - `RecordEnricher`: best-effort DOI/URL/year completion (Crossref)
//! - `IdentityResolver`: identifier -> display name (ORCID person)
//!
//! The gateway adds a fourth, `ScholarLookup` (name -> identifier, ORCID
//! search), for names the catalog cannot place.
//!
//! Only `WorkSource` reports failures; the compiler isolates them per
//! scholar. Enrichment, resolution and lookup never fail outward.

mod client;
mod crossref;
mod orcid;

pub use client::SourceClient;
pub use crossref::{title_similarity, CrossrefEnricher};
pub use orcid::{OrcidNameResolver, OrcidScholarSearch, OrcidWorkSource};

use crate::config::SourcesConfig;
use crate::errors::Result;
use crate::models::WorkRecord;
use async_trait::async_trait;
use std::sync::Arc;

/// Yields raw work records for one scholar
#[async_trait]
pub trait WorkSource: Send + Sync {
    /// Zero works is an empty list, not an error.
    async fn fetch_works(&self, scholar: &str) -> Result<Vec<WorkRecord>>;

    /// Short name used in logs and metrics
    fn name(&self) -> &str;
}

/// Fills missing bibliographic fields from a secondary source
#[async_trait]
pub trait RecordEnricher: Send + Sync {
    /// Returns the input unchanged on any failure or when nothing matches.
    async fn enrich(&self, work: WorkRecord) -> WorkRecord;

    fn name(&self) -> &str;
}

/// Maps an author identifier to a display name
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Returns the identifier itself on any failure.
    async fn resolve_name(&self, identifier: &str) -> String;

    fn name(&self) -> &str;
}

/// Finds a scholar identifier for a free-text name
#[async_trait]
pub trait ScholarLookup: Send + Sync {
    /// `None` when nothing matches or the lookup fails.
    async fn find_identifier(&self, name: &str) -> Option<String>;

    fn name(&self) -> &str;
}

/// The HTTP-backed sources, sharing one client and request budget
#[derive(Clone)]
pub struct HttpSources {
    pub works: Arc<dyn WorkSource>,
    pub enricher: Arc<dyn RecordEnricher>,
    pub resolver: Arc<dyn IdentityResolver>,
    pub lookup: Arc<dyn ScholarLookup>,
}

/// Create the ORCID/Crossref sources from configuration
pub fn create_http_sources(config: &SourcesConfig) -> Result<HttpSources> {
    let client = SourceClient::new(config)?;

    Ok(HttpSources {
        works: Arc::new(OrcidWorkSource::new(client.clone(), &config.orcid_base)),
        enricher: Arc::new(CrossrefEnricher::new(
            client.clone(),
            &config.crossref_base,
            config.min_title_similarity,
        )),
        resolver: Arc::new(OrcidNameResolver::new(client.clone(), &config.orcid_base)),
        lookup: Arc::new(OrcidScholarSearch::new(client, &config.orcid_base)),
    })
}
