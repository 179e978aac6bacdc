//! Persisted scholar and concept lists
//!
//! The compiler only sees identifier and term strings. This module turns
//! what a user typed (a name, an alias) into those strings before a compile.

use crate::config::CatalogConfig;
use crate::errors::{AppError, Result};
use crate::models::is_scholar_identifier;
use crate::sources::ScholarLookup;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// `{ name, identifier }` as stored in the scholars list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScholarEntry {
    pub name: String,

    /// ORCID iD; some scholars have none
    #[serde(default, alias = "orcid")]
    pub identifier: Option<String>,

    #[serde(default)]
    pub aliases: Vec<String>,
}

/// `{ term, aliases, definition, tags, seed_quotes }` as stored in the concepts list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConceptEntry {
    pub term: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub definition: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub seed_quotes: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    scholars: Vec<ScholarEntry>,
    concepts: Vec<ConceptEntry>,
}

impl Catalog {
    pub fn new(scholars: Vec<ScholarEntry>, concepts: Vec<ConceptEntry>) -> Self {
        Self { scholars, concepts }
    }

    /// Load both lists; an unset path yields an empty list.
    pub async fn load(config: &CatalogConfig) -> Result<Self> {
        let scholars = match config.scholars_path.as_deref() {
            Some(path) => read_list(path).await?,
            None => Vec::new(),
        };
        let concepts = match config.concepts_path.as_deref() {
            Some(path) => read_list(path).await?,
            None => Vec::new(),
        };

        info!(scholars = scholars.len(), concepts = concepts.len(), "Catalog loaded");
        Ok(Self { scholars, concepts })
    }

    pub fn scholars(&self) -> &[ScholarEntry] {
        &self.scholars
    }

    pub fn concepts(&self) -> &[ConceptEntry] {
        &self.concepts
    }

    /// Exact name/alias match first, then substring match on the name.
    pub fn find_scholar(&self, query: &str) -> Option<&ScholarEntry> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return None;
        }

        self.scholars
            .iter()
            .find(|s| {
                s.name.to_lowercase() == q || s.aliases.iter().any(|a| a.to_lowercase() == q)
            })
            .or_else(|| self.scholars.iter().find(|s| s.name.to_lowercase().contains(&q)))
    }

    /// Map each input to a scholar identifier.
    ///
    /// Valid identifiers pass through; names resolve through the list;
    /// anything else is passed on untouched for the compiler to drop.
    pub fn resolve_scholars(&self, inputs: &[String]) -> Vec<String> {
        inputs
            .iter()
            .map(|input| {
                let trimmed = input.trim();
                if is_scholar_identifier(trimmed) {
                    return trimmed.to_string();
                }
                self.find_scholar(trimmed)
                    .and_then(|s| s.identifier.clone())
                    .unwrap_or_else(|| trimmed.to_string())
            })
            .collect()
    }

    /// `resolve_scholars`, then `lookup` for every input the list could not
    /// place. Lookups run concurrently; a miss leaves the input for the
    /// compiler to drop.
    pub async fn resolve_scholars_with(
        &self,
        inputs: &[String],
        lookup: &dyn ScholarLookup,
    ) -> Vec<String> {
        let resolved = self.resolve_scholars(inputs);
        let calls = resolved.into_iter().map(|candidate| async move {
            if is_scholar_identifier(&candidate) {
                return candidate;
            }
            match lookup.find_identifier(&candidate).await {
                Some(identifier) => {
                    debug!(name = %candidate, identifier = %identifier, source = lookup.name(), "Scholar found by name search");
                    identifier
                }
                None => candidate,
            }
        });
        join_all(calls).await
    }

    /// The canonical term for `input` if it names a concept or one of its
    /// aliases, otherwise `input` itself.
    pub fn canonical_concept(&self, input: &str) -> String {
        let q = input.trim().to_lowercase();
        self.concepts
            .iter()
            .find(|c| c.term.to_lowercase() == q || c.aliases.iter().any(|a| a.to_lowercase() == q))
            .map(|c| c.term.clone())
            .unwrap_or_else(|| input.trim().to_string())
    }
}

async fn read_list<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| AppError::Configuration {
        message: format!("Failed to read catalog list {}: {}", path.display(), e),
    })?;
    Ok(serde_json::from_str(&raw)?)
}
