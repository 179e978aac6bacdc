//! Crossref enrichment
//!
//! Looks up the best title match and fills DOI/URL/year only where the
//! record has none.

use super::client::SourceClient;
use super::RecordEnricher;
use crate::errors::{AppError, Result};
use crate::models::{normalize_title, Bibliographic, WorkRecord};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, warn};

const SOURCE: &str = "crossref";

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    message: Option<SearchMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchMessage {
    #[serde(default)]
    items: Vec<CrossrefItem>,
}

#[derive(Debug, Default, Deserialize)]
struct CrossrefItem {
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
    #[serde(default)]
    title: Vec<String>,
    issued: Option<Issued>,
}

#[derive(Debug, Default, Deserialize)]
struct Issued {
    #[serde(default, rename = "date-parts")]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl CrossrefItem {
    fn year(&self) -> Option<i32> {
        self.issued
            .as_ref()
            .and_then(|i| i.date_parts.first())
            .and_then(|parts| parts.first().copied().flatten())
    }

    fn bibliographic(&self) -> Bibliographic {
        let doi = self.doi.clone().filter(|d| !d.trim().is_empty());
        let url = doi
            .as_ref()
            .map(|d| format!("https://doi.org/{}", d))
            .or_else(|| self.url.clone());

        Bibliographic {
            doi,
            url,
            year: self.year(),
        }
    }
}

/// Dice coefficient over normalized title tokens, in `[0, 1]`.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let left = normalize_title(a);
    let right = normalize_title(b);
    let left: HashSet<&str> = left.split(' ').filter(|t| !t.is_empty()).collect();
    let right: HashSet<&str> = right.split(' ').filter(|t| !t.is_empty()).collect();

    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared = left.intersection(&right).count();
    (2 * shared) as f64 / (left.len() + right.len()) as f64
}

/// Enricher over `GET {base}/works?rows=1&query.title=...`
pub struct CrossrefEnricher {
    client: SourceClient,
    base_url: String,
    min_similarity: f64,
}

impl CrossrefEnricher {
    pub fn new(client: SourceClient, base_url: &str, min_similarity: f64) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            min_similarity,
        }
    }

    async fn lookup(&self, title: &str) -> Result<Option<Bibliographic>> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/works", self.base_url),
            &[("rows", "1"), ("query.title", title)],
        )
        .map_err(|e| AppError::Configuration {
            message: format!("Invalid Crossref base URL: {}", e),
        })?;

        let response: SearchResponse = self.client.get_json(SOURCE, url.as_str()).await?;
        let best = response.message.and_then(|m| m.items.into_iter().next());

        Ok(best.and_then(|item| {
            let candidate = item.title.first().map(String::as_str).unwrap_or_default();
            let score = title_similarity(title, candidate);
            if score >= self.min_similarity {
                Some(item.bibliographic())
            } else {
                debug!(title, candidate, score, "Crossref hit below similarity threshold");
                None
            }
        }))
    }
}

#[async_trait]
impl RecordEnricher for CrossrefEnricher {
    async fn enrich(&self, work: WorkRecord) -> WorkRecord {
        if work.is_fully_linked() || work.title.trim().is_empty() {
            return work;
        }

        match self.lookup(&work.title).await {
            Ok(Some(found)) => work.merged_with(found),
            Ok(None) => work,
            Err(e) => {
                warn!(work_id = %work.id, error = %e, "Crossref enrichment failed, keeping record");
                work
            }
        }
    }

    fn name(&self) -> &str {
        SOURCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_similarity() {
        assert_eq!(title_similarity("Assemblage Theory", "assemblage theory"), 1.0);
        assert!(title_similarity("Assemblage Theory", "Assemblage Theory and Method") > 0.6);
        assert_eq!(title_similarity("Affect", "Ontology"), 0.0);
        assert_eq!(title_similarity("", "Ontology"), 0.0);
    }

    #[test]
    fn test_item_bibliographic_prefers_doi_url() {
        let item: CrossrefItem = serde_json::from_value(serde_json::json!({
            "DOI": "10.3366/dls.2015.0001",
            "URL": "http://dx.doi.org/10.3366/dls.2015.0001",
            "title": ["Assemblage Theory and Method"],
            "issued": { "date-parts": [[2015, 3]] }
        }))
        .unwrap();

        let found = item.bibliographic();
        assert_eq!(found.doi.as_deref(), Some("10.3366/dls.2015.0001"));
        assert_eq!(found.url.as_deref(), Some("https://doi.org/10.3366/dls.2015.0001"));
        assert_eq!(found.year, Some(2015));
    }

    #[test]
    fn test_item_without_doi_or_date() {
        let item: CrossrefItem = serde_json::from_value(serde_json::json!({
            "URL": "https://example.org/item",
            "issued": { "date-parts": [[null]] }
        }))
        .unwrap();

        let found = item.bibliographic();
        assert!(found.doi.is_none());
        assert_eq!(found.url.as_deref(), Some("https://example.org/item"));
        assert!(found.year.is_none());
    }

    #[tokio::test]
    async fn test_fully_linked_record_short_circuits() {
        let client = SourceClient::new(&crate::config::SourcesConfig::default()).unwrap();
        let enricher = CrossrefEnricher::new(client, "http://127.0.0.1:9", 0.5);

        let record = WorkRecord::new("w1", "Deleuzism")
            .with_doi("10.1000/xyz")
            .with_url("https://doi.org/10.1000/xyz");
        let out = enricher.enrich(record.clone()).await;
        assert_eq!(out, record);
    }

    #[tokio::test]
    async fn test_unreachable_source_returns_input() {
        let config = crate::config::SourcesConfig {
            timeout_secs: 1,
            ..Default::default()
        };
        let client = SourceClient::new(&config).unwrap();
        let enricher = CrossrefEnricher::new(client, "http://127.0.0.1:9", 0.5);

        let record = WorkRecord::new("w1", "Deleuzism").with_year(2000);
        let out = enricher.enrich(record.clone()).await;
        assert_eq!(out, record);
    }
}
