//! In-memory sources for testing and offline runs

use async_trait::async_trait;
use cartograph_common::errors::{AppError, Result};
use cartograph_common::models::{Bibliographic, WorkRecord};
use cartograph_common::sources::{IdentityResolver, RecordEnricher, ScholarLookup, WorkSource};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Mock work source serving canned records per scholar
#[derive(Default)]
pub struct MockWorkSource {
    works: HashMap<String, Vec<WorkRecord>>,
    failing: HashSet<String>,
    slow: HashSet<String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockWorkSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_works(mut self, scholar: &str, works: Vec<WorkRecord>) -> Self {
        self.works.entry(scholar.to_string()).or_default().extend(works);
        self
    }

    /// Fetches for `scholar` return an upstream error.
    pub fn failing_for(mut self, scholar: &str) -> Self {
        self.failing.insert(scholar.to_string());
        self
    }

    /// Fetches for `scholar` sleep for `delay` before answering.
    pub fn slow_for(mut self, scholar: &str, delay: Duration) -> Self {
        self.slow.insert(scholar.to_string());
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkSource for MockWorkSource {
    async fn fetch_works(&self, scholar: &str) -> Result<Vec<WorkRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.slow.contains(scholar) {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.contains(scholar) {
            return Err(AppError::source_unavailable("mock-works", "scripted failure"));
        }

        Ok(self.works.get(scholar).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock-works"
    }
}

/// Mock enricher filling fields by exact title
#[derive(Default)]
pub struct MockEnricher {
    by_title: HashMap<String, Bibliographic>,
    calls: AtomicUsize,
}

impl MockEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, title: &str, found: Bibliographic) -> Self {
        self.by_title.insert(title.to_string(), found);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordEnricher for MockEnricher {
    async fn enrich(&self, work: WorkRecord) -> WorkRecord {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.by_title.get(&work.title) {
            Some(found) => work.merged_with(found.clone()),
            None => work,
        }
    }

    fn name(&self) -> &str {
        "mock-enricher"
    }
}

/// Mock resolver with a fixed name table; records every lookup.
#[derive(Default)]
pub struct MockResolver {
    names: HashMap<String, String>,
    lookups: Mutex<Vec<String>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, identifier: &str, name: &str) -> Self {
        self.names.insert(identifier.to_string(), name.to_string());
        self
    }

    /// Identifiers looked up so far, in call order
    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .map(|lookups| lookups.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IdentityResolver for MockResolver {
    async fn resolve_name(&self, identifier: &str) -> String {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push(identifier.to_string());
        }
        self.names
            .get(identifier)
            .cloned()
            .unwrap_or_else(|| identifier.to_string())
    }

    fn name(&self) -> &str {
        "mock-resolver"
    }
}

/// Mock scholar lookup over a fixed name table
#[derive(Default)]
pub struct MockScholarLookup {
    identifiers: HashMap<String, String>,
}

impl MockScholarLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identifier(mut self, name: &str, identifier: &str) -> Self {
        self.identifiers.insert(name.to_string(), identifier.to_string());
        self
    }
}

#[async_trait]
impl ScholarLookup for MockScholarLookup {
    async fn find_identifier(&self, name: &str) -> Option<String> {
        self.identifiers.get(name.trim()).cloned()
    }

    fn name(&self) -> &str {
        "mock-lookup"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_work_source() {
        let source = MockWorkSource::new()
            .with_works("a", vec![WorkRecord::new("w1", "Deleuzism")])
            .failing_for("b");

        assert_eq!(source.fetch_works("a").await.unwrap().len(), 1);
        assert!(source.fetch_works("b").await.is_err());
        assert!(source.fetch_works("c").await.unwrap().is_empty());
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_mock_resolver_falls_back_to_identifier() {
        let resolver = MockResolver::new().with_name("x", "Claire Colebrook");
        assert_eq!(resolver.resolve_name("x").await, "Claire Colebrook");
        assert_eq!(resolver.resolve_name("y").await, "y");
        assert_eq!(resolver.lookups(), vec!["x", "y"]);
    }
}
