//! Staged compile pipeline
//!
//! fetch -> year filter -> enrich -> resolve names -> build -> mode pass
//!
//! Stages run one after another; calls within a stage run concurrently and
//! are awaited together. Each call fails alone: a failed fetch contributes no works, a failed enrichment keeps
//! the record as fetched, a failed resolution labels the author with its
//! identifier.

use crate::builder::GraphBuilder;
use crate::passes::{coauthor_edges, influence_edges};
use crate::spec::ValidatedSpec;
use cartograph_common::errors::{AppError, Result};
use cartograph_common::metrics;
use cartograph_common::models::{Graph, Mode, Spec, WorkRecord, YearWindow};
use cartograph_common::sources::{HttpSources, IdentityResolver, RecordEnricher, WorkSource};
use futures::future::join_all;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Default bound on a single source call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(8);

/// Compiles cartography specs against a set of sources. Holds no state
/// between compiles.
#[derive(Clone)]
pub struct Compiler {
    works: Arc<dyn WorkSource>,
    enricher: Arc<dyn RecordEnricher>,
    resolver: Arc<dyn IdentityResolver>,
    call_timeout: Option<Duration>,
}

impl Compiler {
    pub fn new(
        works: Arc<dyn WorkSource>,
        enricher: Arc<dyn RecordEnricher>,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            works,
            enricher,
            resolver,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
        }
    }

    /// HTTP sources time each exchange once their shared request budget
    /// admits it, so calls through them carry no outer bound.
    pub fn from_sources(sources: &HttpSources) -> Self {
        Self {
            call_timeout: None,
            ..Self::new(
                sources.works.clone(),
                sources.enricher.clone(),
                sources.resolver.clone(),
            )
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = Some(call_timeout);
        self
    }

    /// Compile `spec` into a graph.
    ///
    /// Fails only with `AppError::InvalidSpec`; every other problem yields a
    /// sparser graph.
    #[instrument(skip(self, spec), fields(mode = ?spec.mode))]
    pub async fn compile(&self, spec: &Spec) -> Result<Graph> {
        let start = Instant::now();
        let spec = ValidatedSpec::try_from(spec)?;

        let fetched = self.fetch_all(&spec.scholars).await;
        let in_window = retain_in_window(fetched, &spec.years);
        let enriched = self.enrich_all(in_window).await;
        // Enrichment may have dated a previously undated record
        let records = retain_in_window(enriched, &spec.years);
        let names = self.resolve_all(&records).await;

        let graph = build_graph(&spec, &records, &names);

        metrics::record_compile(
            start.elapsed().as_secs_f64(),
            spec.mode.as_str(),
            graph.nodes.len(),
            graph.edges.len(),
        );
        info!(
            mode = %spec.mode,
            scholars = spec.scholars.len(),
            works = records.len(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Cartography compiled"
        );

        Ok(graph)
    }

    async fn bounded<T>(&self, source_name: &str, call: impl Future<Output = T>) -> Result<T> {
        let Some(limit) = self.call_timeout else {
            return Ok(call.await);
        };
        tokio::time::timeout(limit, call)
            .await
            .map_err(|_| AppError::Timeout {
                source_name: source_name.to_string(),
                timeout_ms: limit.as_millis() as u64,
            })
    }

    #[instrument(skip(self, scholars), fields(scholars = scholars.len()))]
    async fn fetch_all(&self, scholars: &[String]) -> Vec<WorkRecord> {
        let calls = scholars.iter().map(|scholar| async move {
            let outcome = self
                .bounded(self.works.name(), self.works.fetch_works(scholar))
                .await
                .and_then(|fetched| fetched);

            match outcome {
                Ok(works) => {
                    debug!(scholar = %scholar, count = works.len(), "Fetched works");
                    works
                }
                Err(e) => {
                    warn!(scholar = %scholar, error = %e, "Work fetch failed, scholar contributes no works");
                    metrics::record_degraded("fetch");
                    Vec::new()
                }
            }
        });

        join_all(calls).await.into_iter().flatten().collect()
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn enrich_all(&self, records: Vec<WorkRecord>) -> Vec<WorkRecord> {
        let calls = records.into_iter().map(|record| async move {
            if record.is_fully_linked() {
                return record;
            }

            match self
                .bounded(self.enricher.name(), self.enricher.enrich(record.clone()))
                .await
            {
                // Re-applied here so only absent fields can change, whatever
                // the enricher returned
                Ok(enriched) => record.merged_with(enriched.bibliographic()),
                Err(e) => {
                    warn!(work_id = %record.id, error = %e, "Enrichment timed out, keeping record");
                    metrics::record_degraded("enrich");
                    record
                }
            }
        });

        join_all(calls).await
    }

    /// Resolve every distinct author identifier exactly once.
    #[instrument(skip(self, records))]
    async fn resolve_all(&self, records: &[WorkRecord]) -> HashMap<String, String> {
        let identifiers: IndexSet<&str> = records
            .iter()
            .flat_map(|r| r.authors.iter())
            .filter_map(|a| a.identifier.as_deref())
            .collect();

        let calls = identifiers.into_iter().map(|identifier| async move {
            let name = match self
                .bounded(self.resolver.name(), self.resolver.resolve_name(identifier))
                .await
            {
                Ok(name) => name,
                Err(e) => {
                    warn!(identifier, error = %e, "Name resolution timed out, using identifier");
                    metrics::record_degraded("resolve");
                    identifier.to_string()
                }
            };
            (identifier.to_string(), name)
        });

        join_all(calls).await.into_iter().collect()
    }
}

fn retain_in_window(records: Vec<WorkRecord>, years: &YearWindow) -> Vec<WorkRecord> {
    if years.is_unbounded() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| years.admits(r.year))
        .collect()
}

/// Assemble nodes, base edges and the mode pass from prepared records.
pub fn build_graph(
    spec: &ValidatedSpec,
    records: &[WorkRecord],
    names: &HashMap<String, String>,
) -> Graph {
    let mut builder = GraphBuilder::new();
    for concept in &spec.concepts {
        builder.add_concept(concept);
    }
    for record in records {
        builder.add_work(record, names);
    }
    builder.prune_concepts(spec.min_concept_freq);

    let mut graph = builder.finish();
    let derived = match spec.mode {
        Mode::ConceptComparison => Vec::new(),
        Mode::CoWork => coauthor_edges(&graph.edges),
        Mode::Lineage => influence_edges(&graph.nodes, &graph.edges),
    };
    graph.edges.extend(derived);
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockEnricher, MockResolver, MockWorkSource};
    use cartograph_common::models::{Bibliographic, EdgeKind, NodeType, WorkAuthor};

    const IAN: &str = "0000-0002-1825-0097";
    const BRIAN: &str = "0000-0002-4384-3615";
    const CLAIRE: &str = "0000-0001-5555-000X";

    fn by(identifier: &str) -> WorkAuthor {
        WorkAuthor::identified(identifier, identifier)
    }

    fn compiler_with(works: MockWorkSource, enricher: MockEnricher) -> Compiler {
        Compiler::new(
            Arc::new(works),
            Arc::new(enricher),
            Arc::new(
                MockResolver::new()
                    .with_name(IAN, "Ian Buchanan")
                    .with_name(BRIAN, "Brian Massumi"),
            ),
        )
    }

    fn assemblage_source() -> MockWorkSource {
        MockWorkSource::new().with_works(
            IAN,
            vec![WorkRecord::new("w1", "Assemblage Theory and Method")
                .with_year(2015)
                .with_author(by(IAN))],
        )
    }

    #[tokio::test]
    async fn test_single_scholar_single_concept() {
        let compiler = compiler_with(assemblage_source(), MockEnricher::new());
        let spec = Spec::new(Mode::ConceptComparison)
            .with_concepts(["assemblage"])
            .with_scholars([IAN])
            .with_years(Some(2000), Some(2020));

        let graph = compiler.compile(&spec).await.unwrap();

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes_of_type(NodeType::Concept).count(), 1);
        assert_eq!(graph.nodes_of_type(NodeType::Work).count(), 1);
        assert_eq!(graph.nodes_of_type(NodeType::Author).count(), 1);
        assert_eq!(graph.node(IAN).unwrap().label, "Ian Buchanan");

        let work_id = "work:assemblage theory and method:2015";
        assert!(graph
            .edges
            .iter()
            .any(|e| e.kind == EdgeKind::Authored && e.connects(IAN, work_id)));
        assert!(graph
            .edges
            .iter()
            .any(|e| e.kind == EdgeKind::Concept && e.connects("concept:assemblage", work_id)));
        assert_eq!(graph.refs["#ASS"].len(), 1);
        assert_eq!(graph.refs["#ASS"][0].title, "Assemblage Theory and Method");
    }

    #[tokio::test]
    async fn test_year_window_excluding_everything() {
        let compiler = compiler_with(assemblage_source(), MockEnricher::new());
        let spec = Spec::new(Mode::ConceptComparison)
            .with_concepts(["assemblage"])
            .with_scholars([IAN])
            .with_years(Some(2016), Some(2020));

        let graph = compiler.compile(&spec).await.unwrap();

        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert_eq!(
            serde_json::to_value(&graph.refs).unwrap(),
            serde_json::json!({ "#ASS": [] })
        );
    }

    #[tokio::test]
    async fn test_enrichment_year_is_checked_against_window() {
        let works = MockWorkSource::new().with_works(
            IAN,
            vec![
                WorkRecord::new("w1", "Deleuze and Space").with_author(by(IAN)),
                WorkRecord::new("w2", "Deleuzism").with_author(by(IAN)),
                WorkRecord::new("w3", "Undated Notes").with_author(by(IAN)),
            ],
        );
        let enricher = MockEnricher::new()
            .with_entry(
                "Deleuze and Space",
                Bibliographic {
                    year: Some(2018),
                    ..Default::default()
                },
            )
            .with_entry(
                "Deleuzism",
                Bibliographic {
                    year: Some(2000),
                    doi: Some("10.1000/deleuzism".into()),
                    url: None,
                },
            );
        let compiler = compiler_with(works, enricher);
        let spec = Spec::new(Mode::ConceptComparison)
            .with_scholars([IAN])
            .with_years(Some(2016), Some(2020));

        let graph = compiler.compile(&spec).await.unwrap();
        let titles: Vec<&str> = graph
            .nodes_of_type(NodeType::Work)
            .map(|n| n.label.as_str())
            .collect();

        assert_eq!(titles, vec!["Deleuze and Space", "Undated Notes"]);
    }

    #[tokio::test]
    async fn test_enrichment_never_overwrites() {
        let works = MockWorkSource::new().with_works(
            IAN,
            vec![WorkRecord::new("w1", "Deleuzism")
                .with_year(2000)
                .with_author(by(IAN))],
        );
        let enricher = MockEnricher::new().with_entry(
            "Deleuzism",
            Bibliographic {
                year: Some(1999),
                url: Some("https://example.org/deleuzism".into()),
                doi: None,
            },
        );
        let compiler = compiler_with(works, enricher);
        let graph = compiler
            .compile(&Spec::new(Mode::ConceptComparison).with_scholars([IAN]))
            .await
            .unwrap();

        let work = graph.nodes_of_type(NodeType::Work).next().unwrap();
        assert_eq!(work.year, Some(2000));
        assert_eq!(work.url.as_deref(), Some("https://example.org/deleuzism"));
    }

    #[tokio::test]
    async fn test_shared_doi_collapses_to_one_work() {
        let works = MockWorkSource::new()
            .with_works(
                IAN,
                vec![WorkRecord::new("a", "A Thousand Plateaus")
                    .with_doi("10.5749/atp")
                    .with_author(by(IAN))],
            )
            .with_works(
                BRIAN,
                vec![WorkRecord::new("b", "A Thousand Plateaus: Capitalism and Schizophrenia")
                    .with_doi("https://doi.org/10.5749/ATP")
                    .with_author(by(BRIAN))],
            );
        let compiler = compiler_with(works, MockEnricher::new());
        let spec = Spec::new(Mode::ConceptComparison).with_scholars([IAN, BRIAN]);

        let graph = compiler.compile(&spec).await.unwrap();

        let works: Vec<_> = graph.nodes_of_type(NodeType::Work).collect();
        assert_eq!(works.len(), 1);
        assert_eq!(works[0].id, "doi:10.5749/atp");
        assert_eq!(graph.edges_of_kind(EdgeKind::Authored).count(), 2);
    }

    #[tokio::test]
    async fn test_concept_edges_iff_title_contains_term() {
        let works = MockWorkSource::new().with_works(
            BRIAN,
            vec![
                WorkRecord::new("w1", "Affective Politics").with_author(by(BRIAN)),
                WorkRecord::new("w2", "Semblance and Event").with_author(by(BRIAN)),
            ],
        );
        let compiler = compiler_with(works, MockEnricher::new());
        let spec = Spec::new(Mode::ConceptComparison)
            .with_concepts(["AFFECT", "body"])
            .with_scholars([BRIAN]);

        let graph = compiler.compile(&spec).await.unwrap();

        let concept_edges: Vec<_> = graph.edges_of_kind(EdgeKind::Concept).collect();
        assert_eq!(concept_edges.len(), 1);
        assert!(concept_edges[0].connects("concept:affect", "work:affective politics"));
        assert!(graph.node("concept:body").is_none());
        assert!(graph.refs["#BOD"].is_empty());
    }

    #[tokio::test]
    async fn test_co_work_edges_are_unique_per_pair() {
        let shared = |id: &str, title: &str| {
            WorkRecord::new(id, title)
                .with_author(by(IAN))
                .with_author(by(BRIAN))
        };
        let works = MockWorkSource::new()
            .with_works(IAN, vec![shared("w1", "Deleuze and Guattari"), shared("w2", "Affect Theory")])
            .with_works(BRIAN, vec![shared("w1", "Deleuze and Guattari")]);
        let compiler = compiler_with(works, MockEnricher::new());
        let spec = Spec::new(Mode::CoWork).with_scholars([IAN, BRIAN]);

        let graph = compiler.compile(&spec).await.unwrap();

        let coauthor: Vec<_> = graph.edges_of_kind(EdgeKind::Coauthor).collect();
        assert_eq!(coauthor.len(), 1);
        assert!(coauthor[0].connects(IAN, BRIAN));
        assert_eq!(coauthor[0].weight, Some(2));
        assert!(graph.edges.iter().all(|e| e.source != e.target));
    }

    #[tokio::test]
    async fn test_lineage_points_forward_in_time() {
        let works = MockWorkSource::new().with_works(
            CLAIRE,
            vec![
                WorkRecord::new("w2", "Affect and Event").with_year(2010).with_author(by(CLAIRE)),
                WorkRecord::new("w1", "On Affect").with_year(1995).with_author(by(CLAIRE)),
                WorkRecord::new("w3", "Undated Affect").with_author(by(CLAIRE)),
            ],
        );
        let compiler = compiler_with(works, MockEnricher::new());
        let spec = Spec::new(Mode::Lineage)
            .with_concepts(["affect"])
            .with_scholars([CLAIRE]);

        let graph = compiler.compile(&spec).await.unwrap();

        let influences: Vec<_> = graph.edges_of_kind(EdgeKind::Influences).collect();
        assert_eq!(influences.len(), 1);
        assert_eq!(influences[0].source, "work:on affect:1995");
        assert_eq!(influences[0].target, "work:affect and event:2010");
    }

    #[tokio::test]
    async fn test_failing_scholar_is_isolated() {
        let works = assemblage_source().failing_for(BRIAN);
        let compiler = compiler_with(works, MockEnricher::new());
        let spec = Spec::new(Mode::ConceptComparison)
            .with_concepts(["assemblage"])
            .with_scholars([BRIAN, IAN]);

        let graph = compiler.compile(&spec).await.unwrap();

        assert_eq!(graph.nodes_of_type(NodeType::Work).count(), 1);
        assert!(graph.node(BRIAN).is_none());
    }

    #[tokio::test]
    async fn test_slow_scholar_times_out_alone() {
        let works = assemblage_source().slow_for(BRIAN, Duration::from_secs(5));
        let compiler = compiler_with(works, MockEnricher::new())
            .with_call_timeout(Duration::from_millis(50));
        let spec = Spec::new(Mode::ConceptComparison).with_scholars([IAN, BRIAN]);

        let started = Instant::now();
        let graph = compiler.compile(&spec).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(graph.nodes_of_type(NodeType::Work).count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_mode_is_rejected_before_fetching() {
        let works = Arc::new(assemblage_source());
        let compiler = Compiler::new(
            works.clone(),
            Arc::new(MockEnricher::new()),
            Arc::new(MockResolver::new()),
        );
        let spec = Spec {
            mode: Some("citation_map".into()),
            scholars: vec![IAN.into()],
            ..Default::default()
        };

        let err = compiler.compile(&spec).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidSpec { .. }));
        assert_eq!(works.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_scholar_is_never_fetched() {
        let works = Arc::new(assemblage_source());
        let compiler = Compiler::new(
            works.clone(),
            Arc::new(MockEnricher::new()),
            Arc::new(MockResolver::new()),
        );
        let spec = Spec::new(Mode::ConceptComparison).with_scholars(["Ian Buchanan", IAN]);

        let graph = compiler.compile(&spec).await.unwrap();
        assert_eq!(works.calls(), 1);
        assert_eq!(graph.nodes_of_type(NodeType::Work).count(), 1);
    }

    #[tokio::test]
    async fn test_each_identifier_resolved_once() {
        let works = MockWorkSource::new()
            .with_works(
                IAN,
                vec![
                    WorkRecord::new("w1", "One").with_author(by(IAN)).with_author(by(BRIAN)),
                    WorkRecord::new("w2", "Two").with_author(by(IAN)),
                ],
            )
            .with_works(BRIAN, vec![WorkRecord::new("w3", "Three").with_author(by(BRIAN))]);
        let resolver = Arc::new(MockResolver::new());
        let compiler = Compiler::new(Arc::new(works), Arc::new(MockEnricher::new()), resolver.clone());

        compiler
            .compile(&Spec::new(Mode::CoWork).with_scholars([IAN, BRIAN]))
            .await
            .unwrap();

        let mut lookups = resolver.lookups();
        lookups.sort();
        assert_eq!(lookups, vec![IAN.to_string(), BRIAN.to_string()]);
    }

    #[tokio::test]
    async fn test_fully_linked_record_is_not_enriched() {
        let works = MockWorkSource::new().with_works(
            IAN,
            vec![WorkRecord::new("w1", "Deleuzism")
                .with_doi("10.1000/deleuzism")
                .with_url("https://doi.org/10.1000/deleuzism")
                .with_author(by(IAN))],
        );
        let enricher = Arc::new(MockEnricher::new());
        let compiler = Compiler::new(Arc::new(works), enricher.clone(), Arc::new(MockResolver::new()));

        let graph = compiler
            .compile(&Spec::new(Mode::ConceptComparison).with_scholars([IAN]))
            .await
            .unwrap();

        assert_eq!(enricher.calls(), 0);
        assert_eq!(graph.nodes_of_type(NodeType::Work).count(), 1);
    }

    #[tokio::test]
    async fn test_out_of_window_record_is_not_enriched() {
        let works = MockWorkSource::new().with_works(
            IAN,
            vec![
                WorkRecord::new("w1", "Deleuzism").with_year(2000).with_author(by(IAN)),
                WorkRecord::new("w2", "Assemblage Theory").with_year(2017).with_author(by(IAN)),
            ],
        );
        let enricher = Arc::new(MockEnricher::new());
        let compiler = Compiler::new(Arc::new(works), enricher.clone(), Arc::new(MockResolver::new()));
        let spec = Spec::new(Mode::ConceptComparison)
            .with_scholars([IAN])
            .with_years(Some(2010), Some(2020));

        compiler.compile(&spec).await.unwrap();

        assert_eq!(enricher.calls(), 1);
    }

    mod over_http {
        use super::*;
        use axum::{
            extract::{Path, Query},
            routing::get,
            Json, Router,
        };
        use cartograph_common::config::SourcesConfig;
        use cartograph_common::sources::create_http_sources;
        use serde_json::{json, Value};

        const ESSAYS: i64 = 10;

        fn essay(put_code: i64) -> Value {
            json!({
                "put-code": put_code,
                "title": { "title": { "value": format!("Essay on Folds {}", put_code) } }
            })
        }

        /// Instant ORCID and Crossref stand-ins under `/orcid` and `/crossref`
        async fn serve_sources() -> String {
            let app = Router::new()
                .route(
                    "/orcid/{orcid}/works",
                    get(|| async {
                        let groups: Vec<Value> = (0..ESSAYS)
                            .map(|i| json!({ "work-summary": [essay(i)] }))
                            .collect();
                        Json(json!({ "group": groups }))
                    }),
                )
                .route(
                    "/orcid/{orcid}/work/{put_code}",
                    get(|Path((_, put_code)): Path<(String, i64)>| async move { Json(essay(put_code)) }),
                )
                .route(
                    "/orcid/{orcid}/person",
                    get(|| async {
                        Json(json!({ "name": {
                            "given-names": { "value": "Ian" },
                            "family-name": { "value": "Buchanan" }
                        }}))
                    }),
                )
                .route(
                    "/crossref/works",
                    get(|Query(params): Query<HashMap<String, String>>| async move {
                        let title = params.get("query.title").cloned().unwrap_or_default();
                        let suffix = title.rsplit(' ').next().unwrap_or_default().to_string();
                        Json(json!({ "message": { "items": [{
                            "DOI": format!("10.1000/folds.{}", suffix),
                            "title": [title]
                        }]}}))
                    }),
                );

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
            format!("http://{}", addr)
        }

        #[tokio::test]
        async fn test_request_budget_queueing_does_not_drop_enrichment() {
            let base = serve_sources().await;
            let sources = create_http_sources(&SourcesConfig {
                orcid_base: format!("{}/orcid", base),
                crossref_base: format!("{}/crossref", base),
                timeout_secs: 1,
                requests_per_second: 5,
                ..Default::default()
            })
            .unwrap();
            let compiler = Compiler::from_sources(&sources);

            let started = Instant::now();
            let graph = compiler
                .compile(&Spec::new(Mode::ConceptComparison).with_scholars([IAN]))
                .await
                .unwrap();

            // Two dozen calls at five per second queue well past the 1s exchange bound
            assert!(started.elapsed() > Duration::from_secs(1));
            let works: Vec<_> = graph.nodes_of_type(NodeType::Work).collect();
            assert_eq!(works.len(), ESSAYS as usize);
            assert!(works.iter().all(|w| w.id.starts_with("doi:10.1000/folds.")));
            assert_eq!(graph.node(IAN).unwrap().label, "Ian Buchanan");
        }
    }

    #[test]
    fn test_compiles_are_reproducible() {
        let source = || {
            MockWorkSource::new()
                .with_works(
                    IAN,
                    vec![
                        WorkRecord::new("w1", "Assemblage Theory").with_year(2015).with_author(by(IAN)),
                        WorkRecord::new("w2", "Affect and Assemblage")
                            .with_year(2017)
                            .with_author(by(IAN))
                            .with_author(by(BRIAN)),
                    ],
                )
                .with_works(
                    BRIAN,
                    vec![
                        WorkRecord::new("w3", "Parables for the Virtual").with_year(2002).with_author(by(BRIAN)),
                        WorkRecord::new("w2", "Affect and Assemblage")
                            .with_year(2017)
                            .with_author(by(BRIAN))
                            .with_author(by(IAN)),
                    ],
                )
        };
        let spec = Spec::new(Mode::CoWork)
            .with_concepts(["assemblage", "affect", "virtual"])
            .with_scholars([IAN, BRIAN]);

        let first = tokio_test::block_on(compiler_with(source(), MockEnricher::new()).compile(&spec)).unwrap();
        let second = tokio_test::block_on(compiler_with(source(), MockEnricher::new()).compile(&spec)).unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
