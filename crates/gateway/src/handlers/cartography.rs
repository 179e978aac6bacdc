//! Cartography compile handler

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use cartograph_common::{
    cache::{keys, spec_fingerprint},
    errors::{AppError, Result},
    metrics::{self, RequestMetrics},
    models::{Graph, Spec, YearWindow},
};

/// Compile request: a spec plus transport-only options
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    /// `concept_comparison`, `lineage` or `co_work`; checked by the compiler
    #[serde(default)]
    pub mode: Option<String>,

    /// Concept terms or catalog aliases
    #[serde(default)]
    #[validate(length(max = 50))]
    pub concepts: Vec<String>,

    /// ORCID iDs or catalog names
    #[serde(default)]
    #[validate(length(max = 50))]
    pub scholars: Vec<String>,

    #[serde(default)]
    pub years: YearWindow,

    #[serde(default)]
    pub min_concept_freq: Option<u32>,

    /// Skip the graph cache for this request
    #[serde(default)]
    pub no_cache: bool,
}

impl CompileRequest {
    /// Resolve catalog names/aliases into the spec the compiler sees.
    /// Scholar names the catalog lacks go through the scholar lookup.
    async fn into_spec(self, state: &AppState) -> Spec {
        let scholars = state
            .catalog
            .resolve_scholars_with(&self.scholars, state.lookup.as_ref())
            .await;

        Spec {
            mode: self.mode,
            concepts: self
                .concepts
                .iter()
                .map(|c| state.catalog.canonical_concept(c))
                .collect(),
            scholars,
            years: self.years,
            min_concept_freq: self.min_concept_freq,
        }
    }
}

/// Compile a spec into a graph
pub async fn compile(
    State(state): State<AppState>,
    Json(request): Json<CompileRequest>,
) -> Result<Json<Graph>> {
    let request_metrics = RequestMetrics::start("POST", "/v2/cartography/compile");

    let result = compile_request(&state, request).await;

    let status = match &result {
        Ok(_) => 200,
        Err(e) => e.status_code().as_u16(),
    };
    request_metrics.finish(status);

    result.map(Json)
}

async fn compile_request(state: &AppState, request: CompileRequest) -> Result<Graph> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let use_cache = !request.no_cache;
    let spec = request.into_spec(state).await;

    let cache = state.cache.as_ref().filter(|_| use_cache);
    let cache_key = match cache {
        Some(_) => Some(keys::compiled_graph(&spec_fingerprint(&spec)?)),
        None => None,
    };

    if let (Some(cache), Some(key)) = (cache, cache_key.as_deref()) {
        match cache.get::<Graph>(key).await {
            Ok(Some(graph)) => {
                metrics::record_cache(true, "graph");
                return Ok(graph);
            }
            Ok(None) => metrics::record_cache(false, "graph"),
            Err(e) => tracing::warn!(error = %e, "Graph cache lookup failed"),
        }
    }

    let timeout = state.config.request_timeout();
    let graph = tokio::time::timeout(timeout, state.compiler.compile(&spec))
        .await
        .map_err(|_| AppError::Timeout {
            source_name: "compile".to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })??;

    if let (Some(cache), Some(key)) = (cache, cache_key.as_deref()) {
        if let Err(e) = cache.set(key, &graph).await {
            tracing::warn!(error = %e, "Graph cache write failed");
        }
    }

    Ok(graph)
}
