//! Scholar works listing

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;
use cartograph_common::{
    cache::keys,
    errors::{AppError, Result},
    metrics::{self, RequestMetrics},
    models::{is_scholar_identifier, WorkRecord},
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarWorksResponse {
    pub orcid: String,
    pub count: usize,
    pub fetched_at: DateTime<Utc>,
    pub works: Vec<WorkRecord>,
}

/// List the raw works ORCID holds for one scholar.
///
/// Unlike a compile, an upstream failure here is the caller's answer.
pub async fn list_works(
    State(state): State<AppState>,
    Path(orcid): Path<String>,
) -> Result<Json<ScholarWorksResponse>> {
    let request_metrics = RequestMetrics::start("GET", "/v2/orcid/{orcid}/works");

    let result = fetch_listing(&state, orcid.trim()).await;

    let status = match &result {
        Ok(_) => 200,
        Err(e) => e.status_code().as_u16(),
    };
    request_metrics.finish(status);

    result.map(Json)
}

async fn fetch_listing(state: &AppState, orcid: &str) -> Result<ScholarWorksResponse> {
    if !is_scholar_identifier(orcid) {
        return Err(AppError::InvalidIdentifier {
            identifier: orcid.to_string(),
        });
    }

    let key = keys::scholar_works(orcid);
    if let Some(cache) = &state.cache {
        match cache.get::<ScholarWorksResponse>(&key).await {
            Ok(Some(listing)) => {
                metrics::record_cache(true, "works");
                return Ok(listing);
            }
            Ok(None) => metrics::record_cache(false, "works"),
            Err(e) => tracing::warn!(error = %e, "Works cache lookup failed"),
        }
    }

    let timeout = state.config.request_timeout();
    let works = tokio::time::timeout(timeout, state.works.fetch_works(orcid))
        .await
        .map_err(|_| AppError::Timeout {
            source_name: "works".to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })??;

    tracing::info!(orcid = %orcid, count = works.len(), "Fetched scholar works");

    let listing = ScholarWorksResponse {
        orcid: orcid.to_string(),
        count: works.len(),
        fetched_at: Utc::now(),
        works,
    };

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.set(&key, &listing).await {
            tracing::warn!(error = %e, "Works cache write failed");
        }
    }

    Ok(listing)
}
