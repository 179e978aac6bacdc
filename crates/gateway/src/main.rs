//! Cartograph API Gateway
//!
//! HTTP seam in front of the graph compiler.
//! Handles:
//! - Catalog resolution of scholar names and concept aliases
//! - Compiled graph caching
//! - Rate limiting
//! - Observability (logging, metrics)

mod handlers;
mod middleware;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use cartograph_common::{
    cache::Cache,
    catalog::Catalog,
    config::AppConfig,
    metrics::{self, COMPILE_BUCKETS, METRICS_PREFIX},
    sources::{create_http_sources, ScholarLookup, WorkSource},
};
use cartograph_compiler::Compiler;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use middleware::rate_limit::{create_rate_limiter, rate_limit_middleware, ApiRateLimiter};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub compiler: Compiler,
    /// Raw works listing for the ORCID endpoint
    pub works: Arc<dyn WorkSource>,
    pub catalog: Arc<Catalog>,
    /// Name search for scholars missing from the catalog
    pub lookup: Arc<dyn ScholarLookup>,
    pub cache: Option<Arc<Cache>>,
    pub metrics: Option<PrometheusHandle>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    init_tracing(&config);
    info!("Starting Cartograph API Gateway v{}", cartograph_common::VERSION);

    // Initialize metrics
    let metrics_handle = install_metrics_exporter()?;
    metrics::register_metrics();
    spawn_metrics_upkeep(metrics_handle.clone());

    // External sources and the compiler on top of them
    let sources = create_http_sources(&config.sources)?;
    let compiler = Compiler::from_sources(&sources);

    let catalog = Catalog::load(&config.catalog).await?;

    // The cache is optional; a dead Redis only costs recompiles
    let cache = match Cache::from_settings(&config.cache).await {
        Ok(cache) => cache.map(Arc::new),
        Err(e) => {
            warn!(error = %e, "Cache unavailable, continuing without it");
            None
        }
    };
    info!(enabled = cache.is_some(), "Graph cache configured");

    let limiter = config
        .rate_limit
        .enabled
        .then(|| create_rate_limiter(config.rate_limit.requests_per_second, config.rate_limit.burst));

    // Create app state
    let state = AppState {
        config: config.clone(),
        compiler,
        works: sources.works.clone(),
        catalog: Arc::new(catalog),
        lookup: sources.lookup.clone(),
        cache,
        metrics: Some(metrics_handle),
    };

    if config.observability.metrics_port != 0 {
        spawn_metrics_listener(state.clone(), config.observability.metrics_port).await?;
    }

    // Build the router
    let app = create_router(state, limiter);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn install_metrics_exporter() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_compile_duration_seconds", METRICS_PREFIX)),
            COMPILE_BUCKETS,
        )?
        .install_recorder()
}

/// Histograms are drained by upkeep, not by scrapes.
fn spawn_metrics_upkeep(handle: PrometheusHandle) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            handle.run_upkeep();
        }
    });
}

/// Serve `/metrics` on its own port as well
async fn spawn_metrics_listener(state: AppState, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let app = Router::new()
        .route("/metrics", get(handlers::metrics::metrics))
        .with_state(state);

    info!("Metrics listening on {}", addr);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!(error = %e, "Metrics listener stopped");
        }
    });
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState, limiter: Option<Arc<ApiRateLimiter>>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Probes stay outside the rate limit
    let probes = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready));

    let mut api_routes = Router::new()
        .route("/cartography/compile", post(handlers::cartography::compile))
        .route("/orcid/{orcid}/works", get(handlers::works::list_works));

    if let Some(limiter) = limiter {
        api_routes = api_routes.route_layer(from_fn_with_state(limiter, rate_limit_middleware));
    }

    // Compose the app
    Router::new()
        .nest("/v2", probes.merge(api_routes))
        .route("/metrics", get(handlers::metrics::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
