//! Gateway server: lookup routes, catalog and health

use crate::error::ApiError;
use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::{header, Method},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rglookup_core::{EntityKind, Error, IdentifierKind, LimitsConfig, LookupConfig, LookupRequest};
use rglookup_graph::{GraphStore, MemoryGraph};
use rglookup_pipeline::{LookupService, QueryCatalog};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared, read-only request state.
pub struct AppState {
    pub lookup: LookupService,
    pub started_at: Instant,
    pub started_wall: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(store: Arc<dyn GraphStore>, limits: &LimitsConfig) -> Self {
        Self {
            lookup: LookupService::new(store, Arc::new(QueryCatalog::standard()), limits),
            started_at: Instant::now(),
            started_wall: chrono::Utc::now(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/lookup/:entity/:scheme/*value", get(lookup_handler))
        .route("/catalog", get(catalog_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
        .with_state(state)
}

/// Build the store, bind, and serve until `shutdown` is cancelled.
pub async fn start_gateway(config: LookupConfig, shutdown: CancellationToken) -> anyhow::Result<()> {
    let graph = Arc::new(MemoryGraph::new());
    if let Some(seed) = &config.store.seed_path {
        graph.load_json(seed)?;
    }
    let nodes = graph.node_count();
    let state = Arc::new(AppState::new(graph, &config.limits));
    let app = router(state);

    let bind_addr: SocketAddr =
        format!("{}:{}", config.gateway.bind.to_addr(), config.gateway.port).parse()?;

    info!("rglookup gateway v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", bind_addr);
    info!("  Lookups:      http://{}/lookup/{{entity}}/{{scheme}}/{{identifier}}", bind_addr);
    info!("  Graph nodes:  {}", nodes);
    info!("  Query timeout: {}ms", config.limits.query_timeout_ms);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("rglookup gateway stopped");
    Ok(())
}

/// `GET /lookup/{entity}/{scheme}/{identifier}`
///
/// The identifier segment arrives percent-decoded. Everything up to the
/// first body byte can still fail with a proper status; after that the
/// response body carries the outcome.
async fn lookup_handler(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(String, String, String)>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path((entity, scheme, value)) =
        path.map_err(|e| Error::invalid_format(format!("identifier could not be decoded: {}", e.body_text())))?;

    let (Some(entity_kind), Some(identifier_kind)) =
        (EntityKind::from_label(&entity), IdentifierKind::from_property(&scheme))
    else {
        return Err(Error::not_found_kind(entity, scheme).into());
    };

    let request = LookupRequest::new(entity_kind, identifier_kind, value);
    let prepared = state.lookup.prepare(&request).await?;
    let body = Body::from_stream(prepared.into_stream());

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

async fn catalog_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "lookups": state.lookup.catalog().entries(),
    }))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_wall.to_rfc3339(),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "lookups": state.lookup.catalog().len(),
        "open_transactions": state.lookup.store().open_transactions(),
    }))
}
