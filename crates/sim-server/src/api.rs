//! HTTP API for series generation, health checks and Prometheus metrics

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use sim_lib::{
    config::RangeEntry,
    projector::{self, ChartProjection, DashboardView, MetricKey},
    EngineError, EngineMetrics, EntropySource, FilterSelection, RandomSource, SeededSource,
    Snapshot, SnapshotStore, StructuredLogger, TelemetryEngine, TimeRange,
};
use std::sync::Arc;
use tracing::info;

/// Shared application state
pub struct AppState {
    pub engine: TelemetryEngine,
    pub store: SnapshotStore,
    pub metrics: EngineMetrics,
    pub logger: StructuredLogger,
    /// Fixed seed for every regeneration; entropy when unset
    pub seed: Option<u64>,
}

impl AppState {
    pub fn new(engine: TelemetryEngine, logger: StructuredLogger, seed: Option<u64>) -> Self {
        Self {
            engine: engine.with_logger(logger.clone()),
            store: SnapshotStore::new().with_logger(logger.clone()),
            metrics: EngineMetrics::new(),
            logger,
            seed,
        }
    }

    fn random_source(&self) -> Box<dyn RandomSource + Send> {
        match self.seed {
            Some(seed) => Box::new(SeededSource::new(seed)),
            None => Box::new(EntropySource::new()),
        }
    }

    fn regenerate(&self, selection: &FilterSelection, range: TimeRange) -> Result<Snapshot, ApiError> {
        let mut rng = self.random_source();
        self.engine
            .regenerate_now(selection, range, rng.as_mut())
            .map_err(|e| self.reject(e))
    }

    fn parse_range(&self, range: Option<&str>) -> Result<TimeRange, ApiError> {
        match range {
            None => Ok(TimeRange::default()),
            Some(text) => text.parse().map_err(|e| self.reject(e)),
        }
    }

    fn reject(&self, err: EngineError) -> ApiError {
        if matches!(err, EngineError::InvalidArgument(_)) {
            self.metrics.inc_invalid_requests();
            self.logger.log_invalid_request(&err.to_string());
        }
        ApiError(err)
    }
}

/// Engine error rendered as a JSON body
#[derive(Debug)]
pub struct ApiError(EngineError);

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            EngineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            EngineError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Filter selection and range as query parameters; missing filters mean "All ..."
#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    pub namespace: Option<String>,
    pub service: Option<String>,
    pub workload: Option<String>,
    pub range: Option<String>,
    pub metric: Option<String>,
}

impl SelectionQuery {
    fn selection(&self) -> FilterSelection {
        let defaults = FilterSelection::default();
        FilterSelection::new(
            self.namespace.clone().unwrap_or(defaults.namespace),
            self.service.clone().unwrap_or(defaults.service),
            self.workload.clone().unwrap_or(defaults.workload),
        )
    }
}

/// Body of a dashboard selection change
#[derive(Debug, Deserialize)]
pub struct DashboardUpdate {
    #[serde(default)]
    pub selection: FilterSelection,
    pub range: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardUpdateResponse {
    pub adopted: bool,
    pub generation: u64,
    pub snapshot: Snapshot,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub namespaces: Vec<String>,
    pub services: Vec<String>,
    pub workloads: Vec<String>,
    pub ranges: Vec<RangeEntry>,
    pub metrics: Vec<&'static str>,
    pub views: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    version: &'static str,
}

/// Liveness check
async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthBody {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Generate a fresh snapshot for the query selection
async fn series(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<Snapshot>, ApiError> {
    let range = state.parse_range(query.range.as_deref())?;
    let snapshot = state.regenerate(&query.selection(), range)?;
    Ok(Json(snapshot))
}

/// Generate a series and project it for a metric selector
async fn projection(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<ChartProjection>, ApiError> {
    let range = state.parse_range(query.range.as_deref())?;
    let snapshot = state.regenerate(&query.selection(), range)?;
    let metric = query.metric.as_deref().unwrap_or(MetricKey::Requests.as_str());
    Ok(Json(projector::project(&snapshot.series, metric)))
}

/// Generate a series and project it for a dashboard tab
async fn view(
    State(state): State<Arc<AppState>>,
    Path(view): Path<String>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<ChartProjection>, ApiError> {
    let range = state.parse_range(query.range.as_deref())?;
    let snapshot = state.regenerate(&query.selection(), range)?;
    Ok(Json(projector::project_view(
        &snapshot.series,
        DashboardView::parse_lossy(&view),
    )))
}

/// Currently adopted dashboard snapshot
async fn current_dashboard(State(state): State<Arc<AppState>>) -> Response {
    match state.store.current() {
        Some(snapshot) => (StatusCode::OK, Json(snapshot.as_ref().clone())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "no dashboard selection has been made yet".to_string(),
            }),
        )
            .into_response(),
    }
}

/// Apply a selection change; only the newest request is adopted
async fn update_dashboard(
    State(state): State<Arc<AppState>>,
    Json(update): Json<DashboardUpdate>,
) -> Result<Json<DashboardUpdateResponse>, ApiError> {
    let range = state.parse_range(Some(&update.range))?;
    // A request the engine cannot serve must not supersede one in flight
    state
        .engine
        .bucket_spec(range)
        .map_err(|e| state.reject(e))?;
    let ticket = state.store.begin();
    let snapshot = state.regenerate(&update.selection, range)?;
    let adopted = state.store.commit(ticket, snapshot.clone());

    Ok(Json(DashboardUpdateResponse {
        adopted,
        generation: ticket.generation(),
        snapshot,
    }))
}

/// Filter options and selectors the engine is configured with
async fn catalog(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    let config = state.engine.config();
    Json(CatalogResponse {
        namespaces: config.catalog.namespaces.clone(),
        services: config.catalog.services.clone(),
        workloads: config.catalog.workloads.clone(),
        ranges: config.ranges.clone(),
        metrics: MetricKey::ALL.iter().map(|k| k.as_str()).collect(),
        views: [
            DashboardView::Overview,
            DashboardView::Resources,
            DashboardView::Performance,
        ]
        .iter()
        .map(|v| v.as_str())
        .collect(),
    })
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api/v1/series", get(series))
        .route("/api/v1/projection", get(projection))
        .route("/api/v1/views/:view", get(view))
        .route(
            "/api/v1/dashboard",
            get(current_dashboard).put(update_dashboard),
        )
        .route("/api/v1/catalog", get(catalog))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
