use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    aggregator::MetricsAggregator,
    config::Config,
    metrics::{self, RequestTimer},
    models::{FormattedMetrics, HealthResponse, NetworkSample, PodList, PodStatuses},
    parser,
    upstream::{queries, MetricsClient, QuerySource},
    DashboardError, Result,
};

const INDEX_HTML: &str = include_str!("../../templates/index.html");

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: Arc<dyn QuerySource>,
    pub aggregator: MetricsAggregator,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn QuerySource>) -> Self {
        Self {
            config: Arc::new(config),
            aggregator: MetricsAggregator::new(source.clone()),
            source,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/metrics", get(get_metrics))
        .route("/status", get(get_status))
        .route("/pods", get(get_pods))
        .route("/network/:pod", get(get_network_traffic))
        .route("/healthz", get(health))
        .route("/internal/metrics", get(internal_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn get_metrics(State(state): State<AppState>) -> Result<Json<FormattedMetrics>> {
    let _timer = RequestTimer::new("metrics");

    let queries = queries::resource_queries(&state.config.namespace);
    let metrics = state.aggregator.collect(&queries).await?;
    info!(workers = metrics.len(), "Collected pod metrics");

    Ok(Json(metrics))
}

async fn get_status(State(state): State<AppState>) -> Json<PodStatuses> {
    let _timer = RequestTimer::new("status");

    let query = queries::status_query(&state.config.namespace);
    let envelope = state.source.fetch_or_empty(&query).await;

    Json(parser::parse_pod_statuses(&envelope))
}

async fn get_pods(State(state): State<AppState>) -> Json<PodList> {
    let _timer = RequestTimer::new("pods");

    let query = queries::pods_query(&state.config.namespace);
    let envelope = state.source.fetch_or_empty(&query).await;

    Json(PodList {
        pods: parser::parse_pod_names(&envelope),
    })
}

async fn get_network_traffic(
    State(state): State<AppState>,
    Path(pod): Path<String>,
) -> Result<Json<Vec<NetworkSample>>> {
    let _timer = RequestTimer::new("network");

    let query = queries::pod_network_query(&state.config.namespace, &pod);
    let envelope = state.source.fetch_or_empty(&query).await;
    let samples = parser::parse_network_samples(&envelope, "network_traffic")?;

    Ok(Json(samples))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        namespace: state.config.namespace.clone(),
    })
}

async fn internal_metrics() -> Result<impl IntoResponse> {
    let body = metrics::render().map_err(|e| {
        DashboardError::Internal(format!("Failed to encode metrics: {}", e))
    })?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}

pub async fn start_dashboard(config: Config) -> Result<()> {
    let client = MetricsClient::new(&config.prometheus_url).map_err(|e| {
        DashboardError::Internal(format!("Failed to build HTTP client: {}", e))
    })?;

    let addr = config.listen_addr();
    info!(
        prometheus_url = %config.prometheus_url,
        namespace = %config.namespace,
        "Starting dashboard on {}",
        addr
    );

    let app = router(AppState::new(config, Arc::new(client)));

    let listener = TcpListener::bind(&addr).await.map_err(|e|
        DashboardError::Internal(format!("Failed to bind to address: {}", e)))?;

    axum::serve(listener, app).await.map_err(|e|
        DashboardError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
