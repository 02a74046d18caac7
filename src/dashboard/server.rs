//! HTTP server implementation for the web dashboard.
//!
//! This module provides the axum-based HTTP server that serves the two-pane
//! page, the htmx fragments it refreshes, and the JSON API.

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::query::FilterParams;
use super::render;
use crate::config::{DisplayConfig, UiConfig};
use crate::data::{DatasetStore, build_view, filter_options};
use crate::types::FilterState;

/// Query pairs in request order; repeated keys are kept.
type QueryPairs = Query<Vec<(String, String)>>;

/// Dashboard server state shared across handlers.
#[derive(Clone)]
pub struct DashboardServer {
    /// Current dataset snapshot holder.
    store: Arc<DatasetStore>,
    /// Initial toggle state for sessions without a query.
    display: Arc<DisplayConfig>,
}

impl DashboardServer {
    pub fn new(store: Arc<DatasetStore>, display: Arc<DisplayConfig>) -> Self {
        Self { store, display }
    }

    fn filter(&self, pairs: Vec<(String, String)>) -> FilterState {
        FilterParams::from_pairs(pairs).into_filter(&self.display)
    }
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    projects: usize,
    tasks: usize,
}

/// Root endpoint - the full two-pane page for the query's selection.
async fn root(State(state): State<DashboardServer>, Query(query): QueryPairs) -> Html<String> {
    let filter = state.filter(query);
    let dataset = state.store.snapshot();
    let view = build_view(&dataset, &filter);
    Html(render::render_page(&view, &filter_options(&dataset)))
}

/// KPI cards fragment.
async fn api_kpis(State(state): State<DashboardServer>) -> Html<String> {
    let dataset = state.store.snapshot();
    Html(render::render_kpis(&crate::data::kpis(&dataset.projects)))
}

/// Project pane fragment.
async fn api_projects(
    State(state): State<DashboardServer>,
    Query(query): QueryPairs,
) -> Html<String> {
    let filter = state.filter(query);
    let dataset = state.store.snapshot();
    Html(render::render_projects(&build_view(&dataset, &filter)))
}

/// Task pane fragment.
async fn api_tasks(State(state): State<DashboardServer>, Query(query): QueryPairs) -> Html<String> {
    let filter = state.filter(query);
    let dataset = state.store.snapshot();
    Html(render::render_tasks(&build_view(&dataset, &filter)))
}

/// Sidebar form fragment.
async fn api_filters(
    State(state): State<DashboardServer>,
    Query(query): QueryPairs,
) -> Html<String> {
    let filter = state.filter(query);
    let dataset = state.store.snapshot();
    Html(render::render_filters(&filter_options(&dataset), &filter))
}

/// Selection summary fragment: resolved keys, task count, permalink.
async fn api_selection(
    State(state): State<DashboardServer>,
    Query(query): QueryPairs,
) -> Html<String> {
    let filter = state.filter(query);
    let dataset = state.store.snapshot();
    Html(render::render_selection(&build_view(&dataset, &filter)))
}

/// Full view as JSON.
async fn api_view(State(state): State<DashboardServer>, Query(query): QueryPairs) -> Response {
    let filter = state.filter(query);
    let dataset = state.store.snapshot();
    let view = build_view(&dataset, &filter);
    match serde_json::to_value(&view) {
        Ok(value) => Json(value).into_response(),
        Err(e) => {
            error!("Failed to serialize dashboard view: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Selector choices as JSON.
async fn api_options(State(state): State<DashboardServer>) -> impl IntoResponse {
    let dataset = state.store.snapshot();
    Json(filter_options(&dataset))
}

/// Health check endpoint.
async fn health(State(state): State<DashboardServer>) -> impl IntoResponse {
    let dataset = state.store.snapshot();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        projects: dataset.projects.len(),
        tasks: dataset.tasks.len(),
    })
}

/// API root - returns available endpoints.
async fn api_root() -> impl IntoResponse {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "view": "/api/view",
            "options": "/api/options",
            "fragments": ["/api/kpis", "/api/projects", "/api/tasks", "/api/filters", "/api/selection"],
        }
    }))
}

/// Build the router with all routes.
pub fn build_router(state: DashboardServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        // htmx fragment routes
        .route("/api/kpis", get(api_kpis))
        .route("/api/projects", get(api_projects))
        .route("/api/tasks", get(api_tasks))
        .route("/api/filters", get(api_filters))
        .route("/api/selection", get(api_selection))
        // JSON routes
        .route("/api/view", get(api_view))
        .route("/api/options", get(api_options))
        .route("/api", get(api_root))
        .route("/api/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle for stopping the dashboard server.
pub struct DashboardHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl DashboardHandle {
    /// Trigger shutdown of the dashboard server.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Start the HTTP server on the specified port.
///
/// Returns a oneshot sender that can be used to signal shutdown,
/// and the actual address the server is bound to. Port 0 binds an
/// ephemeral port.
pub async fn start_server(
    store: Arc<DatasetStore>,
    display: Arc<DisplayConfig>,
    port: u16,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let state = DashboardServer::new(store, display);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Dashboard server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
        {
            error!("Dashboard server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}

/// Next retry delay: multiply, then cap.
fn next_delay_ms(current_ms: u64, multiplier: f64, max_ms: u64) -> u64 {
    ((current_ms as f64 * multiplier) as u64).min(max_ms)
}

/// Start the HTTP server with automatic retry on failure.
///
/// Never fails: if the port is in use it retries in the background with
/// exponential backoff. Returns a handle to stop the dashboard.
pub fn start_server_with_retry(
    store: Arc<DatasetStore>,
    ui_config: &UiConfig,
    display: Arc<DisplayConfig>,
) -> DashboardHandle {
    let port = ui_config.port;
    let retry_initial_ms = ui_config.retry_initial_ms;
    let retry_max_ms = ui_config.retry_max_ms;
    let retry_multiplier = ui_config.retry_multiplier;

    let (handle_shutdown_tx, mut handle_shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let mut current_delay_ms = retry_initial_ms;

        loop {
            match handle_shutdown_rx.try_recv() {
                Ok(()) | Err(oneshot::error::TryRecvError::Closed) => {
                    info!("Dashboard retry loop shutting down");
                    break;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
            }

            match start_server(Arc::clone(&store), Arc::clone(&display), port).await {
                Ok((server_shutdown_tx, bound_addr)) => {
                    info!("Dashboard available at http://{}", bound_addr);

                    let _ = (&mut handle_shutdown_rx).await;
                    info!("Dashboard handle shutdown received");
                    let _ = server_shutdown_tx.send(());
                    break;
                }
                Err(e) => {
                    warn!(
                        "Failed to start dashboard on port {}: {}. Retrying in {:.1}s...",
                        port,
                        e,
                        current_delay_ms as f64 / 1000.0
                    );

                    tokio::select! {
                        _ = tokio::time::sleep(Duration::from_millis(current_delay_ms.max(1))) => {}
                        _ = &mut handle_shutdown_rx => {
                            info!("Dashboard retry loop shutting down");
                            break;
                        }
                    }

                    current_delay_ms = next_delay_ms(current_delay_ms, retry_multiplier, retry_max_ms);
                }
            }
        }
    });

    DashboardHandle {
        shutdown_tx: Some(handle_shutdown_tx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
            projects: 3,
            tasks: 7,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("\"tasks\":7"));
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(next_delay_ms(5_000, 2.0, 60_000), 10_000);
        assert_eq!(next_delay_ms(40_000, 2.0, 60_000), 60_000);
        assert_eq!(next_delay_ms(60_000, 2.0, 60_000), 60_000);
    }
}
