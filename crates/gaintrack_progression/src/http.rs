//! REST routes over [`ProgressionService`], mounted by the HTTP binary next to `/mcp`.

use std::sync::Arc;
use std::time::Duration;

use axum::debug_handler;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use gaintrack_client::RepositoryError;

use crate::error::ProgressionError;
use crate::services::ProgressionService;
use crate::types::{ExerciseProgression, SuggestionsReport, WarmupPlan};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AppState {
    pub service: ProgressionService,
    /// `None` when no Prometheus recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

#[derive(Debug, Deserialize)]
pub struct WarmupQuery {
    pub working_weight: f64,
    pub exercise_name: Option<String>,
}

#[debug_handler]
async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[debug_handler]
async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|m| m.render())
        .unwrap_or_default();
    ([("content-type", "text/plain; version=0.0.4")], body)
}

#[debug_handler]
async fn get_suggestions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuggestionsReport>, (StatusCode, String)> {
    state.service.suggestions().await.map(Json).map_err(map_err)
}

#[debug_handler]
async fn get_exercise_progression(
    State(state): State<Arc<AppState>>,
    Path(exercise_name): Path<String>,
) -> Result<Json<ExerciseProgression>, (StatusCode, String)> {
    state
        .service
        .exercise_progression(&exercise_name)
        .await
        .map(Json)
        .map_err(map_err)
}

#[debug_handler]
async fn get_warmup_sets(
    State(state): State<Arc<AppState>>,
    Query(q): Query<WarmupQuery>,
) -> Result<Json<WarmupPlan>, (StatusCode, String)> {
    state
        .service
        .warmup_plan(q.working_weight, q.exercise_name)
        .map(Json)
        .map_err(map_err)
}

pub fn map_err(e: ProgressionError) -> (StatusCode, String) {
    let status = match &e {
        ProgressionError::Repository(
            RepositoryError::Http(_)
            | RepositoryError::Status { .. }
            | RepositoryError::Auth(_)
            | RepositoryError::NotFound(_),
        ) => StatusCode::BAD_GATEWAY,
        ProgressionError::Repository(RepositoryError::Config(_))
        | ProgressionError::Validation(_) => StatusCode::BAD_REQUEST,
        ProgressionError::Repository(RepositoryError::Io(_) | RepositoryError::Decode(_))
        | ProgressionError::Serialization(_)
        | ProgressionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::warn!(%status, error = %e, "request failed");
    }
    (status, e.to_string())
}

/// All REST routes with state applied. `/mcp` is added by the caller.
pub fn router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/progression/suggestions", get(get_suggestions))
        .route(
            "/progression/exercise/{exercise_name}",
            get(get_exercise_progression),
        )
        .route("/workouts/warmup-sets", get(get_warmup_sets))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let (status, body) = map_err(RepositoryError::from_status(503, "down").into());
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.starts_with("repository error"));

        let (status, _) = map_err(RepositoryError::Auth("expired".into()).into());
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn local_and_validation_failures() {
        let io = std::io::Error::other("disk gone");
        let (status, _) = map_err(RepositoryError::Io(io).into());
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = map_err(ProgressionError::Validation("bad".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = map_err(RepositoryError::Config("no url".into()).into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
