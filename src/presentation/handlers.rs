// HTTP request handlers - event dispatch and read-only session views
use crate::application::exporter::ExportError;
use crate::application::location_service::SearchError;
use crate::domain::dashboard::DashboardView;
use crate::domain::location::Location;
use crate::domain::pollutants::PollutantInput;
use crate::domain::session::ActiveView;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ViewRequest {
    pub view: ActiveView,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (status, Json(ErrorResponse { error: error.to_string() })).into_response()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current dashboard view
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.orchestrator.dashboard())
}

pub async fn select_location(
    State(state): State<Arc<AppState>>,
    Json(location): Json<Location>,
) -> Json<DashboardView> {
    state.orchestrator.select_location(location).await;
    Json(state.orchestrator.dashboard())
}

/// Manual prediction; 422 with per-field violations when the input is invalid
pub async fn submit_prediction(
    State(state): State<Arc<AppState>>,
    Json(input): Json<PollutantInput>,
) -> Response {
    match state.orchestrator.submit_prediction(input).await {
        Ok(()) => Json(state.orchestrator.dashboard()).into_response(),
        Err(e) => (StatusCode::UNPROCESSABLE_ENTITY, Json(e)).into_response(),
    }
}

pub async fn switch_view(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ViewRequest>,
) -> Json<DashboardView> {
    state.orchestrator.switch_view(request.view).await;
    Json(state.orchestrator.dashboard())
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    state.orchestrator.refresh().await;
    Json(state.orchestrator.dashboard())
}

pub async fn refresh_forecast(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    state.orchestrator.refresh_forecast().await;
    Json(state.orchestrator.dashboard())
}

pub async fn export_session(State(state): State<Arc<AppState>>) -> Response {
    match state.orchestrator.export() {
        Ok(document) => ([(header::CONTENT_TYPE, "application/json")], document).into_response(),
        Err(e @ ExportError::NothingToExport) => error_response(StatusCode::CONFLICT, e),
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

pub async fn list_locations(State(state): State<Arc<AppState>>) -> Response {
    match state.location_service.known_locations().await {
        Ok(locations) => Json(locations).into_response(),
        Err(e) => {
            tracing::warn!("Error fetching known locations: {}", e);
            error_response(StatusCode::BAD_GATEWAY, e)
        }
    }
}

pub async fn search_locations(
    Query(query): Query<SearchQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.location_service.search(&query.q).await {
        Ok(locations) => Json(locations).into_response(),
        Err(SearchError::Validation(e)) => (StatusCode::UNPROCESSABLE_ENTITY, Json(e)).into_response(),
        Err(SearchError::Gateway(e)) => {
            tracing::warn!("Location search failed: {}", e);
            error_response(StatusCode::BAD_GATEWAY, e)
        }
    }
}
