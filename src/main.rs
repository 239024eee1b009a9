// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::application::data_gateway::DataGateway;
use crate::application::location_service::LocationService;
use crate::application::orchestrator::Orchestrator;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_gateway::HttpGateway;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    export_session, get_session, health_check, list_locations, refresh, refresh_forecast,
    search_locations, select_location, submit_prediction, switch_view,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_app_config()?;

    // Create gateway (infrastructure layer)
    let gateway: Arc<dyn DataGateway> = Arc::new(HttpGateway::new(
        config.gateway.base_url.clone(),
        Duration::from_secs(config.gateway.timeout_secs),
    )?);

    // Create services (application layer)
    let orchestrator = Arc::new(Orchestrator::new(
        gateway.clone(),
        config.session.orchestrator_settings(),
        config.session.default_location.clone(),
    ));
    let location_service = LocationService::new(gateway);

    // Initial load runs in the background; the session serves its empty state meanwhile
    let initial = orchestrator.clone();
    tokio::spawn(async move { initial.initial_load().await });

    let state = Arc::new(AppState {
        orchestrator,
        location_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/session", get(get_session))
        .route("/session/location", post(select_location))
        .route("/session/prediction", post(submit_prediction))
        .route("/session/view", post(switch_view))
        .route("/session/refresh", post(refresh))
        .route("/session/forecast", post(refresh_forecast))
        .route("/session/export", get(export_session))
        .route("/locations", get(list_locations))
        .route("/locations/search", get(search_locations))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting aqi-monitor on {} (backend {})", addr, config.gateway.base_url);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
