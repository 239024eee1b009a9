// Application state for HTTP handlers
use crate::application::location_service::LocationService;
use crate::application::orchestrator::Orchestrator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub location_service: LocationService,
}
