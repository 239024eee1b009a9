// Presentation layer - HTTP surface over the orchestrator
pub mod app_state;
pub mod handlers;
