// Application layer - Use cases and the gateway boundary
pub mod data_gateway;
pub mod exporter;
pub mod location_service;
pub mod orchestrator;

#[cfg(test)]
pub mod fake_gateway;
