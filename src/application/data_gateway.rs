// Gateway trait for remote AQI data access
use crate::domain::location::{KnownLocation, Location};
use crate::domain::pollutants::PollutantInput;
use crate::domain::reading::{ForecastPoint, HistoricalPoint, Reading};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The remote service rejected the inputs.
    #[error("rejected by server: {0}")]
    Validation(String),
}

#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Current reading for a location
    async fn fetch_realtime(&self, location: &Location) -> Result<Reading, GatewayError>;

    /// Hourly forecast seeded with a baseline AQI
    async fn fetch_forecast(
        &self,
        location: &Location,
        baseline_aqi: f64,
    ) -> Result<Vec<ForecastPoint>, GatewayError>;

    /// Daily observed AQI for the last `days` days, oldest first
    async fn fetch_historical(&self, days: u32) -> Result<Vec<HistoricalPoint>, GatewayError>;

    /// Predict AQI from pollutant concentrations
    async fn submit_prediction(&self, pollutants: &PollutantInput) -> Result<Reading, GatewayError>;

    /// Free-text location search. Callers must not send queries shorter than two characters.
    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, GatewayError>;

    async fn list_known_locations(&self) -> Result<Vec<KnownLocation>, GatewayError>;
}
