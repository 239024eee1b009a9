// Location service - Use cases for finding and listing locations
use crate::application::data_gateway::{DataGateway, GatewayError};
use crate::domain::location::{KnownLocation, Location};
use crate::domain::pollutants::ValidationError;
use std::sync::Arc;
use thiserror::Error;

const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Clone)]
pub struct LocationService {
    gateway: Arc<dyn DataGateway>,
}

impl LocationService {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self { gateway }
    }

    /// Queries shorter than two characters are rejected without reaching the gateway.
    pub async fn search(&self, query: &str) -> Result<Vec<Location>, SearchError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(ValidationError::single(
                "query",
                format!("must be at least {} characters", MIN_QUERY_CHARS),
            )
            .into());
        }

        let results = self.gateway.search_locations(query).await?;
        tracing::debug!("Location search {:?} matched {} places", query, results.len());
        Ok(results)
    }

    pub async fn known_locations(&self) -> Result<Vec<KnownLocation>, GatewayError> {
        self.gateway.list_known_locations().await
    }
}
