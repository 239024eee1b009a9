// Domain layer - AQI models, classification and session state
pub mod classification;
pub mod dashboard;
pub mod location;
pub mod pollutants;
pub mod reading;
pub mod session;
