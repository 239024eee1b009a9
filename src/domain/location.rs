// Location domain model
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A place the user can select. Two locations are the same place when their
/// coordinates match; without coordinates on both sides, name and country decide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: None,
            state: None,
            coordinates: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    #[cfg(test)]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.coordinates = Some(Coordinates { lat, lon });
        self
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        match (self.coordinates, other.coordinates) {
            (Some(a), Some(b)) => a == b,
            _ => self.name == other.name && self.country == other.country,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(state) = &self.state {
            write!(f, ", {}", state)?;
        }
        if let Some(country) = &self.country {
            write!(f, ", {}", country)?;
        }
        Ok(())
    }
}

/// Entry of the known-locations list, optionally with the last AQI seen there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownLocation {
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_aqi: Option<f64>,
}
