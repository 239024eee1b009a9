// AQI readings and time series
use super::classification::{classify, Classification, InvalidAqi};
use super::location::Location;
use super::pollutants::{is_weather_field, unit_for};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Live,
    Predicted,
}

/// A point-in-time AQI observation or prediction result.
///
/// Category, color and advice are derived on demand by [`Reading::classification`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub aqi: f64,
    pub location: Option<Location>,
    pub timestamp: DateTime<Utc>,
    pub origin: Origin,
    #[serde(default)]
    pub pollutants: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributions: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantLevel {
    pub name: String,
    pub value: f64,
    pub unit: &'static str,
}

impl Reading {
    pub fn classification(&self) -> Result<Classification, InvalidAqi> {
        classify(self.aqi)
    }

    /// Contribution percentages, largest first.
    pub fn ranked_contributions(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .contributions
            .iter()
            .flatten()
            .map(|(name, pct)| (name.clone(), *pct))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Pollutant concentrations with units, weather parameters excluded.
    pub fn pollutant_levels(&self) -> Vec<PollutantLevel> {
        self.pollutants
            .iter()
            .filter(|(name, _)| !is_weather_field(name))
            .map(|(name, value)| PollutantLevel {
                name: name.clone(),
                value: *value,
                unit: unit_for(name),
            })
            .collect()
    }
}

#[cfg(test)]
impl Reading {
    pub fn live(aqi: f64, location: Location) -> Self {
        Self {
            aqi,
            location: Some(location),
            timestamp: Utc::now(),
            origin: Origin::Live,
            pollutants: BTreeMap::new(),
            contributions: None,
        }
    }

    pub fn predicted(aqi: f64) -> Self {
        Self {
            aqi,
            location: None,
            timestamp: Utc::now(),
            origin: Origin::Predicted,
            pollutants: BTreeMap::new(),
            contributions: None,
        }
    }

    pub fn with_pollutants(mut self, pollutants: BTreeMap<String, f64>) -> Self {
        self.pollutants = pollutants;
        self
    }

    pub fn with_contributions(mut self, contributions: BTreeMap<String, f64>) -> Self {
        self.contributions = Some(contributions);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub label: String,
    pub aqi: f64,
}

impl ForecastPoint {
    pub fn new(label: impl Into<String>, aqi: f64) -> Self {
        Self {
            label: label.into(),
            aqi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: String,
    pub aqi: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[cfg(test)]
impl HistoricalPoint {
    pub fn new(date: impl Into<String>, aqi: f64) -> Self {
        Self {
            date: date.into(),
            aqi,
            min: None,
            max: None,
        }
    }
}
