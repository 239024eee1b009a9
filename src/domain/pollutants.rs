// Pollutant concentrations and input validation
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Pollutants the prediction service requires, in display order.
pub const REQUIRED_POLLUTANTS: [&str; 6] = ["PM2.5", "PM10", "NO2", "SO2", "CO", "O3"];

/// Weather parameters that may travel with a concentration map but are not pollutants.
pub const WEATHER_FIELDS: [&str; 4] = ["Temperature", "Humidity", "Wind_Speed", "Pressure"];

pub fn is_weather_field(name: &str) -> bool {
    WEATHER_FIELDS.contains(&name)
}

/// Unit implied by the pollutant name.
pub fn unit_for(pollutant: &str) -> &'static str {
    match pollutant {
        "CO" => "mg/m³",
        _ => "μg/m³",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Bad user input, caught before anything is sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation::new(field, reason)],
        }
    }

    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, v) in self.violations.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{} {}", sep, v.field, v.reason)?;
        }
        Ok(())
    }
}

/// Concentrations entered for a manual prediction, keyed by pollutant name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollutantInput(BTreeMap<String, f64>);

impl PollutantInput {
    /// Every required pollutant must be present and every value must be a
    /// finite, non-negative number. All offending fields are reported at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations: Vec<FieldViolation> = REQUIRED_POLLUTANTS
            .iter()
            .filter(|name| !self.0.contains_key(**name))
            .map(|name| FieldViolation::new(*name, "is required"))
            .collect();

        for (name, value) in &self.0 {
            if !value.is_finite() {
                violations.push(FieldViolation::new(name, "must be a number"));
            } else if *value < 0.0 {
                violations.push(FieldViolation::new(name, "must not be negative"));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

#[cfg(test)]
impl PollutantInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pollutant: impl Into<String>, value: f64) -> Self {
        self.0.insert(pollutant.into(), value);
        self
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.0
    }
}

impl From<BTreeMap<String, f64>> for PollutantInput {
    fn from(map: BTreeMap<String, f64>) -> Self {
        Self(map)
    }
}
