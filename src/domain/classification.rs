// AQI classification - the single breakpoint table for category, color and advice
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid AQI value: {0} (must be a non-negative number)")]
pub struct InvalidAqi(pub f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

/// Upper bound (inclusive) of each category, in rank order. Anything above the
/// last bound is Hazardous.
const BREAKPOINTS: [(f64, AqiCategory); 5] = [
    (50.0, AqiCategory::Good),
    (100.0, AqiCategory::Moderate),
    (150.0, AqiCategory::UnhealthyForSensitiveGroups),
    (200.0, AqiCategory::Unhealthy),
    (300.0, AqiCategory::VeryUnhealthy),
];

impl AqiCategory {
    pub fn from_aqi(aqi: f64) -> Result<Self, InvalidAqi> {
        if aqi.is_nan() || aqi < 0.0 {
            return Err(InvalidAqi(aqi));
        }

        Ok(BREAKPOINTS
            .iter()
            .find(|(upper, _)| aqi <= *upper)
            .map(|(_, category)| *category)
            .unwrap_or(AqiCategory::Hazardous))
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    pub fn severity_rank(&self) -> u8 {
        match self {
            AqiCategory::Good => 0,
            AqiCategory::Moderate => 1,
            AqiCategory::UnhealthyForSensitiveGroups => 2,
            AqiCategory::Unhealthy => 3,
            AqiCategory::VeryUnhealthy => 4,
            AqiCategory::Hazardous => 5,
        }
    }

    /// Presentation-neutral color token; renderers map it to their palette.
    pub fn color_token(&self) -> &'static str {
        match self {
            AqiCategory::Good => "good",
            AqiCategory::Moderate => "moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "sensitive",
            AqiCategory::Unhealthy => "unhealthy",
            AqiCategory::VeryUnhealthy => "very-unhealthy",
            AqiCategory::Hazardous => "hazardous",
        }
    }

    pub fn hex_color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#10b981",
            AqiCategory::Moderate => "#fbbf24",
            AqiCategory::UnhealthyForSensitiveGroups => "#fb923c",
            AqiCategory::Unhealthy => "#ef4444",
            AqiCategory::VeryUnhealthy => "#a855f7",
            AqiCategory::Hazardous => "#7c2d12",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AqiCategory::Good => {
                "Air quality is satisfactory, and air pollution poses little or no risk."
            }
            AqiCategory::Moderate => {
                "Air quality is acceptable. However, there may be a risk for some people."
            }
            AqiCategory::UnhealthyForSensitiveGroups => {
                "Members of sensitive groups may experience health effects."
            }
            AqiCategory::Unhealthy => "Everyone may begin to experience health effects.",
            AqiCategory::VeryUnhealthy => {
                "Health alert: everyone may experience serious health effects."
            }
            AqiCategory::Hazardous => {
                "Health warning of emergency conditions. The entire population is affected."
            }
        }
    }

    pub fn health_advice(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Enjoy outdoor activities!",
            AqiCategory::Moderate => {
                "Sensitive individuals should consider limiting prolonged outdoor exertion."
            }
            AqiCategory::UnhealthyForSensitiveGroups => {
                "Children, elderly, and people with respiratory issues should limit outdoor activities."
            }
            AqiCategory::Unhealthy => {
                "Avoid prolonged outdoor exertion. Wear a mask if going outside."
            }
            AqiCategory::VeryUnhealthy => {
                "Avoid all outdoor activities. Keep windows closed. Use air purifiers."
            }
            AqiCategory::Hazardous => "Stay indoors. Seal windows and doors. Evacuate if advised.",
        }
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            AqiCategory::Good => &[
                "Enjoy all outdoor activities!",
                "Perfect time for exercise and sports.",
                "Open windows to air out your home.",
            ],
            AqiCategory::Moderate => &[
                "Generally safe for most people.",
                "Sensitive individuals should limit prolonged outdoor exertion.",
                "Monitor your symptoms if you are unusually sensitive.",
            ],
            AqiCategory::UnhealthyForSensitiveGroups => &[
                "Sensitive groups should reduce heavy outdoor exertion.",
                "Children and the elderly should limit time outdoors.",
                "Consider indoor activities or wear a mask if going outside.",
                "Keep windows closed if air quality deteriorates.",
            ],
            AqiCategory::Unhealthy => &[
                "Avoid prolonged outdoor physical activities.",
                "Keep windows and doors closed.",
                "Use air purifiers indoors if available.",
                "Wear N95/KN95 masks if you must go outside.",
            ],
            AqiCategory::VeryUnhealthy => &[
                "Avoid all outdoor physical activities.",
                "Keep windows and doors closed at all times.",
                "Use air purifiers indoors if available.",
                "Wear N95/KN95 masks if you must go outside.",
                "Monitor health symptoms closely and seek medical advice if needed.",
            ],
            AqiCategory::Hazardous => &[
                "Stay indoors and keep activity levels low.",
                "Seal windows and doors; run air purifiers continuously.",
                "Wear N95/KN95 masks if you must go outside.",
                "Follow evacuation advice from local authorities.",
                "Seek medical attention for breathing difficulty or chest pain.",
            ],
        }
    }

    pub fn activities(&self) -> ActivitySafety {
        match self.severity_rank() {
            0 => ActivitySafety {
                outdoor_exercise: true,
                children_outdoor: true,
                open_windows: true,
                sensitive_groups_outdoor: true,
            },
            1 => ActivitySafety {
                outdoor_exercise: true,
                children_outdoor: true,
                open_windows: true,
                sensitive_groups_outdoor: false,
            },
            _ => ActivitySafety::default(),
        }
    }
}

/// Whether everyday activities are considered safe at a given AQI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySafety {
    pub outdoor_exercise: bool,
    pub children_outdoor: bool,
    pub open_windows: bool,
    pub sensitive_groups_outdoor: bool,
}

#[cfg(test)]
impl ActivitySafety {
    pub fn all_safe(&self) -> bool {
        self.outdoor_exercise && self.children_outdoor && self.open_windows && self.sensitive_groups_outdoor
    }

    pub fn none_safe(&self) -> bool {
        !(self.outdoor_exercise || self.children_outdoor || self.open_windows || self.sensitive_groups_outdoor)
    }
}

/// Everything a display surface needs to render an AQI value. Always derived
/// from the number via [`classify`]; never stored alongside a reading.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub aqi: f64,
    pub category: AqiCategory,
    pub label: &'static str,
    pub severity_rank: u8,
    pub color: &'static str,
    pub hex_color: &'static str,
    pub description: &'static str,
    pub health_advice: &'static str,
    pub recommendations: &'static [&'static str],
    pub activities: ActivitySafety,
}

pub fn classify(aqi: f64) -> Result<Classification, InvalidAqi> {
    let category = AqiCategory::from_aqi(aqi)?;
    Ok(Classification {
        aqi,
        category,
        label: category.label(),
        severity_rank: category.severity_rank(),
        color: category.color_token(),
        hex_color: category.hex_color(),
        description: category.description(),
        health_advice: category.health_advice(),
        recommendations: category.recommendations(),
        activities: category.activities(),
    })
}
