// Dashboard view model - read-only projection of the session for display surfaces
use super::classification::Classification;
use super::location::Location;
use super::reading::{ForecastPoint, HistoricalPoint, PollutantLevel, Reading};
use super::session::{ActiveView, OperationTag, SessionState};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub pollutant: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub active_view: ActiveView,
    pub location: Option<Location>,
    pub current: Option<Reading>,
    pub classification: Option<Classification>,
    pub contributions: Vec<Contribution>,
    pub pollutants: Vec<PollutantLevel>,
    pub forecast: Vec<ForecastPoint>,
    pub historical: Vec<HistoricalPoint>,
    pub loading: BTreeMap<OperationTag, bool>,
    pub errors: BTreeMap<OperationTag, String>,
    pub is_empty: bool,
}

impl DashboardView {
    pub fn from_state(state: &SessionState) -> Self {
        let current = state.current().cloned();
        let classification = current.as_ref().and_then(|r| match r.classification() {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!("Current reading cannot be classified: {}", e);
                None
            }
        });

        let contributions = current
            .as_ref()
            .map(|r| {
                r.ranked_contributions()
                    .into_iter()
                    .map(|(pollutant, percentage)| Contribution { pollutant, percentage })
                    .collect()
            })
            .unwrap_or_default();

        let pollutants = current
            .as_ref()
            .map(Reading::pollutant_levels)
            .unwrap_or_default();

        let loading = OperationTag::ALL
            .iter()
            .map(|tag| (*tag, state.is_loading(*tag)))
            .collect();

        let errors = OperationTag::ALL
            .iter()
            .filter_map(|tag| state.last_error(*tag).map(|e| (*tag, e.to_string())))
            .collect();

        Self {
            active_view: state.active_view(),
            location: state.location().cloned(),
            is_empty: current.is_none(),
            current,
            classification,
            contributions,
            pollutants,
            forecast: state.forecast().to_vec(),
            historical: state.historical().to_vec(),
            loading,
            errors,
        }
    }
}
