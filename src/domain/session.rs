// Session state - the single in-memory model the orchestrator mutates
use super::location::Location;
use super::reading::{ForecastPoint, HistoricalPoint, Origin, Reading};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One kind of remote operation. Loading flags, errors and request ordering are tracked per tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationTag {
    Realtime,
    Forecast,
    Historical,
    Prediction,
}

impl OperationTag {
    pub const ALL: [OperationTag; 4] = [
        OperationTag::Realtime,
        OperationTag::Forecast,
        OperationTag::Historical,
        OperationTag::Prediction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationTag::Realtime => "realtime",
            OperationTag::Forecast => "forecast",
            OperationTag::Historical => "historical",
            OperationTag::Prediction => "prediction",
        }
    }
}

impl fmt::Display for OperationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveView {
    #[default]
    Realtime,
    Prediction,
    Historical,
}

/// Handed out by [`SessionState::begin_load`]; a result is only applied if its
/// ticket is still the latest issued for the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub tag: OperationTag,
    pub seq: u64,
}

/// Successful result of one operation.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Realtime(Reading),
    Forecast(Vec<ForecastPoint>),
    Historical(Vec<HistoricalPoint>),
    Prediction(Reading),
}

impl LoadOutcome {
    pub fn tag(&self) -> OperationTag {
        match self {
            LoadOutcome::Realtime(_) => OperationTag::Realtime,
            LoadOutcome::Forecast(_) => OperationTag::Forecast,
            LoadOutcome::Historical(_) => OperationTag::Historical,
            LoadOutcome::Prediction(_) => OperationTag::Prediction,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    location: Option<Location>,
    current: Option<Reading>,
    forecast: Vec<ForecastPoint>,
    historical: Vec<HistoricalPoint>,
    active_view: ActiveView,
    loading: BTreeSet<OperationTag>,
    last_error: BTreeMap<OperationTag, String>,
    #[serde(skip)]
    issued: BTreeMap<OperationTag, u64>,
    #[serde(skip)]
    started: BTreeMap<OperationTag, u64>,
}

impl SessionState {
    pub fn new(default_location: Option<Location>) -> Self {
        Self {
            location: default_location,
            ..Self::default()
        }
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn current(&self) -> Option<&Reading> {
        self.current.as_ref()
    }

    pub fn forecast(&self) -> &[ForecastPoint] {
        &self.forecast
    }

    pub fn historical(&self) -> &[HistoricalPoint] {
        &self.historical
    }

    pub fn active_view(&self) -> ActiveView {
        self.active_view
    }

    pub fn is_loading(&self, tag: OperationTag) -> bool {
        self.loading.contains(&tag)
    }

    #[cfg(test)]
    pub fn loading(&self) -> &BTreeSet<OperationTag> {
        &self.loading
    }

    pub fn last_error(&self, tag: OperationTag) -> Option<&str> {
        self.last_error.get(&tag).map(String::as_str)
    }

    /// AQI to seed a forecast with: the current reading, or `fallback` when there is none.
    pub fn baseline_aqi(&self, fallback: f64) -> f64 {
        self.current.as_ref().map(|r| r.aqi).unwrap_or(fallback)
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = Some(location);
    }

    pub fn set_active_view(&mut self, view: ActiveView) {
        self.active_view = view;
    }

    pub fn begin_load(&mut self, tag: OperationTag) -> RequestTicket {
        let seq = self.issued.entry(tag).or_insert(0);
        *seq += 1;
        let seq = *seq;
        self.started.insert(tag, seq);
        self.loading.insert(tag);
        self.last_error.remove(&tag);
        RequestTicket { tag, seq }
    }

    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        self.issued.get(&ticket.tag).copied() == Some(ticket.seq)
    }

    /// Whether a request for the same tag was started after `ticket`. A ticket
    /// invalidated by [`SessionState::supersede`] alone has no newer request.
    pub fn has_newer_request(&self, ticket: RequestTicket) -> bool {
        self.started.get(&ticket.tag).is_some_and(|&seq| seq > ticket.seq)
    }

    /// Applies `outcome` if `ticket` is still current. Returns `false` when the
    /// result was superseded and dropped.
    pub fn complete_load(&mut self, ticket: RequestTicket, outcome: LoadOutcome) -> bool {
        if outcome.tag() != ticket.tag {
            tracing::warn!(
                "Dropping {} result delivered for a {} request",
                outcome.tag(),
                ticket.tag
            );
            return false;
        }
        if !self.is_latest(ticket) {
            return false;
        }

        self.loading.remove(&ticket.tag);
        match outcome {
            LoadOutcome::Realtime(mut reading) => {
                reading.origin = Origin::Live;
                if reading.location.is_none() {
                    reading.location = self.location.clone();
                }
                self.current = Some(reading);
            }
            LoadOutcome::Forecast(points) => self.forecast = points,
            LoadOutcome::Historical(points) => self.historical = points,
            LoadOutcome::Prediction(mut reading) => {
                reading.origin = Origin::Predicted;
                self.current = Some(reading);
                self.active_view = ActiveView::Prediction;
                // A live reading requested before this point must not replace the prediction.
                self.supersede(OperationTag::Realtime);
            }
        }
        true
    }

    /// Records a failure if `ticket` is still current. Existing data is kept.
    pub fn fail_load(&mut self, ticket: RequestTicket, error: impl Into<String>) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        self.loading.remove(&ticket.tag);
        self.last_error.insert(ticket.tag, error.into());
        true
    }

    /// Invalidates any in-flight request for `tag` without issuing a new one.
    pub fn supersede(&mut self, tag: OperationTag) {
        if self.loading.remove(&tag) {
            *self.issued.entry(tag).or_insert(0) += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> Location {
        Location::new("London").with_country("GB")
    }

    #[test]
    fn test_begin_load_marks_loading_and_clears_error() {
        let mut state = SessionState::new(Some(london()));
        let first = state.begin_load(OperationTag::Forecast);
        assert!(state.fail_load(first, "timeout"));
        assert_eq!(state.last_error(OperationTag::Forecast), Some("timeout"));
        assert!(!state.is_loading(OperationTag::Forecast));

        let second = state.begin_load(OperationTag::Forecast);
        assert!(state.is_loading(OperationTag::Forecast));
        assert_eq!(state.last_error(OperationTag::Forecast), None);
        assert!(second.seq > first.seq);
    }

    #[test]
    fn test_superseded_result_is_dropped() {
        let mut state = SessionState::new(Some(london()));
        let older = state.begin_load(OperationTag::Realtime);
        let newer = state.begin_load(OperationTag::Realtime);

        assert!(state.complete_load(newer, LoadOutcome::Realtime(Reading::live(40.0, london()))));
        assert!(!state.complete_load(older, LoadOutcome::Realtime(Reading::live(180.0, london()))));
        assert_eq!(state.current().unwrap().aqi, 40.0);
    }

    #[test]
    fn test_stale_failure_does_not_clear_loading() {
        let mut state = SessionState::new(None);
        let older = state.begin_load(OperationTag::Historical);
        let _newer = state.begin_load(OperationTag::Historical);

        assert!(!state.fail_load(older, "network down"));
        assert!(state.is_loading(OperationTag::Historical));
        assert_eq!(state.last_error(OperationTag::Historical), None);
    }

    #[test]
    fn test_failure_preserves_previous_data() {
        let mut state = SessionState::new(None);
        let ticket = state.begin_load(OperationTag::Historical);
        state.complete_load(ticket, LoadOutcome::Historical(vec![HistoricalPoint::new("2026-10-10", 88.0)]));

        let ticket = state.begin_load(OperationTag::Historical);
        state.fail_load(ticket, "network down");
        assert_eq!(state.historical().len(), 1);
    }

    #[test]
    fn test_mismatched_outcome_is_rejected() {
        let mut state = SessionState::new(None);
        let ticket = state.begin_load(OperationTag::Forecast);
        assert!(!state.complete_load(ticket, LoadOutcome::Historical(vec![])));
        assert!(state.is_loading(OperationTag::Forecast));
    }

    #[test]
    fn test_realtime_result_is_live_and_located() {
        let mut state = SessionState::new(Some(london()));
        let ticket = state.begin_load(OperationTag::Realtime);
        let mut reading = Reading::predicted(55.0);
        reading.location = None;
        state.complete_load(ticket, LoadOutcome::Realtime(reading));

        let current = state.current().unwrap();
        assert_eq!(current.origin, Origin::Live);
        assert_eq!(current.location.as_ref(), Some(&london()));
    }

    #[test]
    fn test_prediction_switches_view_and_supersedes_realtime() {
        let mut state = SessionState::new(Some(london()));
        let realtime = state.begin_load(OperationTag::Realtime);
        let prediction = state.begin_load(OperationTag::Prediction);

        assert!(state.complete_load(prediction, LoadOutcome::Prediction(Reading::live(62.0, london()))));
        assert_eq!(state.current().unwrap().origin, Origin::Predicted);
        assert_eq!(state.active_view(), ActiveView::Prediction);
        assert!(!state.is_loading(OperationTag::Realtime));

        assert!(!state.complete_load(realtime, LoadOutcome::Realtime(Reading::live(20.0, london()))));
        assert_eq!(state.current().unwrap().aqi, 62.0);
    }

    #[test]
    fn test_superseded_ticket_distinguishes_newer_request() {
        let mut state = SessionState::new(Some(london()));
        let first = state.begin_load(OperationTag::Realtime);
        state.supersede(OperationTag::Realtime);
        assert!(!state.is_latest(first));
        assert!(!state.has_newer_request(first));

        let second = state.begin_load(OperationTag::Realtime);
        assert!(state.has_newer_request(first));
        assert!(!state.has_newer_request(second));
    }

    #[test]
    fn test_baseline_aqi() {
        let mut state = SessionState::new(None);
        assert_eq!(state.baseline_aqi(75.0), 75.0);

        let ticket = state.begin_load(OperationTag::Realtime);
        state.complete_load(ticket, LoadOutcome::Realtime(Reading::live(130.0, london())));
        assert_eq!(state.baseline_aqi(75.0), 130.0);
    }
}
