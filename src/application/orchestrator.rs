// Orchestrator - sequences gateway calls for user events and owns the session state
use crate::application::data_gateway::{DataGateway, GatewayError};
use crate::application::exporter::{self, ExportError};
use crate::domain::dashboard::DashboardView;
use crate::domain::location::Location;
use crate::domain::pollutants::{PollutantInput, ValidationError};
use crate::domain::session::{ActiveView, LoadOutcome, OperationTag, RequestTicket, SessionState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const DEFAULT_FALLBACK_AQI: f64 = 75.0;
const DEFAULT_HISTORY_DAYS: u32 = 7;

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Forecast baseline when no reading has ever succeeded
    pub fallback_aqi: f64,
    pub history_days: u32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            fallback_aqi: DEFAULT_FALLBACK_AQI,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }
}

/// Event surface over a single [`SessionState`].
///
/// The state lock is only ever taken between awaits, so every mutation is
/// atomic with respect to other handlers. Responses are applied per tag in
/// request-issued order; anything superseded is dropped on arrival.
pub struct Orchestrator {
    gateway: Arc<dyn DataGateway>,
    settings: OrchestratorSettings,
    state: Mutex<SessionState>,
}

impl Orchestrator {
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        settings: OrchestratorSettings,
        default_location: Option<Location>,
    ) -> Self {
        Self {
            gateway,
            settings,
            state: Mutex::new(SessionState::new(default_location)),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }

    pub fn dashboard(&self) -> DashboardView {
        DashboardView::from_state(&self.state())
    }

    /// Loads everything for the session's default location.
    pub async fn initial_load(&self) {
        let location = self.state().location().cloned();
        match location {
            Some(location) => self.select_location(location).await,
            None => tracing::info!("No default location configured, starting empty"),
        }
    }

    pub async fn select_location(&self, location: Location) {
        tracing::info!("Location selected: {}", location);
        {
            let mut state = self.state();
            state.set_location(location.clone());
            state.set_active_view(ActiveView::Realtime);
        }
        self.load_location(location).await;
    }

    /// Validates locally, then asks the prediction service. Nothing is sent
    /// and no state changes when validation fails.
    pub async fn submit_prediction(&self, input: PollutantInput) -> Result<(), ValidationError> {
        input.validate()?;

        let ticket = self.state().begin_load(OperationTag::Prediction);
        let result = self
            .gateway
            .submit_prediction(&input)
            .await
            .map(LoadOutcome::Prediction);
        if self.settle(ticket, result) {
            tracing::info!("Prediction applied");
        }
        Ok(())
    }

    pub async fn switch_view(&self, view: ActiveView) {
        let pending = {
            let mut state = self.state();
            state.set_active_view(view);
            let needs_reading = view == ActiveView::Realtime
                && state.current().is_none()
                && !state.is_loading(OperationTag::Realtime);
            if needs_reading {
                state.location().cloned()
            } else {
                None
            }
        };

        if let Some(location) = pending {
            tracing::debug!("Realtime view has no reading, loading {}", location);
            self.load_location(location).await;
        }
    }

    /// Re-runs realtime, forecast and historical for the last known location.
    pub async fn refresh(&self) {
        let location = self.state().location().cloned();
        match location {
            Some(location) => {
                tracing::info!("Refreshing {}", location);
                self.load_location(location).await;
            }
            None => tracing::warn!("Refresh requested with no known location"),
        }
    }

    /// Refetches only the forecast, seeded with whatever reading is current
    /// (live or predicted).
    pub async fn refresh_forecast(&self) {
        let (location, baseline) = {
            let state = self.state();
            (state.location().cloned(), state.baseline_aqi(self.settings.fallback_aqi))
        };
        match location {
            Some(location) => self.load_forecast(&location, baseline).await,
            None => tracing::warn!("Forecast refresh requested with no known location"),
        }
    }

    pub fn export(&self) -> Result<String, ExportError> {
        let document = exporter::export(&self.state())?;
        document.to_json()
    }

    async fn load_location(&self, location: Location) {
        let ticket = self.state().begin_load(OperationTag::Realtime);
        let result = self
            .gateway
            .fetch_realtime(&location)
            .await
            .map(LoadOutcome::Realtime);
        let failed = result.is_err();

        let applied = self.settle(ticket, result);
        if !applied {
            let replaced = self.state().has_newer_request(ticket);
            if replaced {
                // A newer sequence owns the follow-up fetches.
                return;
            }
            tracing::debug!("Reading for {} was superseded by a prediction, loading series anyway", location);
        }

        let baseline = self.state().baseline_aqi(self.settings.fallback_aqi);
        if failed && applied {
            tracing::warn!(
                "Realtime failed for {}, loading series with baseline AQI {}",
                location,
                baseline
            );
        }
        self.load_series(&location, baseline).await;
    }

    async fn load_series(&self, location: &Location, baseline: f64) {
        futures::join!(
            self.load_forecast(location, baseline),
            self.load_historical()
        );
    }

    async fn load_forecast(&self, location: &Location, baseline: f64) {
        let ticket = self.state().begin_load(OperationTag::Forecast);
        let result = self
            .gateway
            .fetch_forecast(location, baseline)
            .await
            .map(LoadOutcome::Forecast);
        self.settle(ticket, result);
    }

    async fn load_historical(&self) {
        let ticket = self.state().begin_load(OperationTag::Historical);
        let result = self
            .gateway
            .fetch_historical(self.settings.history_days)
            .await
            .map(LoadOutcome::Historical);
        self.settle(ticket, result);
    }

    /// Applies a settled response. Returns `false` when it was superseded.
    fn settle(&self, ticket: RequestTicket, result: Result<LoadOutcome, GatewayError>) -> bool {
        let mut state = self.state();
        let applied = match result {
            Ok(outcome) => state.complete_load(ticket, outcome),
            Err(e) => {
                let applied = state.fail_load(ticket, e.to_string());
                if applied {
                    tracing::warn!("{} request failed: {}", ticket.tag, e);
                }
                applied
            }
        };

        if !applied {
            tracing::debug!("Discarding superseded {} response (seq {})", ticket.tag, ticket.seq);
        }
        applied
    }
}
