// Scripted in-memory gateway for orchestration tests
use crate::application::data_gateway::{DataGateway, GatewayError};
use crate::domain::location::{KnownLocation, Location};
use crate::domain::pollutants::PollutantInput;
use crate::domain::reading::{ForecastPoint, HistoricalPoint, Reading};
use crate::domain::session::OperationTag;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
pub struct FakeGateway {
    cities: Mutex<Vec<(Location, f64)>>,
    scripted_aqi: Mutex<HashMap<String, VecDeque<f64>>>,
    gates: Mutex<HashMap<(OperationTag, String), Arc<Notify>>>,
    failing: Mutex<HashSet<OperationTag>>,
    prediction_aqi: Mutex<f64>,
    calls: Mutex<Vec<String>>,
    forecast_baselines: Mutex<Vec<f64>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(self, location: Location, aqi: f64) -> Self {
        self.cities.lock().unwrap().push((location, aqi));
        self
    }

    pub fn with_prediction(self, aqi: f64) -> Self {
        *self.prediction_aqi.lock().unwrap() = aqi;
        self
    }

    /// Successive realtime calls for `city` return these values in order.
    pub fn script_realtime(&self, city: &str, values: &[f64]) {
        self.scripted_aqi
            .lock()
            .unwrap()
            .insert(city.to_string(), values.iter().copied().collect());
    }

    /// The next realtime call for `city` blocks until the returned gate is notified.
    pub fn gate_next_realtime(&self, city: &str) -> Arc<Notify> {
        self.gate(OperationTag::Realtime, city)
    }

    pub fn gate_next_forecast(&self, city: &str) -> Arc<Notify> {
        self.gate(OperationTag::Forecast, city)
    }

    pub fn gate_next_historical(&self) -> Arc<Notify> {
        self.gate(OperationTag::Historical, "")
    }

    pub fn fail(&self, tag: OperationTag) {
        self.failing.lock().unwrap().insert(tag);
    }

    pub fn recover(&self, tag: OperationTag) {
        self.failing.lock().unwrap().remove(&tag);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn forecast_baselines(&self) -> Vec<f64> {
        self.forecast_baselines.lock().unwrap().clone()
    }

    fn gate(&self, tag: OperationTag, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert((tag, key.to_string()), gate.clone());
        gate
    }

    async fn pass_gate(&self, tag: OperationTag, key: &str) {
        let gate = self.gates.lock().unwrap().remove(&(tag, key.to_string()));
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, tag: OperationTag) -> Result<(), GatewayError> {
        if self.failing.lock().unwrap().contains(&tag) {
            Err(GatewayError::Network(format!("{} backend unavailable", tag)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DataGateway for FakeGateway {
    async fn fetch_realtime(&self, location: &Location) -> Result<Reading, GatewayError> {
        self.record(format!("realtime:{}", location.name));
        let scripted = self
            .scripted_aqi
            .lock()
            .unwrap()
            .get_mut(&location.name)
            .and_then(VecDeque::pop_front);
        self.pass_gate(OperationTag::Realtime, &location.name).await;

        self.check(OperationTag::Realtime)?;
        let known = self
            .cities
            .lock()
            .unwrap()
            .iter()
            .find(|(l, _)| l == location)
            .map(|(_, aqi)| *aqi);
        let aqi = scripted
            .or(known)
            .ok_or_else(|| GatewayError::NotFound(location.name.clone()))?;

        // Some backends echo no location; the session fills it in.
        let mut reading = Reading::live(aqi, location.clone());
        reading.location = None;
        Ok(reading)
    }

    async fn fetch_forecast(
        &self,
        location: &Location,
        baseline_aqi: f64,
    ) -> Result<Vec<ForecastPoint>, GatewayError> {
        self.record(format!("forecast:{}", location.name));
        self.forecast_baselines.lock().unwrap().push(baseline_aqi);
        self.pass_gate(OperationTag::Forecast, &location.name).await;
        self.check(OperationTag::Forecast)?;
        Ok((0..24)
            .map(|h| ForecastPoint::new(format!("{:02}:00", h), baseline_aqi + h as f64))
            .collect())
    }

    async fn fetch_historical(&self, days: u32) -> Result<Vec<HistoricalPoint>, GatewayError> {
        // Each call's series is offset by 10 so tests can tell them apart.
        let offset = 10.0 * self.calls().iter().filter(|c| c.starts_with("historical")).count() as f64;
        self.record(format!("historical:{}", days));
        self.pass_gate(OperationTag::Historical, "").await;
        self.check(OperationTag::Historical)?;
        Ok((1..=days)
            .map(|d| HistoricalPoint::new(format!("2026-10-{:02}", d), 60.0 + offset + d as f64))
            .collect())
    }

    async fn submit_prediction(&self, pollutants: &PollutantInput) -> Result<Reading, GatewayError> {
        self.record("prediction".to_string());
        self.check(OperationTag::Prediction)?;
        let aqi = *self.prediction_aqi.lock().unwrap();
        let contributions = BTreeMap::from([("PM2.5".to_string(), 60.0), ("O3".to_string(), 25.0)]);
        // Origin is left as live on purpose: the session must force it.
        let mut reading = Reading::predicted(aqi)
            .with_pollutants(pollutants.as_map().clone())
            .with_contributions(contributions);
        reading.origin = crate::domain::reading::Origin::Live;
        Ok(reading)
    }

    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, GatewayError> {
        self.record(format!("search:{}", query));
        let needle = query.to_lowercase();
        Ok(self
            .cities
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| l.name.to_lowercase().contains(&needle))
            .map(|(l, _)| l.clone())
            .collect())
    }

    async fn list_known_locations(&self) -> Result<Vec<KnownLocation>, GatewayError> {
        self.record("cities".to_string());
        Ok(self
            .cities
            .lock()
            .unwrap()
            .iter()
            .map(|(location, aqi)| KnownLocation {
                location: location.clone(),
                last_aqi: Some(*aqi),
            })
            .collect())
    }
}
