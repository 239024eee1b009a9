// HTTP gateway implementation against the AQI backend JSON API
use crate::application::data_gateway::{DataGateway, GatewayError};
use crate::domain::location::{Coordinates, KnownLocation, Location};
use crate::domain::pollutants::PollutantInput;
use crate::domain::reading::{ForecastPoint, HistoricalPoint, Origin, Reading};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ReadingResponse {
    aqi: f64,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    coordinates: Option<Coordinates>,
    #[serde(default)]
    pollutants: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    contributions: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    forecast: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    #[serde(default)]
    hour: Option<String>,
    #[serde(default)]
    time: Option<String>,
    aqi: f64,
}

#[derive(Debug, Deserialize)]
struct HistoricalResponse {
    daily: Vec<HistoricalPoint>,
}

#[derive(Debug, Deserialize)]
struct CitiesResponse {
    cities: Vec<CityEntry>,
}

#[derive(Debug, Deserialize)]
struct CityEntry {
    name: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    aqi: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Prefix of the backend's 500 body when no provider could resolve a city.
const REALTIME_UNRESOLVED: &str = "Failed to fetch real-time AQI data";

impl HttpGateway {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_url(&self, path: &str, params: &[(&str, String)]) -> String {
        let query: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();

        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query.join("&"))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GatewayError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Network(format!("failed to parse response: {}", e)))
    }
}

fn status_error(status: u16, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("request failed with status {}", status));

    match status {
        400 | 422 => GatewayError::Validation(message),
        404 => GatewayError::NotFound(message),
        _ => GatewayError::Network(message),
    }
}

/// The realtime endpoint reports an unresolvable city as a 500, not a 404.
fn realtime_error(location: &Location, error: GatewayError) -> GatewayError {
    match error {
        GatewayError::Network(message) if message.starts_with(REALTIME_UNRESOLVED) => {
            tracing::debug!("Backend could not resolve {}: {}", location, message);
            GatewayError::NotFound(location.name.clone())
        }
        other => other,
    }
}

/// Hourly samples are grouped by calendar date upstream, so a window of
/// `days` can straddle one extra date. Only the most recent `days` are kept.
fn latest_days(mut daily: Vec<HistoricalPoint>, days: u32) -> Vec<HistoricalPoint> {
    daily.sort_by(|a, b| a.date.cmp(&b.date));
    let excess = daily.len().saturating_sub(days as usize);
    daily.split_off(excess)
}

/// Backend timestamps are ISO-8601, with or without an offset. Naive ones are taken as UTC.
fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(|t| t.and_utc()))
            .ok()
    })
    .unwrap_or_else(Utc::now)
}

impl ReadingResponse {
    fn into_reading(self, requested: Option<&Location>, origin: Origin) -> Reading {
        let location = match (self.city, requested) {
            (Some(city), _) => Some(Location {
                name: city,
                country: requested.and_then(|r| r.country.clone()),
                state: requested.and_then(|r| r.state.clone()),
                coordinates: self
                    .coordinates
                    .or_else(|| requested.and_then(|r| r.coordinates)),
            }),
            (None, Some(requested)) => Some(requested.clone()),
            (None, None) => None,
        };

        Reading {
            aqi: self.aqi,
            location,
            timestamp: parse_timestamp(self.timestamp.as_deref()),
            origin,
            pollutants: self
                .pollutants
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v)))
                .collect(),
            contributions: self.contributions,
        }
    }
}

impl ForecastEntry {
    fn into_point(self) -> ForecastPoint {
        let label = self.hour.or(self.time).unwrap_or_default();
        ForecastPoint::new(label, self.aqi)
    }
}

impl CityEntry {
    fn into_location(self) -> (Location, Option<f64>) {
        let location = Location {
            name: self.name,
            country: self.country,
            state: self.state,
            coordinates: match (self.lat, self.lon) {
                (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
                _ => None,
            },
        };
        (location, self.aqi)
    }
}

#[async_trait]
impl DataGateway for HttpGateway {
    async fn fetch_realtime(&self, location: &Location) -> Result<Reading, GatewayError> {
        let mut params = vec![("city", location.name.clone())];
        if let Some(coordinates) = location.coordinates {
            params.push(("lat", coordinates.lat.to_string()));
            params.push(("lon", coordinates.lon.to_string()));
        }
        let url = self.build_url("/realtime", &params);

        let response: ReadingResponse = self
            .get_json(&url)
            .await
            .map_err(|e| realtime_error(location, e))?;
        Ok(response.into_reading(Some(location), Origin::Live))
    }

    async fn fetch_forecast(
        &self,
        location: &Location,
        baseline_aqi: f64,
    ) -> Result<Vec<ForecastPoint>, GatewayError> {
        let url = self.build_url(
            "/forecast",
            &[
                ("city", location.name.clone()),
                ("current_aqi", baseline_aqi.to_string()),
            ],
        );

        let response: ForecastResponse = self.get_json(&url).await?;
        Ok(response.forecast.into_iter().map(ForecastEntry::into_point).collect())
    }

    async fn fetch_historical(&self, days: u32) -> Result<Vec<HistoricalPoint>, GatewayError> {
        let url = self.build_url("/historical", &[("days", days.to_string())]);

        let response: HistoricalResponse = self.get_json(&url).await?;
        Ok(latest_days(response.daily, days))
    }

    async fn submit_prediction(&self, pollutants: &PollutantInput) -> Result<Reading, GatewayError> {
        let url = self.build_url("/predict", &[]);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(pollutants)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let reading: ReadingResponse = Self::read_json(response).await?;
        Ok(reading.into_reading(None, Origin::Predicted))
    }

    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, GatewayError> {
        let url = self.build_url("/search_city", &[("city", query.to_string())]);

        let cities: Vec<CityEntry> = self.get_json(&url).await?;
        Ok(cities.into_iter().map(|c| c.into_location().0).collect())
    }

    async fn list_known_locations(&self) -> Result<Vec<KnownLocation>, GatewayError> {
        let url = self.build_url("/cities", &[]);

        let response: CitiesResponse = self.get_json(&url).await?;
        Ok(response
            .cities
            .into_iter()
            .map(|c| {
                let (location, last_aqi) = c.into_location();
                KnownLocation { location, last_aqi }
            })
            .collect())
    }
}
