use crate::application::orchestrator::OrchestratorSettings;
use crate::domain::location::Location;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewaySettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    #[serde(default = "default_location")]
    pub default_location: Option<Location>,
    #[serde(default = "default_fallback_aqi")]
    pub fallback_aqi: f64,
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_location: default_location(),
            fallback_aqi: default_fallback_aqi(),
            history_days: default_history_days(),
        }
    }
}

impl SessionSettings {
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            fallback_aqi: self.fallback_aqi,
            history_days: self.history_days,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_location() -> Option<Location> {
    Some(
        Location::new("London")
            .with_country("GB")
            .with_coordinates(51.5074, -0.1278),
    )
}

fn default_fallback_aqi() -> f64 {
    75.0
}

fn default_history_days() -> u32 {
    7
}

/// Reads `config/aqi.*` (optional) and `AQI__SECTION__KEY` environment overrides.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/aqi").required(false))
        .add_source(config::Environment::with_prefix("AQI").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
