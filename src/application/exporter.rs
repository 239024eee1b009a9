// Exporter - portable JSON snapshot of the session
use crate::domain::location::Location;
use crate::domain::reading::{ForecastPoint, HistoricalPoint, Reading};
use crate::domain::session::SessionState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: no current reading")]
    NothingToExport,

    #[error("failed to serialize export: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    pub location: Option<Location>,
    pub current: Reading,
    pub forecast: Vec<ForecastPoint>,
    pub historical: Vec<HistoricalPoint>,
}

impl ExportDocument {
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn export(state: &SessionState) -> Result<ExportDocument, ExportError> {
    let current = state.current().cloned().ok_or(ExportError::NothingToExport)?;
    Ok(ExportDocument {
        exported_at: Utc::now(),
        location: state.location().cloned(),
        current,
        forecast: state.forecast().to_vec(),
        historical: state.historical().to_vec(),
    })
}
