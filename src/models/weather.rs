use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ensure_finite, ApiResult};

// ─── Query parameters ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocationQuery {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl LocationQuery {
    pub fn ensure_finite(&self) -> ApiResult<()> {
        ensure_finite(&[("lat", self.lat), ("lon", self.lon)])
    }
}

fn default_forecast_days() -> u32 { 5 }

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ForecastQuery {
    pub lat: f64,
    pub lon: f64,
    /// Days after today to include (0–15)
    #[serde(default = "default_forecast_days")]
    pub days: u32,
}

impl ForecastQuery {
    pub fn ensure_finite(&self) -> ApiResult<()> {
        ensure_finite(&[("lat", self.lat), ("lon", self.lon)])
    }
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

/// Current conditions and the raw hourly block for a location.
/// Any field may be `null` when the provider has no numeric value for it.
#[derive(Debug, Serialize, Default, ToSchema)]
pub struct LocationDataResponse {
    /// °C, maximum over the returned hours
    pub temp_max: Option<f64>,
    /// °C, minimum over the returned hours
    pub temp_min: Option<f64>,
    /// %, latest reported
    pub humidity: Option<f64>,
    /// km/h, latest reported
    pub wind_speed: Option<f64>,
    /// mm, first forecast hour
    pub rainfall: Option<f64>,
    /// m³/m³, latest reported
    pub soil_moisture: Option<f64>,
    /// °C, latest reported
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub current_weather: Option<serde_json::Value>,
    /// Open-Meteo `hourly` block as returned by the provider
    #[schema(value_type = Object)]
    pub history: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LocationDataResponse {
    pub fn fallback(note: impl Into<String>) -> Self {
        Self {
            temp_max: Some(0.0),
            temp_min: Some(0.0),
            humidity: Some(0.0),
            wind_speed: Some(0.0),
            rainfall: Some(0.0),
            soil_moisture: Some(0.0),
            temperature: Some(0.0),
            current_weather: None,
            history: serde_json::json!({}),
            note: Some(note.into()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ForecastResponse {
    pub start_date: String,
    pub end_date: String,
    pub timezone: Option<String>,
    /// Open-Meteo `hourly` block: `time` plus one array per variable
    #[schema(value_type = Object)]
    pub hourly: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
