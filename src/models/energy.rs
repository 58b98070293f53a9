use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::EnergyProvider;
use crate::error::{ensure_finite, ApiResult};
use crate::services::estimator::{Period, SolarParams};

fn default_panel_size() -> f64 { 10.0 }
fn default_efficiency() -> f64 { 0.20 }
fn default_usage_pct() -> f64 { 0.60 }
fn default_co2_factor() -> f64 { 0.85 }

// ─── Query parameters ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EnergyQuery {
    pub lat: f64,
    pub lon: f64,
    /// Panel area in m²
    #[serde(default = "default_panel_size", alias = "panel_size_m2")]
    pub panel_size: f64,
    /// Panel efficiency, 0–1
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    /// Share of generation consumed on site, 0–1
    #[serde(default = "default_usage_pct")]
    pub usage_pct: f64,
    /// kg CO₂ per kWh of grid electricity displaced
    #[serde(default = "default_co2_factor")]
    pub co2_factor: f64,
}

impl EnergyQuery {
    pub fn ensure_finite(&self) -> ApiResult<()> {
        ensure_finite(&[
            ("lat", self.lat),
            ("lon", self.lon),
            ("panel_size", self.panel_size),
            ("efficiency", self.efficiency),
            ("usage_pct", self.usage_pct),
            ("co2_factor", self.co2_factor),
        ])
    }

    pub fn solar_params(&self) -> SolarParams {
        SolarParams {
            panel_size_m2: self.panel_size,
            efficiency: self.efficiency,
            usage_pct: self.usage_pct,
            co2_factor: self.co2_factor,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CarbonQuery {
    pub lat: f64,
    pub lon: f64,
    #[serde(default = "default_panel_size", alias = "panel_size_m2")]
    pub panel_size: f64,
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    #[serde(default = "default_co2_factor")]
    pub co2_factor: f64,
    /// `daily`, `monthly` (×30) or `yearly` (×365)
    #[serde(default)]
    pub period: Period,
}

impl CarbonQuery {
    pub fn ensure_finite(&self) -> ApiResult<()> {
        ensure_finite(&[
            ("lat", self.lat),
            ("lon", self.lon),
            ("panel_size", self.panel_size),
            ("efficiency", self.efficiency),
            ("co2_factor", self.co2_factor),
        ])
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompareQuery {
    /// Generation in kWh/day
    pub generation: f64,
    /// Consumption in kWh/day
    pub usage: f64,
}

impl CompareQuery {
    pub fn ensure_finite(&self) -> ApiResult<()> {
        ensure_finite(&[("generation", self.generation), ("usage", self.usage)])
    }
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct EnergyResponse {
    /// Provider timestamp of the irradiance sample used
    pub timestamp: Option<String>,
    pub provider: EnergyProvider,
    pub solar_kw: f64,
    pub usage_kw: f64,
    /// Omitted when the provider has no wind data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_kw: Option<f64>,
    /// Omitted when the provider has no precipitation data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hydro_kw: Option<f64>,
    /// kg
    pub co2_saved: f64,
    pub params: SolarParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl EnergyResponse {
    pub fn fallback(provider: EnergyProvider, params: SolarParams, note: impl Into<String>) -> Self {
        let has_wind_and_hydro = provider == EnergyProvider::OpenMeteo;
        Self {
            timestamp: None,
            provider,
            solar_kw: 0.0,
            usage_kw: 0.0,
            wind_kw: has_wind_and_hydro.then_some(0.0),
            hydro_kw: has_wind_and_hydro.then_some(0.0),
            co2_saved: 0.0,
            params,
            note: Some(note.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    Surplus,
    Deficit,
    Balanced,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompareResponse {
    pub generation_kwh: f64,
    pub usage_kwh: f64,
    /// generation − usage
    pub balance_kwh: f64,
    pub status: BalanceStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CarbonFootprintResponse {
    pub period: Period,
    /// Days one daily total is multiplied by (1, 30 or 365)
    pub days_multiplier: f64,
    pub generation_kwh: f64,
    pub co2_avoided_kg: f64,
    pub note: String,
}
