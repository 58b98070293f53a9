use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ensure_finite, ApiResult};
use crate::services::estimator::{Payback, RoiParams};

// ─── Irrigation simulation ───────────────────────────────────────────────────

fn default_area() -> f64 { 1.0 }
fn default_crop() -> String { "maize".to_string() }
fn default_rate() -> f64 { 6.5 }

/// Form inputs arrive as strings from the browser, so numbers are accepted
/// either as JSON numbers or as numeric strings.
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("`{s}` is not a number"))),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SimulationRequest {
    /// Farmland area in acres
    #[serde(default = "default_area", deserialize_with = "number_or_string")]
    #[schema(value_type = f64, default = 1.0)]
    pub area: f64,
    /// Crop name (case-insensitive)
    #[serde(default = "default_crop")]
    #[schema(default = "maize")]
    pub crop: String,
    /// ₹ per 1000 litres of water
    #[serde(default = "default_rate", deserialize_with = "number_or_string")]
    #[schema(value_type = f64, default = 6.5)]
    pub rate: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SimulationResponse {
    pub crop: String,
    pub area_acres: f64,
    pub water_saved_liters_per_day: f64,
    pub cost_saved_inr_per_day: f64,
    pub investment_inr: f64,
    pub roi_percent_per_year: f64,
    pub note: String,
}

// ─── Solar ROI ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoiQuery {
    /// Installation cost (₹)
    pub capex: f64,
    /// Panel area in m²
    #[serde(alias = "panel_size_m2")]
    pub panel_size: f64,
    /// Panel efficiency, 0–1
    pub efficiency: f64,
    /// ₹ per kWh
    pub electricity_price: f64,
}

impl RoiQuery {
    pub fn ensure_finite(&self) -> ApiResult<()> {
        ensure_finite(&[
            ("capex", self.capex),
            ("panel_size", self.panel_size),
            ("efficiency", self.efficiency),
            ("electricity_price", self.electricity_price),
        ])
    }

    pub fn params(&self) -> RoiParams {
        RoiParams {
            capex: self.capex,
            panel_size_m2: self.panel_size,
            efficiency: self.efficiency,
            electricity_price: self.electricity_price,
        }
    }
}

/// Serialises as a number, or as the string `"Infinity"` when savings never
/// repay the capex (JSON has no infinite number).
#[derive(Debug, Clone, Copy, PartialEq, ToSchema)]
#[schema(value_type = Object)]
pub struct PaybackYears(pub Payback);

impl Serialize for PaybackYears {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Payback::Years(years) => serializer.serialize_f64(years),
            Payback::Unbounded => serializer.serialize_str("Infinity"),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoiResponse {
    pub daily_kwh: f64,
    pub yearly_savings: f64,
    pub payback_years: PaybackYears,
    pub params: RoiParams,
}
