/// ============================================================
///  Energy & savings estimation
///
///  Closed-form conversions from a single weather reading to
///  derived quantities. Every function here is pure: inputs are
///  passed explicitly, nothing is read from config or the clock.
///  Rounding happens in the controllers, never in here.
/// ============================================================

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::crops;

// ─── Physical constants ──────────────────────────────────────
const G: f64 = 9.81; // m/s²
const WATER_DENSITY: f64 = 1000.0; // kg/m³
const J_PER_KWH: f64 = 3600.0 * 1000.0;

// ─── Economic assumptions ────────────────────────────────────
/// Share of baseline water use saved by smart irrigation.
pub const IRRIGATION_SAVINGS_FRACTION: f64 = 0.30;
/// Up-front smart-irrigation cost per acre (₹).
pub const IRRIGATION_INVESTMENT_PER_ACRE: f64 = 5000.0;
/// Peak-sun-hours per day assumed by the standalone ROI calculator.
pub const ASSUMED_SUN_HOURS: f64 = 4.5;

// ─── Parameter structs ───────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct SolarParams {
    pub panel_size_m2: f64,
    pub efficiency: f64,
    pub usage_pct: f64,
    pub co2_factor: f64,
}

impl Default for SolarParams {
    fn default() -> Self {
        Self { panel_size_m2: 10.0, efficiency: 0.20, usage_pct: 0.60, co2_factor: 0.85 }
    }
}

fn default_rotor_radius() -> f64 { 2.0 }
fn default_air_density() -> f64 { 1.225 }
fn default_turbine_efficiency() -> f64 { 0.35 }

/// Small horizontal-axis turbine.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WindParams {
    #[serde(default = "default_rotor_radius")]
    pub rotor_radius_m: f64,
    /// kg/m³
    #[serde(default = "default_air_density")]
    pub air_density: f64,
    #[serde(default = "default_turbine_efficiency")]
    pub efficiency: f64,
}

impl Default for WindParams {
    fn default() -> Self {
        Self {
            rotor_radius_m: default_rotor_radius(),
            air_density: default_air_density(),
            efficiency: default_turbine_efficiency(),
        }
    }
}

fn default_catchment_area() -> f64 { 1000.0 }
fn default_head() -> f64 { 10.0 }
fn default_hydro_efficiency() -> f64 { 0.8 }

/// Rain-fed micro hydro: rain over a catchment dropped through a fixed head.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HydroParams {
    #[serde(default = "default_catchment_area")]
    pub catchment_area_m2: f64,
    #[serde(default = "default_head")]
    pub head_m: f64,
    #[serde(default = "default_hydro_efficiency")]
    pub efficiency: f64,
}

impl Default for HydroParams {
    fn default() -> Self {
        Self {
            catchment_area_m2: default_catchment_area(),
            head_m: default_head(),
            efficiency: default_hydro_efficiency(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct RoiParams {
    pub capex: f64,
    pub panel_size_m2: f64,
    pub efficiency: f64,
    pub electricity_price: f64,
}

// ─── Outputs ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarEstimate {
    pub solar_kw: f64,
    pub usage_kw: f64,
    pub co2_saved_kg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrrigationEstimate {
    pub crop: String,
    pub area_acres: f64,
    pub base_requirement_l: f64,
    pub water_saved_l: f64,
    pub cost_saved: f64,
    pub investment: f64,
    pub roi_percent_per_year: f64,
}

/// Years until savings repay the capex. `Unbounded` when there are no savings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payback {
    Years(f64),
    Unbounded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiEstimate {
    pub daily_kwh: f64,
    pub yearly_savings: f64,
    pub payback: Payback,
}

/// Multiplier applied to one day of generation. Months are 30 days and
/// years 365; this is an approximation, not calendar arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Monthly,
    Yearly,
}

impl Period {
    pub fn days(self) -> f64 {
        match self {
            Period::Daily => 1.0,
            Period::Monthly => 30.0,
            Period::Yearly => 365.0,
        }
    }
}

// ─── Formulas ────────────────────────────────────────────────

/// Irradiance (Wh/m² over the hour, or W/m² instantaneous) to panel output.
pub fn solar_kw(irradiance_wh_m2: f64, panel_size_m2: f64, efficiency: f64) -> f64 {
    (irradiance_wh_m2 / 1000.0) * panel_size_m2 * efficiency
}

/// Self-consumed share and the CO₂ avoided by the exported remainder.
/// Savings are clamped to zero: usage above generation never yields a negative.
pub fn solar_estimate(irradiance_wh_m2: f64, params: &SolarParams) -> SolarEstimate {
    let solar = solar_kw(irradiance_wh_m2, params.panel_size_m2, params.efficiency);
    let usage = solar * params.usage_pct;
    let co2 = ((solar - usage) * params.co2_factor).max(0.0);
    SolarEstimate { solar_kw: solar, usage_kw: usage, co2_saved_kg: co2 }
}

/// P = ½ ρ A v³ η, in kW.
pub fn wind_kw(wind_speed_m_s: f64, params: &WindParams) -> f64 {
    let swept_area = PI * params.rotor_radius_m.powi(2);
    0.5 * params.air_density * swept_area * wind_speed_m_s.powi(3) * params.efficiency / 1000.0
}

/// Potential energy of one day's rain over the catchment, expressed in kWh
/// (reported as `hydro_kw` for parity with the other sources).
pub fn hydro_kw(rain_mm: f64, params: &HydroParams) -> f64 {
    let volume_m3 = rain_mm / 1000.0 * params.catchment_area_m2;
    let mass_kg = volume_m3 * WATER_DENSITY;
    mass_kg * G * params.head_m * params.efficiency / J_PER_KWH
}

/// Daily savings of smart irrigation for `area_acres` of `crop`.
///
/// `roi_percent_per_year` is derived from the two-decimal `cost_saved`, which
/// is the figure the caller sees.
pub fn irrigation_estimate(area_acres: f64, crop: &str, rate_per_unit: f64) -> IrrigationEstimate {
    let crop = crops::normalize(crop);
    let base = crops::water_requirement(&crop);
    let water_saved = area_acres * base * IRRIGATION_SAVINGS_FRACTION;
    let cost_saved = round_to(water_saved / 1000.0 * rate_per_unit, 2);
    let investment = area_acres * IRRIGATION_INVESTMENT_PER_ACRE;
    let roi = if investment > 0.0 { cost_saved * 365.0 / investment * 100.0 } else { 0.0 };

    IrrigationEstimate {
        crop,
        area_acres,
        base_requirement_l: base,
        water_saved_l: water_saved,
        cost_saved,
        investment,
        roi_percent_per_year: roi,
    }
}

pub fn roi_estimate(params: &RoiParams) -> RoiEstimate {
    let daily_kwh = params.panel_size_m2 * params.efficiency * ASSUMED_SUN_HOURS;
    let yearly_savings = daily_kwh * 365.0 * params.electricity_price;
    let payback = if yearly_savings > 0.0 {
        Payback::Years(params.capex / yearly_savings)
    } else {
        Payback::Unbounded
    };
    RoiEstimate { daily_kwh, yearly_savings, payback }
}

/// Sum of one day's irradiance (Wh/m²) converted to panel kWh.
pub fn daily_generation_kwh(daily_irradiance_wh_m2: f64, panel_size_m2: f64, efficiency: f64) -> f64 {
    solar_kw(daily_irradiance_wh_m2, panel_size_m2, efficiency)
}

pub fn period_generation_kwh(daily_kwh: f64, period: Period) -> f64 {
    daily_kwh * period.days()
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_solar_converts_wh_to_kwh() {
        // 800 Wh/m² on 10 m² at 20 % → 1.6 kW
        assert!(approx(solar_kw(800.0, 10.0, 0.2), 1.6));
    }

    #[test]
    fn test_co2_never_negative() {
        let params = SolarParams { usage_pct: 1.5, ..SolarParams::default() };
        let est = solar_estimate(600.0, &params);
        assert!(est.usage_kw > est.solar_kw);
        assert_eq!(est.co2_saved_kg, 0.0);
    }

    #[test]
    fn test_co2_with_defaults() {
        let est = solar_estimate(500.0, &SolarParams::default());
        // solar 1.0, usage 0.6, remainder 0.4 × 0.85
        assert!(approx(est.solar_kw, 1.0));
        assert!(approx(est.usage_kw, 0.6));
        assert!(approx(est.co2_saved_kg, 0.34));
    }

    #[test]
    fn test_wind_cubic_in_speed() {
        let p = WindParams::default();
        let one = wind_kw(5.0, &p);
        let two = wind_kw(10.0, &p);
        assert!(approx(two / one, 8.0));
        // 0.5 × 1.225 × π·4 × 125 × 0.35 / 1000
        assert!((one - 0.33673).abs() < 1e-4, "got {one}");
        assert_eq!(wind_kw(0.0, &p), 0.0);
    }

    #[test]
    fn test_hydro_from_rain() {
        let p = HydroParams::default();
        // 10 mm on 1000 m² = 10 m³ = 10 000 kg; × 9.81 × 10 × 0.8 / 3.6e6
        let kw = hydro_kw(10.0, &p);
        assert!((kw - 0.218).abs() < 1e-9, "got {kw}");
        assert_eq!(hydro_kw(0.0, &p), 0.0);
    }

    #[test]
    fn test_irrigation_wheat_example() {
        let est = irrigation_estimate(2.0, "wheat", 6.5);
        assert_eq!(est.base_requirement_l, 15176.0);
        assert!(approx(round_to(est.water_saved_l, 2), 9105.6));
        assert!(approx(est.cost_saved, 59.19));
        assert!(approx(est.investment, 10000.0));
        assert!(approx(round_to(est.roi_percent_per_year, 2), 216.04));
    }

    #[test]
    fn test_irrigation_roi_linear_in_rate() {
        // cost_saved is rounded to paise, so allow one paisa of drift
        let base = irrigation_estimate(1.0, "rice", 2.0);
        let doubled = irrigation_estimate(1.0, "rice", 4.0);
        assert!((doubled.roi_percent_per_year - 2.0 * base.roi_percent_per_year).abs() < 0.01);
    }

    #[test]
    fn test_irrigation_unknown_crop_uses_default() {
        let est = irrigation_estimate(1.0, "Dragonfruit", 6.5);
        assert_eq!(est.crop, "dragonfruit");
        assert_eq!(est.base_requirement_l, crops::DEFAULT_WATER_REQUIREMENT);
    }

    #[test]
    fn test_roi_example() {
        let est = roi_estimate(&RoiParams {
            capex: 80000.0,
            panel_size_m2: 10.0,
            efficiency: 0.20,
            electricity_price: 7.0,
        });
        assert!(approx(est.daily_kwh, 9.0));
        assert!(approx(round_to(est.yearly_savings, 2), 22995.0));
        match est.payback {
            Payback::Years(y) => assert!(approx(round_to(y, 2), 3.48)),
            Payback::Unbounded => panic!("expected finite payback"),
        }
    }

    #[test]
    fn test_roi_zero_savings_is_unbounded() {
        let est = roi_estimate(&RoiParams {
            capex: 80000.0,
            panel_size_m2: 10.0,
            efficiency: 0.20,
            electricity_price: 0.0,
        });
        assert_eq!(est.yearly_savings, 0.0);
        assert_eq!(est.payback, Payback::Unbounded);
    }

    #[test]
    fn test_period_multipliers() {
        assert_eq!(period_generation_kwh(2.0, Period::Daily), 2.0);
        assert_eq!(period_generation_kwh(2.0, Period::Monthly), 60.0);
        assert_eq!(period_generation_kwh(2.0, Period::Yearly), 730.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.4789, 2), 3.48);
        assert_eq!(round_to(0.12345, 3), 0.123);
    }
}
