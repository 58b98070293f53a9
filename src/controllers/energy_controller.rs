use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::{DateTime, Utc};

use crate::config::EnergyProvider;
use crate::error::ApiResult;
use crate::models::energy::{
    BalanceStatus, CarbonFootprintResponse, CarbonQuery, CompareQuery, CompareResponse,
    EnergyQuery, EnergyResponse,
};
use crate::services::estimator::{self, round_to};
use crate::services::series::{self, TimeSeries};
use crate::services::upstream::{Provider, UpstreamQuery};
use crate::services::DataError;
use crate::shared_state::AppState;

const NASA_IRRADIANCE: &str = "ALLSKY_SFC_SW_DWN";
const OPEN_METEO_IRRADIANCE: &str = "shortwave_radiation";
const OPEN_METEO_WIND: &str = "windspeed_10m";
const OPEN_METEO_RAIN: &str = "precipitation";
const HOURS_PER_DAY: usize = 24;

const PERIOD_NOTE: &str =
    "Monthly and yearly figures are one day's generation multiplied by 30 and 365; they are approximations, not calendar totals.";

/// GET /api/energy
/// Estimated renewable generation right now
///
/// Uses the latest irradiance sample for the current hour (earlier non-zero
/// hours replace a zero "not reported yet" reading) to estimate solar output,
/// on-site usage and the CO₂ avoided by the remainder. With the Open-Meteo
/// provider, wind output at the current hour and hydro potential of today's
/// rain are included too.
#[utoipa::path(
    get,
    path = "/api/energy",
    params(EnergyQuery),
    responses(
        (status = 200, description = "Energy estimate (possibly fallback)", body = EnergyResponse),
        (status = 400, description = "Missing or invalid parameters")
    )
)]
pub async fn energy(
    State(state): State<AppState>,
    query: Result<Query<EnergyQuery>, QueryRejection>,
) -> ApiResult<Json<EnergyResponse>> {
    let Query(q) = query?;
    q.ensure_finite()?;
    let provider = state.config.energy.provider;
    let now = Utc::now();

    let result = match provider {
        EnergyProvider::OpenMeteo => open_meteo_energy(&state, &q, now).await,
        EnergyProvider::NasaPower => nasa_power_energy(&state, &q, now).await,
    };

    let response = result.unwrap_or_else(|err| {
        tracing::warn!(lat = q.lat, lon = q.lon, ?provider, error = %err, "energy fallback");
        EnergyResponse::fallback(
            provider,
            q.solar_params(),
            format!("Fallback data used due to weather service error ({err})"),
        )
    });
    Ok(Json(response))
}

async fn open_meteo_energy(
    state: &AppState,
    q: &EnergyQuery,
    now: DateTime<Utc>,
) -> Result<EnergyResponse, DataError> {
    let query = UpstreamQuery::hourly(
        q.lat,
        q.lon,
        &[OPEN_METEO_IRRADIANCE, OPEN_METEO_WIND, OPEN_METEO_RAIN],
    )
    .with("wind_speed_unit", "ms")
    .with("forecast_days", "1");
    let payload = state.upstream.fetch(Provider::OpenMeteo, &query).await?;

    let slot = series::open_meteo_slot(now, series::utc_offset_seconds(&payload));

    let radiation = TimeSeries::from_block(&payload, "hourly", OPEN_METEO_IRRADIANCE)?;
    let reading = radiation
        .current_reading(&slot)
        .ok_or(DataError::NoValue(OPEN_METEO_IRRADIANCE))?;
    if !reading.exact_match {
        tracing::debug!(
            series = %radiation.name,
            %slot,
            index = reading.index,
            used = ?reading.timestamp,
            "current hour not in series; fell back to last sample"
        );
    }

    let wind = TimeSeries::from_block(&payload, "hourly", OPEN_METEO_WIND)?;
    let wind_speed = wind
        .current_index(&slot)
        .and_then(|(i, _)| wind.values[i])
        .or_else(|| wind.latest_valid())
        .ok_or(DataError::NoValue(OPEN_METEO_WIND))?;

    let rain = TimeSeries::from_block(&payload, "hourly", OPEN_METEO_RAIN)?;
    let rain_mm = rain
        .windowed_sum(HOURS_PER_DAY)
        .ok_or(DataError::NoValue(OPEN_METEO_RAIN))?;

    let params = q.solar_params();
    let solar = estimator::solar_estimate(reading.value, &params);
    let wind_kw = estimator::wind_kw(wind_speed, &state.config.estimator.wind);
    let hydro_kw = estimator::hydro_kw(rain_mm, &state.config.estimator.hydro);

    Ok(EnergyResponse {
        timestamp: reading.timestamp,
        provider: EnergyProvider::OpenMeteo,
        solar_kw: round_to(solar.solar_kw, 3),
        usage_kw: round_to(solar.usage_kw, 3),
        wind_kw: Some(round_to(wind_kw, 3)),
        hydro_kw: Some(round_to(hydro_kw, 3)),
        co2_saved: round_to(solar.co2_saved_kg, 3),
        params,
        note: None,
    })
}

async fn nasa_power_energy(
    state: &AppState,
    q: &EnergyQuery,
    now: DateTime<Utc>,
) -> Result<EnergyResponse, DataError> {
    let today = now.date_naive();
    let query = UpstreamQuery::hourly(q.lat, q.lon, &[NASA_IRRADIANCE]).between(today, today);
    let payload = state.upstream.fetch(Provider::NasaPower, &query).await?;

    let irradiance = TimeSeries::from_nasa_power(&payload, NASA_IRRADIANCE)?;
    let reading = irradiance
        .current_reading(&series::nasa_power_slot(now))
        .ok_or(DataError::NoValue(NASA_IRRADIANCE))?;

    let params = q.solar_params();
    let solar = estimator::solar_estimate(reading.value, &params);

    Ok(EnergyResponse {
        timestamp: reading.timestamp,
        provider: EnergyProvider::NasaPower,
        solar_kw: round_to(solar.solar_kw, 3),
        usage_kw: round_to(solar.usage_kw, 3),
        wind_kw: None,
        hydro_kw: None,
        co2_saved: round_to(solar.co2_saved_kg, 3),
        params,
        note: None,
    })
}

/// GET /api/compare
/// Generation vs. consumption balance
#[utoipa::path(
    get,
    path = "/api/compare",
    params(CompareQuery),
    responses(
        (status = 200, description = "Energy balance", body = CompareResponse),
        (status = 400, description = "Missing or invalid generation/usage")
    )
)]
pub async fn compare(query: Result<Query<CompareQuery>, QueryRejection>) -> ApiResult<Json<CompareResponse>> {
    let Query(q) = query?;
    q.ensure_finite()?;
    let balance = round_to(q.generation - q.usage, 3);
    let status = if balance > 0.0 {
        BalanceStatus::Surplus
    } else if balance < 0.0 {
        BalanceStatus::Deficit
    } else {
        BalanceStatus::Balanced
    };

    Ok(Json(CompareResponse {
        generation_kwh: round_to(q.generation, 3),
        usage_kwh: round_to(q.usage, 3),
        balance_kwh: balance,
        status,
    }))
}

/// GET /api/carbon_footprint
/// CO₂ avoided by solar generation over a period
///
/// Sums today's hourly irradiance into daily panel output, then scales it to
/// the requested period (×1, ×30, ×365).
#[utoipa::path(
    get,
    path = "/api/carbon_footprint",
    params(CarbonQuery),
    responses(
        (status = 200, description = "Carbon estimate (possibly fallback)", body = CarbonFootprintResponse),
        (status = 400, description = "Missing coordinates or unknown period")
    )
)]
pub async fn carbon_footprint(
    State(state): State<AppState>,
    query: Result<Query<CarbonQuery>, QueryRejection>,
) -> ApiResult<Json<CarbonFootprintResponse>> {
    let Query(q) = query?;
    q.ensure_finite()?;
    let days = q.period.days();

    let response = match daily_irradiance(&state, q.lat, q.lon).await {
        Ok(daily_wh_m2) => {
            let daily_kwh = estimator::daily_generation_kwh(daily_wh_m2, q.panel_size, q.efficiency);
            let generation = estimator::period_generation_kwh(daily_kwh, q.period);
            CarbonFootprintResponse {
                period: q.period,
                days_multiplier: days,
                generation_kwh: round_to(generation, 3),
                co2_avoided_kg: round_to((generation * q.co2_factor).max(0.0), 3),
                note: PERIOD_NOTE.to_string(),
            }
        }
        Err(err) => {
            tracing::warn!(lat = q.lat, lon = q.lon, error = %err, "carbon footprint fallback");
            CarbonFootprintResponse {
                period: q.period,
                days_multiplier: days,
                generation_kwh: 0.0,
                co2_avoided_kg: 0.0,
                note: format!("Fallback data used due to weather service error ({err})"),
            }
        }
    };
    Ok(Json(response))
}

/// Today's irradiance in Wh/m², summed over the first 24 hourly samples.
async fn daily_irradiance(state: &AppState, lat: f64, lon: f64) -> Result<f64, DataError> {
    let query = UpstreamQuery::hourly(lat, lon, &[OPEN_METEO_IRRADIANCE]).with("forecast_days", "1");
    let payload = state.upstream.fetch(Provider::OpenMeteo, &query).await?;
    TimeSeries::from_block(&payload, "hourly", OPEN_METEO_IRRADIANCE)?
        .windowed_sum(HOURS_PER_DAY)
        .ok_or(DataError::NoValue(OPEN_METEO_IRRADIANCE))
}
