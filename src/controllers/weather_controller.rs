use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::{Days, Utc};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::models::weather::{
    ForecastQuery, ForecastResponse, LocationDataResponse, LocationQuery, StatusResponse,
};
use crate::services::series::{self, SeriesError, TimeSeries};
use crate::services::upstream::{Provider, UpstreamQuery};
use crate::services::DataError;
use crate::shared_state::AppState;

const LOCATION_VARIABLES: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "windspeed_10m",
    "precipitation",
    "soil_moisture_0_1cm",
];

const FORECAST_VARIABLES: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "windspeed_10m",
    "precipitation",
];

/// Open-Meteo serves at most 16 forecast days including today.
const MAX_FORECAST_DAYS: u32 = 15;

/// GET /
/// Liveness check
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Backend is up", body = StatusResponse))
)]
pub async fn index() -> Json<StatusResponse> {
    Json(StatusResponse { status: "Backend is running".to_string() })
}

/// GET /api/location-data
/// Current weather summary for a location
///
/// Summarises the Open-Meteo hourly forecast: min/max temperature, the latest
/// humidity, wind, soil moisture and temperature, and the first hour's rainfall.
/// The raw hourly block is returned as `history`. When Open-Meteo is unreachable
/// the response is zero-valued and carries a `note`.
#[utoipa::path(
    get,
    path = "/api/location-data",
    params(LocationQuery),
    responses(
        (status = 200, description = "Weather summary (possibly fallback)", body = LocationDataResponse),
        (status = 400, description = "Missing or invalid lat/lon")
    )
)]
pub async fn location_data(
    State(state): State<AppState>,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> ApiResult<Json<LocationDataResponse>> {
    let Query(q) = query?;
    q.ensure_finite()?;
    let upstream_query =
        UpstreamQuery::hourly(q.lat, q.lon, LOCATION_VARIABLES).with("current_weather", "true");

    let result = match state.upstream.fetch(Provider::OpenMeteo, &upstream_query).await {
        Ok(payload) => summarize_location(&payload).map_err(DataError::from),
        Err(err) => Err(err.into()),
    };

    let response = result.unwrap_or_else(|err| {
        tracing::warn!(lat = q.lat, lon = q.lon, error = %err, "location data fallback");
        LocationDataResponse::fallback(format!("Fallback data used: weather service unavailable ({err})"))
    });
    Ok(Json(response))
}

fn summarize_location(payload: &Value) -> Result<LocationDataResponse, SeriesError> {
    let hourly = payload
        .get("hourly")
        .filter(|h| h.is_object())
        .ok_or_else(|| SeriesError::MissingBlock("hourly".to_string()))?;

    // a single missing variable only blanks its own field
    let series = |name: &str| match TimeSeries::from_block(payload, "hourly", name) {
        Ok(ts) => Some(ts),
        Err(err) => {
            tracing::debug!(error = %err, "series unavailable");
            None
        }
    };

    let temperature = series("temperature_2m");
    let latest = |name: &str| series(name).and_then(|s| s.latest_valid());

    Ok(LocationDataResponse {
        temp_max: temperature.as_ref().and_then(TimeSeries::max),
        temp_min: temperature.as_ref().and_then(TimeSeries::min),
        humidity: latest("relative_humidity_2m"),
        wind_speed: latest("windspeed_10m"),
        rainfall: series("precipitation").and_then(|s| s.windowed_sum(1)),
        soil_moisture: latest("soil_moisture_0_1cm"),
        temperature: temperature.as_ref().and_then(TimeSeries::latest_valid),
        current_weather: payload.get("current_weather").cloned(),
        history: hourly.clone(),
        note: None,
    })
}

/// GET /api/forecast
/// Hourly forecast table
///
/// Hourly temperature, humidity, wind and precipitation from today through
/// `days` days ahead. "Today" is the location's local date, so the returned
/// `start_date`/`end_date` follow the payload's `utc_offset_seconds` (UTC on
/// fallback).
#[utoipa::path(
    get,
    path = "/api/forecast",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Hourly forecast (possibly fallback)", body = ForecastResponse),
        (status = 400, description = "Missing lat/lon or days out of range")
    )
)]
pub async fn forecast(
    State(state): State<AppState>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> ApiResult<Json<ForecastResponse>> {
    let Query(q) = query?;
    q.ensure_finite()?;
    if q.days > MAX_FORECAST_DAYS {
        return Err(ApiError::bad_request(format!(
            "days must be between 0 and {MAX_FORECAST_DAYS}"
        )));
    }

    // Open-Meteo counts forecast days from today in the location's timezone,
    // which is only known once the payload arrives.
    let now = Utc::now();
    let upstream_query = UpstreamQuery::hourly(q.lat, q.lon, FORECAST_VARIABLES)
        .with("forecast_days", (q.days + 1).to_string());

    let (offset, timezone, hourly, note) = match state.upstream.fetch(Provider::OpenMeteo, &upstream_query).await {
        Ok(payload) => match payload.get("hourly").filter(|h| h.is_object()) {
            Some(hourly) => (
                series::utc_offset_seconds(&payload),
                payload.get("timezone").and_then(Value::as_str).map(str::to_string),
                hourly.clone(),
                None,
            ),
            None => {
                tracing::warn!(lat = q.lat, lon = q.lon, "forecast payload has no hourly block");
                (0, None, json!({}), Some("Fallback data used: forecast missing from weather service".to_string()))
            }
        },
        Err(err) => {
            tracing::warn!(lat = q.lat, lon = q.lon, error = %err, "forecast fallback");
            (0, None, json!({}), Some(format!("Fallback data used: weather service unavailable ({err})")))
        }
    };

    let start = series::local_date(now, offset);
    let end = start
        .checked_add_days(Days::new(u64::from(q.days)))
        .ok_or_else(|| ApiError::bad_request("date range out of bounds"))?;

    let response = ForecastResponse {
        start_date: start.to_string(),
        end_date: end.to_string(),
        timezone,
        hourly,
        note,
    };
    Ok(Json(response))
}
