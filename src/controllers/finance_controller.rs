use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Json,
};

use crate::error::{ensure_finite, ApiError, ApiResult};
use crate::models::finance::{
    PaybackYears, RoiQuery, RoiResponse, SimulationRequest, SimulationResponse,
};
use crate::services::estimator::{self, round_to, Payback};

const SIMULATION_NOTE: &str = "Values are averages. Actual needs vary with soil, region, and climate.";

/// POST /api/simulation
/// Smart-irrigation savings for a crop
///
/// Looks up the crop's baseline water requirement (unknown crops use the
/// default), assumes smart irrigation saves 30 % of it, and prices the saving
/// at `rate` per 1000 litres against a ₹5000/acre investment.
#[utoipa::path(
    post,
    path = "/api/simulation",
    request_body = SimulationRequest,
    responses(
        (status = 200, description = "Simulation result", body = SimulationResponse),
        (status = 400, description = "Malformed body or non-positive area")
    )
)]
pub async fn simulation(
    body: Result<Json<SimulationRequest>, JsonRejection>,
) -> ApiResult<Json<SimulationResponse>> {
    let Json(req) = body?;
    if !(req.area > 0.0) || !req.area.is_finite() {
        return Err(ApiError::bad_request("area must be a positive number of acres"));
    }
    ensure_finite(&[("rate", req.rate)])?;

    let est = estimator::irrigation_estimate(req.area, &req.crop, req.rate);
    tracing::debug!(crop = %est.crop, area = est.area_acres, base = est.base_requirement_l, "irrigation simulation");

    Ok(Json(SimulationResponse {
        crop: est.crop,
        area_acres: est.area_acres,
        water_saved_liters_per_day: round_to(est.water_saved_l, 2),
        cost_saved_inr_per_day: est.cost_saved,
        investment_inr: round_to(est.investment, 2),
        roi_percent_per_year: round_to(est.roi_percent_per_year, 2),
        note: SIMULATION_NOTE.to_string(),
    }))
}

/// GET /api/roi
/// Payback period of a solar installation
///
/// Assumes 4.5 peak sun hours per day. `payback_years` is the string
/// `"Infinity"` when the installation saves nothing.
#[utoipa::path(
    get,
    path = "/api/roi",
    params(RoiQuery),
    responses(
        (status = 200, description = "ROI estimate", body = RoiResponse),
        (status = 400, description = "Missing, invalid or non-finite parameters")
    )
)]
pub async fn roi(query: Result<Query<RoiQuery>, QueryRejection>) -> ApiResult<Json<RoiResponse>> {
    let Query(q) = query?;
    q.ensure_finite()?;
    let params = q.params();
    let est = estimator::roi_estimate(&params);

    let payback = match est.payback {
        Payback::Years(years) => Payback::Years(round_to(years, 2)),
        Payback::Unbounded => Payback::Unbounded,
    };

    Ok(Json(RoiResponse {
        daily_kwh: round_to(est.daily_kwh, 3),
        yearly_savings: round_to(est.yearly_savings, 2),
        payback_years: PaybackYears(payback),
        params,
    }))
}
