use axum::{
    response::Html,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::controllers::energy_controller::{carbon_footprint, compare, energy};
use crate::controllers::finance_controller::{roi, simulation};
use crate::controllers::weather_controller::{forecast, index, location_data};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/location-data",    get(location_data))
        .route("/forecast",         get(forecast))
        .route("/energy",           get(energy))
        .route("/simulation",       post(simulation))
        .route("/compare",          get(compare))
        .route("/carbon_footprint", get(carbon_footprint))
        .route("/roi",              get(roi))
        .with_state(state)
}

/// Full application router without transport layers or static files.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .nest("/api", api_routes(state))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
}
