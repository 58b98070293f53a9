use utoipa::OpenApi;
use crate::controllers::{energy_controller, finance_controller, weather_controller};
use crate::models::{energy, finance, weather};
use crate::config;
use crate::services::estimator;

#[derive(OpenApi)]
#[openapi(
    paths(
        weather_controller::index,
        weather_controller::location_data,
        weather_controller::forecast,
        energy_controller::energy,
        energy_controller::compare,
        energy_controller::carbon_footprint,
        finance_controller::simulation,
        finance_controller::roi
    ),
    components(
        schemas(
            weather::StatusResponse,
            weather::LocationDataResponse,
            weather::ForecastResponse,
            energy::EnergyResponse,
            energy::CompareResponse,
            energy::BalanceStatus,
            energy::CarbonFootprintResponse,
            finance::SimulationRequest,
            finance::SimulationResponse,
            finance::RoiResponse,
            finance::PaybackYears,
            config::EnergyProvider,
            estimator::SolarParams,
            estimator::RoiParams,
            estimator::Period
        )
    ),
    tags(
        (name = "agro-energy-api", description = "Weather, renewable generation and farm savings API")
    )
)]
pub struct ApiDoc;
