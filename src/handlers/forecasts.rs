use axum::{extract::State, response::IntoResponse, routing::get, Router};

use crate::{
    errors::ServiceError,
    handlers::{common::success_response, AppState},
    models::{ForecastPoint, ModelRegistryEntry},
};

/// Forecast points from the latest run; empty before the first run.
#[utoipa::path(
    get,
    path = "/forecasts/latest",
    responses(
        (status = 200, description = "Latest forecast points", body = [ForecastPoint]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "forecasts"
)]
pub async fn latest_forecasts(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let points = state.forecasting.latest_forecasts().await?;
    Ok(success_response(points))
}

/// Per-category model registry from the latest run.
#[utoipa::path(
    get,
    path = "/model-registry",
    responses(
        (status = 200, description = "Latest registry entries", body = [ModelRegistryEntry]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "forecasts"
)]
pub async fn model_registry(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let entries = state.forecasting.latest_registry().await?;
    Ok(success_response(entries))
}

pub fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/forecasts/latest", get(latest_forecasts))
        .route("/model-registry", get(model_registry))
}
