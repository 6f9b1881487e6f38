use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    errors::ErrorResponse,
    handlers::{
        data::{UploadForm, UploadResponse},
        health::HealthResponse,
    },
    models::{
        ForecastPoint, Frequency, ModelParams, ModelRegistryEntry, RunRequest, RunResult,
        RunSummary,
    },
};

pub const OPENAPI_JSON_PATH: &str = "/openapi.json";
pub const DOCS_PATH: &str = "/docs";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Meal Forecast API",
        description = r#"
# School Meal Demand Forecasting

Ingests sales, tray-waste and plate-waste CSVs, aggregates net consumption per
dish category and produces a baseline forecast per category.

## Workflow

1. `POST /data/upload` the three datasets (when direct upload is enabled), or
   place `sales.csv`, `tray-waste.csv` and `plate-waste.csv` in the data directory.
2. `POST /jobs/run` with an optional `{horizon, frequency}` body.
3. Read `GET /forecasts/latest` and `GET /model-registry`.

Each run replaces both artifacts.
        "#
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "data", description = "Dataset upload"),
        (name = "jobs", description = "Forecast runs"),
        (name = "forecasts", description = "Latest run artifacts")
    ),
    paths(
        crate::handlers::health::health_check,
        crate::handlers::data::upload_datasets,
        crate::handlers::jobs::run_job,
        crate::handlers::forecasts::latest_forecasts,
        crate::handlers::forecasts::model_registry,
    ),
    components(
        schemas(
            HealthResponse,
            UploadForm,
            UploadResponse,
            RunRequest,
            RunResult,
            RunSummary,
            Frequency,
            ForecastPoint,
            ModelParams,
            ModelRegistryEntry,
            ErrorResponse,
        )
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/docs`, backed by the document at `/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new(DOCS_PATH).url(OPENAPI_JSON_PATH, api_doc())
}

/// The OpenAPI document, with the crate version filled in.
pub fn api_doc() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let json = serde_json::to_string(&api_doc()).unwrap();
        for path in [
            "/health",
            "/data/upload",
            "/jobs/run",
            "/forecasts/latest",
            "/model-registry",
        ] {
            assert!(json.contains(path), "missing {}", path);
        }
        assert!(json.contains("Meal Forecast API"));
    }
}
