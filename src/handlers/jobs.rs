use axum::{body::Bytes, extract::State, response::IntoResponse, routing::post, Router};
use chrono::Utc;

use crate::{
    errors::ServiceError,
    handlers::{
        common::{json_or_default, success_response},
        AppState,
    },
    models::{RunRequest, RunResult},
};

/// Run the forecasting job and overwrite the latest artifacts.
///
/// The body is optional; omitted fields use the configured defaults.
#[utoipa::path(
    post,
    path = "/jobs/run",
    request_body(content = RunRequest, description = "Optional; an empty body uses the defaults"),
    responses(
        (status = 200, description = "Run completed", body = RunResult),
        (status = 400, description = "Invalid parameters, or sales data missing or unreadable", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn run_job(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    let request: RunRequest = json_or_default(&body)?;
    let result = state.forecasting.run(request, Utc::now()).await?;
    Ok(success_response(result))
}

pub fn job_routes() -> Router<AppState> {
    Router::new().route("/jobs/run", post(run_job))
}
