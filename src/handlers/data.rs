use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::{
    errors::ServiceError,
    handlers::{common::success_response, AppState},
    models::DatasetKind,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// Directory the datasets were written to
    pub data_dir: String,
}

/// Multipart form accepted by the upload route. Documentation only.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// Sales CSV (alias `vendite`)
    #[schema(value_type = String, format = Binary)]
    sales: Vec<u8>,
    /// Tray-waste CSV (alias `scarto_teglia`)
    #[schema(value_type = String, format = Binary)]
    tray_waste: Vec<u8>,
    /// Plate-waste CSV (alias `scarto_piatto`)
    #[schema(value_type = String, format = Binary)]
    plate_waste: Vec<u8>,
}

/// Replace the three dataset files.
///
/// Expects `multipart/form-data` with file parts `sales`, `tray_waste` and
/// `plate_waste` (or `vendite`, `scarto_teglia`, `scarto_piatto`). Contents are
/// stored verbatim; nothing is written unless all three parts are present.
#[utoipa::path(
    post,
    path = "/data/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Datasets stored", body = UploadResponse),
        (status = 400, description = "Missing or malformed parts", body = crate::errors::ErrorResponse),
        (status = 403, description = "Direct upload disabled", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "data"
)]
pub async fn upload_datasets(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    if !state.config.enable_direct_upload {
        warn!("direct upload attempted while disabled");
        return Err(ServiceError::FeatureDisabled(
            "Direct upload disabled on server".to_string(),
        ));
    }

    let multipart = multipart.map_err(|e| ServiceError::ValidationError(e.body_text()))?;
    let parts = read_parts(multipart).await?;

    let missing: Vec<&str> = DatasetKind::iter()
        .filter(|kind| !parts.contains_key(kind))
        .map(|kind| kind.upload_fields()[0])
        .collect();
    if !missing.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "Missing upload parts: {}",
            missing.join(", ")
        )));
    }

    let files: Vec<(DatasetKind, &[u8])> = DatasetKind::iter()
        .filter_map(|kind| parts.get(&kind).map(|body| (kind, &body[..])))
        .collect();
    let store = state.forecasting.datasets();
    store.save_all(&files).await?;

    Ok(success_response(UploadResponse {
        status: "ok".to_string(),
        data_dir: store.data_dir().display().to_string(),
    }))
}

async fn read_parts(mut multipart: Multipart) -> Result<HashMap<DatasetKind, Bytes>, ServiceError> {
    let mut parts = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::ValidationError(e.body_text()))?
    {
        let Some(kind) = field.name().and_then(DatasetKind::from_upload_field) else {
            debug!(field = ?field.name(), "ignoring unknown upload part");
            continue;
        };
        let body = field
            .bytes()
            .await
            .map_err(|e| ServiceError::ValidationError(e.body_text()))?;
        parts.insert(kind, body);
    }
    Ok(parts)
}

pub fn data_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/data/upload", post(upload_datasets))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
