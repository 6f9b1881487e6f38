//! Meal Forecast Library
//!
//! Ingests school-canteen sales and waste datasets, aggregates net consumption
//! per dish category and serves a baseline forecast over HTTP.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod artifacts;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod ml;
pub mod models;
pub mod openapi;
pub mod services;
pub mod tracing;

use std::sync::Arc;

use axum::{
    http::{HeaderName, HeaderValue},
    response::Redirect,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, Any, CorsLayer},
};

use crate::{
    artifacts::{ArtifactStore, FileArtifactStore},
    config::AppConfig,
    services::ForecastingService,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub forecasting: Arc<ForecastingService>,
}

impl AppState {
    /// State backed by the configured data and artifact directories.
    pub fn from_config(config: AppConfig) -> Self {
        let artifacts: Arc<dyn ArtifactStore> =
            Arc::new(FileArtifactStore::new(&config.artifacts_dir));
        Self::with_artifact_store(config, artifacts)
    }

    pub fn with_artifact_store(config: AppConfig, artifacts: Arc<dyn ArtifactStore>) -> Self {
        let forecasting = Arc::new(ForecastingService::from_config(&config, artifacts));
        Self {
            config: Arc::new(config),
            forecasting,
        }
    }
}

/// Builds the full HTTP application: routes, docs and the middleware stack.
pub fn app_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(|| async { Redirect::temporary(openapi::DOCS_PATH) }))
        .merge(handlers::health::health_routes())
        .merge(handlers::data::data_routes(max_upload_bytes))
        .merge(handlers::jobs::job_routes())
        .merge(handlers::forecasts::forecast_routes())
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

/// CORS policy from `allowed_origins`.
///
/// `*` allows any origin without credentials. An explicit list allows only
/// those origins, with credentials, mirroring the requested methods and headers.
pub fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                ::tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers([HeaderName::from_static(
            middleware_helpers::REQUEST_ID_HEADER,
        )])
}
