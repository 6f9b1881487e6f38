#![allow(dead_code)]

use std::path::PathBuf;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use meal_forecast::{app_router, config::AppConfig, models::DatasetKind, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "meal-forecast-test-boundary";

/// Helper harness running the real router over throwaway data/artifact directories.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Construct an application after adjusting the default test configuration.
    pub fn with_config(customize: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let mut cfg = AppConfig::new(dir.path().join("data"), dir.path().join("artifacts"));
        cfg.app_version = "test-version".to_string();
        customize(&mut cfg);
        cfg.ensure_directories().expect("create test directories");

        let state = AppState::from_config(cfg);
        Self {
            router: app_router(state.clone()),
            state,
            dir,
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.state.config.data_dir.clone()
    }

    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.state.config.artifacts_dir.join(file_name)
    }

    /// Write a dataset CSV directly into the data directory.
    pub fn write_dataset(&self, kind: DatasetKind, contents: &str) {
        std::fs::write(self.data_dir().join(kind.file_name()), contents).expect("write dataset");
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }

    /// Send a request with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        } else {
            Body::empty()
        };

        self.send(builder.body(body).expect("request")).await
    }

    /// POST a multipart upload with `(field, contents)` file parts.
    pub async fn upload(&self, parts: &[(&str, &str)]) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/data/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .expect("request");
        self.send(request).await
    }

    /// Seed all three datasets with one category each.
    pub fn seed_single_category(&self, sales: f64, tray: f64, plate: f64) {
        self.write_dataset(DatasetKind::Sales, &format!("Categoria piatto,Valore\nA,{}\n", sales));
        self.write_dataset(DatasetKind::TrayWaste, &format!("Categoria piatto,Valore\nA,{}\n", tray));
        self.write_dataset(DatasetKind::PlateWaste, &format!("Categoria piatto,Valore\nA,{}\n", plate));
    }
}

pub fn multipart_body(parts: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, contents) in parts {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{name}.csv\"\r\nContent-Type: text/csv\r\n\r\n{contents}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
