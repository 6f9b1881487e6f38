mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use serde_json::json;

const SALES: &str = "Regione,Città,Scuola,Mese,Settimana,Categoria piatto,Piatto,Valore\nLazio,Roma,Verdi,Gen,1,Primi,Pasta,100\n";
const TRAY: &str = "Categoria piatto,Valore\nPrimi,20\n";
const PLATE: &str = "Categoria piatto,Valore\nPrimi,10\n";

#[tokio::test]
async fn upload_stores_files_verbatim() {
    let app = TestApp::new();

    let response = app
        .upload(&[("sales", SALES), ("tray_waste", TRAY), ("plate_waste", PLATE)])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data_dir"], app.data_dir().display().to_string());

    let data_dir = app.data_dir();
    assert_eq!(std::fs::read_to_string(data_dir.join("sales.csv")).unwrap(), SALES);
    assert_eq!(std::fs::read_to_string(data_dir.join("tray-waste.csv")).unwrap(), TRAY);
    assert_eq!(std::fs::read_to_string(data_dir.join("plate-waste.csv")).unwrap(), PLATE);
}

#[tokio::test]
async fn italian_field_names_are_accepted_and_feed_the_run() {
    let app = TestApp::new();

    let response = app
        .upload(&[
            ("vendite", SALES),
            ("scarto_teglia", TRAY),
            ("scarto_piatto", PLATE),
            ("notes", "ignored"),
        ])
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::POST, "/jobs/run", Some(json!({"horizon": 2})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let forecasts = response_json(app.request(Method::GET, "/forecasts/latest", None).await).await;
    assert_eq!(forecasts.as_array().unwrap().len(), 2);
    assert_eq!(forecasts[0]["categoria"], "Primi");
    assert_eq!(forecasts[0]["yhat"], 70.0);
}

#[tokio::test]
async fn missing_part_is_rejected_without_writing() {
    let app = TestApp::new();

    let response = app.upload(&[("sales", SALES), ("tray_waste", TRAY)]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("plate_waste"));
    assert!(!app.data_dir().join("sales.csv").exists());
}

#[tokio::test]
async fn upload_is_forbidden_when_disabled() {
    let app = TestApp::with_config(|cfg| cfg.enable_direct_upload = false);

    let response = app
        .upload(&[("sales", SALES), ("tray_waste", TRAY), ("plate_waste", PLATE)])
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Forbidden");
    assert!(!app.data_dir().join("sales.csv").exists());
}

#[tokio::test]
async fn disabled_flag_is_checked_before_the_body() {
    let app = TestApp::with_config(|cfg| cfg.enable_direct_upload = false);

    let response = app.request(Method::POST, "/data/upload", Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn non_multipart_body_is_a_bad_request() {
    let app = TestApp::new();

    let response = app.request(Method::POST, "/data/upload", Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_upload_leaves_previous_datasets_in_place() {
    let app = TestApp::new();
    let response = app
        .upload(&[("sales", SALES), ("tray_waste", TRAY), ("plate_waste", PLATE)])
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Occupy the plate-waste staging slot so that write fails.
    std::fs::create_dir(app.data_dir().join(".plate-waste.csv.tmp")).unwrap();

    let replacement = "Categoria piatto,Valore\nSecondi,5\n";
    let response = app
        .upload(&[
            ("sales", replacement),
            ("tray_waste", replacement),
            ("plate_waste", replacement),
        ])
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let data_dir = app.data_dir();
    assert_eq!(std::fs::read_to_string(data_dir.join("sales.csv")).unwrap(), SALES);
    assert_eq!(std::fs::read_to_string(data_dir.join("tray-waste.csv")).unwrap(), TRAY);
    assert_eq!(std::fs::read_to_string(data_dir.join("plate-waste.csv")).unwrap(), PLATE);
    assert!(!data_dir.join(".sales.csv.tmp").exists());
    assert!(!data_dir.join(".tray-waste.csv.tmp").exists());
}
