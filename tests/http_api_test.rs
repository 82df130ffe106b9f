// ==========================================
// HTTP 路由集成测试
// ==========================================
// 测试目标: 路由 → API → JSON 响应 / 错误映射
// 工具: tower::ServiceExt::oneshot
// ==========================================


use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use futures::future::join_all;
use parcel_dispatch::app::router;
use parcel_dispatch::logging;
use serde_json::{json, Value};
use tempfile::TempDir;
use test_helpers::{create_test_db, create_test_state, csv_content, valid_row};
use tower::ServiceExt;

const BODY_LIMIT: usize = 1024 * 1024;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let (status, bytes) = send(app, request).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let export_dir = TempDir::new().unwrap();
    let app = router(create_test_state(&db_path, export_dir.path()));

    let (status, body) = send_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_driver_and_parcel_flow() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let export_dir = TempDir::new().unwrap();
    let app = router(create_test_state(&db_path, export_dir.path()));

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/drivers",
        Some(json!({
            "full_name": "Ravi Kumar",
            "phone_number": "9876543210",
            "vehicle_details": "TN48BS1234",
            "latitude": 13.05,
            "longitude": 80.2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let driver_id = body["driver_id"].as_i64().unwrap();
    assert_eq!(body["coordinates"]["latitude"], 13.05);

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/parcels",
        Some(json!({
            "customer_name": "Asha Raman",
            "phone_number": "9000000001",
            "weight": 3,
            "pin_code": "600001",
            "address": "12 Anna Salai, Chennai",
            "latitude": 13.08,
            "longitude": 80.27
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let parcel_id = body["parcel_id"].as_i64().unwrap();

    let (status, _) = send_json(
        &app,
        Method::PUT,
        &format!("/parcels/{}/assign", parcel_id),
        Some(json!({ "driver_id": driver_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, Method::GET, "/parcels", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["status"], "assigned");
    assert_eq!(body[0]["driver_name"], "Ravi Kumar");

    let (status, body) =
        send_json(&app, Method::GET, &format!("/driver-routes/{}", driver_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_parcels"], 1);
    assert_eq!(body["routes"][0]["route_color"], "#FF6B6B");

    let (status, body) = send_json(&app, Method::GET, "/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parcels"]["assigned"], 1);
    assert_eq!(body["drivers"]["active_drivers"], 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_requests_on_shared_connection() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let export_dir = TempDir::new().unwrap();
    let app = router(create_test_state(&db_path, export_dir.path()));

    let creates = (0..8).map(|i| {
        let app = app.clone();
        async move {
            send_json(
                &app,
                Method::POST,
                "/parcels",
                Some(json!({
                    "customer_name": "Asha Raman",
                    "phone_number": format!("90000000{:02}", i),
                    "weight": 1,
                    "pin_code": "600001",
                    "address": "12 Anna Salai, Chennai",
                    "latitude": 13.08,
                    "longitude": 80.27
                })),
            )
            .await
        }
    });
    let results = join_all(creates).await;
    assert!(results.iter().all(|(status, _)| *status == StatusCode::OK));

    let (status, body) = send_json(&app, Method::GET, "/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parcels"]["total_parcels"], 8);
}

#[tokio::test]
async fn test_error_mapping() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let export_dir = TempDir::new().unwrap();
    let app = router(create_test_state(&db_path, export_dir.path()));

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/drivers",
        Some(json!({ "full_name": "Ravi Kumar" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("Phone number is required"));

    let (status, body) = send_json(&app, Method::GET, "/driver-routes/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Driver not found or inactive");

    let (status, body) = send_json(&app, Method::DELETE, "/parcels/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_upload_then_download_rejected_file() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let export_dir = TempDir::new().unwrap();
    let app = router(create_test_state(&db_path, export_dir.path()));

    let rows = [
        valid_row("Asha Raman", "9000000001"),
        valid_row("Bala Murugan", "9000000001"),
    ];
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/upload-parcels?filename=parcels.csv")
        .body(Body::from(csv_content(&row_refs)))
        .unwrap();
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "CSV processing completed");
    assert_eq!(body["successCount"], 1);
    assert_eq!(body["duplicateCount"], 1);
    assert_eq!(body["errorCount"], 0);
    assert!(body["batchId"].as_str().is_some());

    let url = body["duplicatesFileUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("/download-duplicates/duplicates_"));

    let request = Request::builder().uri(&url).body(Body::empty()).unwrap();
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.starts_with("row_number,customer_name,phone_number"));
    assert_eq!(text.matches("Duplicate phone number within CSV file").count(), 1);
    assert!(text.contains("Bala Murugan"));
}

#[tokio::test]
async fn test_upload_errors() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let export_dir = TempDir::new().unwrap();
    let app = router(create_test_state(&db_path, export_dir.path()));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/upload-parcels?filename=parcels.csv")
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "No file uploaded");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/upload-parcels?filename=parcels.txt")
        .body(Body::from("a,b\n1,2\n"))
        .unwrap();
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "IMPORT_FAILED");

    let (status, body) =
        send_json(&app, Method::GET, "/download-duplicates/secrets.db", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid file name");

    let (status, body) =
        send_json(&app, Method::GET, "/download-duplicates/duplicates_1.csv", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File not found");
}
