// ==========================================
// 包裹派送管理后台 - HTTP 路由
// ==========================================
// 职责: axum 路由 → API 调用 → JSON 响应
// 说明: 业务判断全部在 API 层；这里只做参数提取与响应组装
//       同步 API（rusqlite + Mutex）经 spawn_blocking 执行，不占用异步工作线程
// ==========================================

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{ApiError, ApiResult, AssignRequest, BulkAssignRequest, StatusRequest};
use crate::app::state::AppState;
use crate::domain::driver::DriverInput;
use crate::domain::parcel::ParcelInput;

/// 上传文件大小上限
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// 构造路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        // 司机
        .route("/drivers", get(list_drivers).post(create_driver))
        .route("/drivers/:id", put(update_driver).delete(delete_driver))
        // 包裹
        .route("/parcels", get(list_parcels).post(create_parcel))
        .route("/parcels/bulk-assign", post(bulk_assign))
        .route("/parcels/:id", put(update_parcel).delete(delete_parcel))
        .route("/parcels/:id/assign", put(assign_parcel))
        .route("/parcels/:id/unassign", put(unassign_parcel))
        .route("/parcels/:id/status", put(update_parcel_status))
        // 导入
        .route(
            "/upload-parcels",
            post(upload_parcels).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/download-duplicates/:filename", get(download_duplicates))
        // 驾驶舱 / 路线
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/driver-routes", get(list_driver_workloads))
        .route("/driver-routes/:driver_id", get(get_driver_routes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 在阻塞线程池中执行同步 API 调用
async fn run_blocking<T, F>(state: Arc<AppState>, call: F) -> ApiResult<Json<T>>
where
    F: FnOnce(&AppState) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || call(&state))
        .await
        .map_err(|e| ApiError::InternalError(format!("任务执行失败: {}", e)))?
        .map(Json)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

// ===== 司机 =====

async fn list_drivers(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.driver_api.list_drivers()).await
}

async fn create_driver(
    State(state): State<Arc<AppState>>,
    Json(input): Json<DriverInput>,
) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.driver_api.create_driver(&input)).await
}

async fn update_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(input): Json<DriverInput>,
) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.driver_api.update_driver(id, &input)).await
}

async fn delete_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.driver_api.delete_driver(id)).await
}

// ===== 包裹 =====

async fn list_parcels(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.parcel_api.list_parcels()).await
}

async fn create_parcel(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ParcelInput>,
) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.parcel_api.create_parcel(&input)).await
}

async fn update_parcel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(input): Json<ParcelInput>,
) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.parcel_api.update_parcel(id, &input)).await
}

async fn delete_parcel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.parcel_api.delete_parcel(id)).await
}

async fn assign_parcel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<AssignRequest>,
) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.parcel_api.assign_parcel(id, &request)).await
}

async fn unassign_parcel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.parcel_api.unassign_parcel(id)).await
}

async fn update_parcel_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.parcel_api.update_parcel_status(id, &request)).await
}

async fn bulk_assign(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkAssignRequest>,
) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.parcel_api.bulk_assign(&request)).await
}

// ===== 导入 / 下载 =====

#[derive(Debug, Deserialize)]
struct UploadQuery {
    filename: Option<String>,
}

async fn upload_parcels(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let response = state
        .import_api
        .upload_parcels(query.filename.as_deref(), &body)
        .await?;
    Ok(Json(response))
}

async fn download_duplicates(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let bytes = state.import_api.download_duplicates(&filename).await?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];
    Ok((headers, bytes))
}

// ===== 驾驶舱 / 路线 =====

async fn dashboard_stats(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.dashboard_api.dashboard_stats()).await
}

async fn list_driver_workloads(
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.route_api.list_driver_workloads()).await
}

async fn get_driver_routes(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    run_blocking(state, move |s| s.route_api.get_driver_routes(driver_id)).await
}
