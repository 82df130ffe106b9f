// ==========================================
// 包裹派送管理后台 - HTTP 服务主入口
// ==========================================
// 启动顺序: 日志 → 启动配置 → AppState（建表）→ 监听
// ==========================================

use std::sync::Arc;

use anyhow::Context;
use parcel_dispatch::app::{router, AppState};
use parcel_dispatch::config::AppConfig;
use parcel_dispatch::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", parcel_dispatch::APP_NAME);
    tracing::info!("系统版本: {}", parcel_dispatch::VERSION);
    tracing::info!("==================================================");

    let config = AppConfig::from_env();
    tracing::info!(
        db_path = %config.db_path,
        export_dir = %config.export_dir.display(),
        "启动配置已加载"
    );

    let state = AppState::new(&config).map_err(|e| anyhow::anyhow!(e))?;
    match state.config_manager.get_config_snapshot() {
        Ok(overrides) => tracing::info!(?overrides, "运行期配置覆写"),
        Err(e) => tracing::warn!(error = %e, "读取运行期配置失败，按默认值运行"),
    }
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("无法监听地址 {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "HTTP 服务已启动");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    tracing::info!("HTTP 服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "无法监听退出信号");
    }
}
