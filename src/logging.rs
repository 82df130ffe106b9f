// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别与输出格式
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 输出格式环境变量（值为 json 时输出结构化日志）
pub const LOG_FORMAT_ENV: &str = "PARCEL_DISPATCH_LOG_FORMAT";

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=parcel_dispatch=trace,tower_http=debug
/// - PARCEL_DISPATCH_LOG_FORMAT: json | text（默认: text）
///
/// # 示例
/// ```no_run
/// use parcel_dispatch::logging;
/// logging::init();
/// ```
pub fn init() {
    // 从环境变量读取日志级别，默认为 info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
