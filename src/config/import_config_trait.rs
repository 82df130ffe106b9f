// ==========================================
// 包裹派送管理后台 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入/导出流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// 配置读取错误（可跨 await 传递）
pub type ConfigError = Box<dyn Error + Send + Sync>;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入管道与下载接口所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 导入响应中最多返回的错误条数
    ///
    /// # 默认值
    /// - 10
    async fn get_max_reported_errors(&self) -> Result<usize, ConfigError>;

    /// 拒绝文件下载后的删除延迟（秒）
    ///
    /// # 默认值
    /// - 5
    async fn get_export_cleanup_delay_secs(&self) -> Result<u64, ConfigError>;
}
