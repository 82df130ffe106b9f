// ==========================================
// 包裹派送管理后台 - 批量导入 API
// ==========================================
// 职责: 接收上传文件 → 调用导入管道 → 组装响应；拒绝文件下载
// 响应键: camelCase（successCount / errorCount / duplicateCount /
//         duplicatesFileUrl / errors / batchId）
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::DEFAULT_EXPORT_CLEANUP_DELAY_SECS;
use crate::config::ImportConfigReader;
use crate::domain::import::ImportReport;
use crate::importer::{CsvRejectedExporter, ParcelImporter};

/// 下载路由前缀
pub const DOWNLOAD_ROUTE_PREFIX: &str = "/download-duplicates/";

/// 导入响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportApiResponse {
    pub message: String,
    pub success_count: usize,
    pub error_count: usize,
    pub duplicate_count: usize,
    pub duplicates_file_url: Option<String>,
    pub errors: Vec<String>,
    pub batch_id: String,
}

impl From<ImportReport> for ImportApiResponse {
    fn from(report: ImportReport) -> Self {
        Self {
            message: "CSV processing completed".to_string(),
            success_count: report.success_count,
            error_count: report.error_count,
            duplicate_count: report.duplicate_count,
            duplicates_file_url: report
                .rejected_file
                .map(|name| format!("{}{}", DOWNLOAD_ROUTE_PREFIX, name)),
            errors: report.errors,
            batch_id: report.batch_id,
        }
    }
}

// ==========================================
// ImportApi - 批量导入 API
// ==========================================
pub struct ImportApi {
    importer: Arc<dyn ParcelImporter>,
    exporter: CsvRejectedExporter,
    config: Arc<dyn ImportConfigReader>,
}

impl ImportApi {
    pub fn new(
        importer: Arc<dyn ParcelImporter>,
        exporter: CsvRejectedExporter,
        config: Arc<dyn ImportConfigReader>,
    ) -> Self {
        Self {
            importer,
            exporter,
            config,
        }
    }

    /// 上传并导入包裹文件
    ///
    /// # 参数
    /// - file_name: 原始文件名（决定解析格式）
    /// - content: 文件内容
    ///
    /// # 返回
    /// - Ok: 行级结果汇总（部分失败也返回 Ok）
    /// - Err(InvalidInput): 未上传文件
    /// - Err(ImportError): 文件格式/解析失败，未写入任何行
    pub async fn upload_parcels(
        &self,
        file_name: Option<&str>,
        content: &[u8],
    ) -> ApiResult<ImportApiResponse> {
        let file_name = file_name.map(str::trim).filter(|n| !n.is_empty());
        let file_name = match file_name {
            Some(name) if !content.is_empty() => name,
            _ => return Err(ApiError::InvalidInput("No file uploaded".to_string())),
        };

        let report = self.importer.import_upload(file_name, content).await?;
        info!(
            batch_id = %report.batch_id,
            success = report.success_count,
            errors = report.error_count,
            duplicates = report.duplicate_count,
            "导入请求完成"
        );
        Ok(report.into())
    }

    /// 下载拒绝文件，并安排延迟删除
    ///
    /// # 返回
    /// - Err(InvalidInput): 文件名不符合导出命名规则
    /// - Err(NotFound): 文件不存在或已被清理
    pub async fn download_duplicates(&self, file_name: &str) -> ApiResult<Vec<u8>> {
        let bytes = self.exporter.read_export(file_name)?;

        let delay_secs = match self.config.get_export_cleanup_delay_secs().await {
            Ok(secs) => secs,
            Err(e) => {
                warn!(error = %e, "读取清理延迟失败，使用默认值");
                DEFAULT_EXPORT_CLEANUP_DELAY_SECS
            }
        };
        self.exporter
            .schedule_cleanup(file_name, Duration::from_secs(delay_secs));

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_from_report() {
        let report = ImportReport {
            batch_id: "b-1".to_string(),
            total_rows: 4,
            success_count: 2,
            error_count: 1,
            duplicate_count: 1,
            rejected_file: Some("duplicates_1718000000000.csv".to_string()),
            errors: vec!["Row 3: Address is required".to_string()],
        };

        let response = ImportApiResponse::from(report);
        assert_eq!(
            response.duplicates_file_url.as_deref(),
            Some("/download-duplicates/duplicates_1718000000000.csv")
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["successCount"], 2);
        assert_eq!(json["duplicateCount"], 1);
        assert_eq!(json["batchId"], "b-1");
        assert!(json.get("success_count").is_none());
    }

    #[test]
    fn test_response_without_rejected_file() {
        let report = ImportReport {
            batch_id: "b-2".to_string(),
            total_rows: 1,
            success_count: 1,
            error_count: 0,
            duplicate_count: 0,
            rejected_file: None,
            errors: Vec::new(),
        };

        let json = serde_json::to_value(ImportApiResponse::from(report)).unwrap();
        assert!(json["duplicatesFileUrl"].is_null());
    }
}
