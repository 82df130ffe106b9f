// ==========================================
// 包裹派送管理后台 - 包裹批量导入器实现
// ==========================================
// 职责: 整合导入流程，从上传文件到数据库
// 流程: 解析 → 映射 → 加载已有手机号 → 分类 → 并发落库 → 导出拒绝行 → 汇总
// 失败语义:
// - 解析失败 / 存储不可用: 整批失败，不写入任何行
// - 单行写库失败: 只影响该行，成功数逐行统计
// - 导出失败: 仅警告
// ==========================================

use crate::config::ImportConfigReader;
use crate::config::config_manager::DEFAULT_MAX_REPORTED_ERRORS;
use crate::domain::import::{ImportReport, RawParcelRow, RejectedRow, RejectionKind};
use crate::importer::error::ImportResult;
use crate::importer::parcel_importer_trait::{
    DuplicateClassifier, FieldMapper, FileParser, ParcelImporter, RejectedRecordsExporter,
};
use crate::repository::{ParcelImportRepository, RepositoryError};
use futures::future::join_all;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 写库冲突判定所依据的唯一列
const PARCEL_PHONE_COLUMN: &str = "parcels.phone_number";

/// 导出失败时附加到错误列表的提示
pub const EXPORT_FAILED_WARNING: &str = "Warning: failed to create rejected records file";

// ==========================================
// ParcelImporterImpl - 包裹导入器实现
// ==========================================
pub struct ParcelImporterImpl<R, C>
where
    R: ParcelImportRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    import_repo: R,

    // 配置读取器
    config: C,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    classifier: Box<dyn DuplicateClassifier>,
    exporter: Box<dyn RejectedRecordsExporter>,
}

impl<R, C> ParcelImporterImpl<R, C>
where
    R: ParcelImportRepository,
    C: ImportConfigReader,
{
    /// 创建新的 ParcelImporter 实例
    ///
    /// # 参数
    /// - import_repo: 导入数据仓储
    /// - config: 配置读取器
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段映射器
    /// - classifier: 重复检测器
    /// - exporter: 拒绝行导出器
    pub fn new(
        import_repo: R,
        config: C,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        classifier: Box<dyn DuplicateClassifier>,
        exporter: Box<dyn RejectedRecordsExporter>,
    ) -> Self {
        Self {
            import_repo,
            config,
            file_parser,
            field_mapper,
            classifier,
            exporter,
        }
    }

    /// 读取错误条数上限（读取失败时回退默认值）
    async fn max_reported_errors(&self) -> usize {
        match self.config.get_max_reported_errors().await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "读取错误条数上限失败，使用默认值");
                DEFAULT_MAX_REPORTED_ERRORS
            }
        }
    }
}

#[async_trait::async_trait]
impl<R, C> ParcelImporter for ParcelImporterImpl<R, C>
where
    R: ParcelImportRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, file_name, content), fields(batch_id, file_name = %file_name))]
    async fn import_upload(&self, file_name: &str, content: &[u8]) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        info!(bytes = content.len(), "开始导入包裹数据");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let raw_records = self
            .file_parser
            .parse_to_raw_records(file_name, content)
            .map_err(|e| {
                error!(error = %e, "文件解析失败");
                e
            })?;

        // === 步骤 2: 字段映射 ===
        debug!("步骤 2: 字段映射");
        let rows: Vec<RawParcelRow> = raw_records
            .iter()
            .enumerate()
            .map(|(idx, record)| self.field_mapper.map_to_raw_parcel(record, idx + 1))
            .collect();
        info!(total_rows = rows.len(), "文件解析完成");

        // === 步骤 3: 加载已有手机号 ===
        debug!("步骤 3: 加载已有手机号");
        let existing_phones = self.import_repo.load_existing_phones().await.map_err(|e| {
            error!(error = %e, "加载已有手机号失败");
            e
        })?;

        // === 步骤 4: 分类（校验 + 去重）===
        debug!("步骤 4: 分类");
        let classification = self.classifier.classify(&existing_phones, &rows);
        info!(
            accepted = classification.accepted.len(),
            invalid = classification.invalid_count(),
            duplicates = classification.duplicate_count(),
            "分类完成"
        );

        let mut error_count = classification.invalid_count();
        let mut duplicate_count = classification.duplicate_count();
        let mut errors: Vec<String> = classification
            .rejected
            .iter()
            .filter(|r| !r.kind.is_duplicate())
            .map(RejectedRow::error_line)
            .collect();
        let mut rejected = classification.rejected;

        // === 步骤 5: 并发落库（逐行独立）===
        debug!(count = classification.accepted.len(), "步骤 5: 并发落库");
        let outcomes = join_all(
            classification
                .accepted
                .iter()
                .map(|a| self.import_repo.insert_parcel(a.parcel.clone())),
        )
        .await;

        let mut success_count = 0;
        for (accepted, outcome) in classification.accepted.into_iter().zip(outcomes) {
            match outcome {
                Ok(_) => success_count += 1,
                Err(e) if e.is_unique_violation_on(PARCEL_PHONE_COLUMN) => {
                    warn!(row_number = accepted.row.row_number, "写库时手机号冲突");
                    let row = RejectedRow {
                        row: accepted.row,
                        kind: RejectionKind::ConflictOnWrite,
                    };
                    errors.push(row.error_line());
                    rejected.push(row);
                    duplicate_count += 1;
                }
                Err(e) => {
                    error!(row_number = accepted.row.row_number, error = %e, "写库失败");
                    errors.push(persist_failure_line(accepted.row.row_number, &e));
                    error_count += 1;
                }
            }
        }
        info!(success_count, "落库完成");

        // === 步骤 6: 导出拒绝行 ===
        let mut rejected_file = None;
        let mut export_warning = None;
        if !rejected.is_empty() {
            debug!(count = rejected.len(), "步骤 6: 导出拒绝行");
            rejected.sort_by_key(RejectedRow::row_number);
            match self.exporter.export(&rejected) {
                Ok(name) => {
                    info!(file = %name, "拒绝文件已生成");
                    rejected_file = Some(name);
                }
                Err(e) => {
                    warn!(error = %e, "拒绝文件生成失败");
                    export_warning = Some(EXPORT_FAILED_WARNING.to_string());
                }
            }
        }

        // === 步骤 7: 汇总（导出警告不受条数截断影响）===
        let max_errors = self.max_reported_errors().await;
        errors.truncate(max_errors);
        errors.extend(export_warning);

        info!(
            total_rows = rows.len(),
            success_count,
            error_count,
            duplicate_count,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "导入完成"
        );

        Ok(ImportReport {
            batch_id,
            total_rows: rows.len(),
            success_count,
            error_count,
            duplicate_count,
            rejected_file,
            errors,
        })
    }
}

/// 非约束类写库失败的错误行
fn persist_failure_line(row_number: usize, err: &RepositoryError) -> String {
    format!("Row {}: Failed to save parcel ({})", row_number, err)
}
