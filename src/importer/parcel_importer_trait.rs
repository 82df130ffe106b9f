// ==========================================
// 包裹派送管理后台 - 包裹导入 Trait
// ==========================================
// 职责: 定义包裹批量导入各阶段接口（不包含实现）
// 导入流程: 解析 → 字段映射 → 分类（校验 + 去重）→ 并发落库 → 导出拒绝行
// ==========================================

use crate::domain::import::{ImportClassification, ImportReport, RawParcelRow, RejectedRow};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

// ==========================================
// ParcelImporter Trait
// ==========================================
// 用途: 包裹导入主接口
// 实现者: ParcelImporterImpl
#[async_trait]
pub trait ParcelImporter: Send + Sync {
    /// 导入一份上传文件
    ///
    /// # 参数
    /// - file_name: 上传文件名（用于按扩展名选择解析器）
    /// - content: 文件内容
    ///
    /// # 返回
    /// - Ok(ImportReport): 逐行结果汇总（行级错误不会使整批失败）
    /// - Err: 文件无法解析 / 存储不可用（整批未写入）
    async fn import_upload(&self, file_name: &str, content: &[u8]) -> ImportResult<ImportReport>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件内容 → 表头键值行
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析为原始记录（表头 → 单元格原文；每个数据行一条，含全空行）
    fn parse_to_raw_records(
        &self,
        file_name: &str,
        content: &[u8],
    ) -> ImportResult<Vec<HashMap<String, String>>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 表头键值行 → RawParcelRow（处理列名别名）
pub trait FieldMapper: Send + Sync {
    /// # 参数
    /// - row: 原始记录
    /// - row_number: 数据行号（1 起）
    fn map_to_raw_parcel(&self, row: &HashMap<String, String>, row_number: usize) -> RawParcelRow;
}

// ==========================================
// DuplicateClassifier Trait
// ==========================================
// 用途: 校验 + 两阶段去重（纯函数，不访问存储）
// 实现者: PhoneDuplicateClassifier
pub trait DuplicateClassifier: Send + Sync {
    /// # 参数
    /// - existing_phones: 库中已有的规范化手机号
    /// - rows: 按行号升序的原始行
    ///
    /// # 返回
    /// - 接受 / 拒绝两个互斥列表，合并后覆盖全部输入行
    fn classify(&self, existing_phones: &HashSet<String>, rows: &[RawParcelRow])
        -> ImportClassification;
}

// ==========================================
// RejectedRecordsExporter Trait
// ==========================================
// 用途: 拒绝行 → 可下载文件
// 实现者: CsvRejectedExporter
pub trait RejectedRecordsExporter: Send + Sync {
    /// # 返回
    /// - Ok(String): 生成的文件名（不含目录）
    /// - Err: 写文件失败（调用方按警告处理）
    fn export(&self, rows: &[RejectedRow]) -> ImportResult<String>;
}
