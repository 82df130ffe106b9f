// ==========================================
// 包裹派送管理后台 - 导入层
// ==========================================
// 职责: 上传文件 → 校验 → 去重 → 落库 → 拒绝行导出
// 支持: CSV, Excel (.xlsx)
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod duplicate_classifier;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod parcel_importer_impl;
pub mod parcel_importer_trait;
pub mod record_validator;
pub mod rejected_exporter;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use duplicate_classifier::PhoneDuplicateClassifier;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use parcel_importer_impl::ParcelImporterImpl;
pub use record_validator::RecordValidator;
pub use rejected_exporter::{is_valid_export_name, CsvRejectedExporter, EXPORT_HEADERS};

// 重导出 Trait 接口
pub use parcel_importer_trait::{
    DuplicateClassifier, FieldMapper, FileParser, ParcelImporter, RejectedRecordsExporter,
};
