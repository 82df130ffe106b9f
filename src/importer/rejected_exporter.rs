// ==========================================
// 包裹派送管理后台 - 拒绝行导出
// ==========================================
// 输出: {export_dir}/duplicates_{毫秒时间戳}.csv
// 列: row_number, customer_name, phone_number, weight, pin_code,
//     address, latitude, longitude, status, duplicate_reason
// 生命周期: 下载后延迟删除，再次下载返回不存在
// ==========================================

use crate::domain::import::RejectedRow;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::parcel_importer_trait::RejectedRecordsExporter;
use chrono::Utc;
use regex::Regex;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

/// 导出文件列
pub const EXPORT_HEADERS: [&str; 10] = [
    "row_number",
    "customer_name",
    "phone_number",
    "weight",
    "pin_code",
    "address",
    "latitude",
    "longitude",
    "status",
    "duplicate_reason",
];

/// 同一毫秒内的重名重试上限
const MAX_NAME_ATTEMPTS: i64 = 1_000;

fn export_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^duplicates_\d+\.csv$").expect("valid export name regex"))
}

/// 文件名是否符合导出命名规则（在任何文件系统访问之前校验）
pub fn is_valid_export_name(file_name: &str) -> bool {
    export_name_regex().is_match(file_name)
}

// ==========================================
// CsvRejectedExporter - CSV 导出实现
// ==========================================
#[derive(Debug, Clone)]
pub struct CsvRejectedExporter {
    export_dir: PathBuf,
}

impl CsvRejectedExporter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// 校验文件名并返回完整路径
    fn resolve(&self, file_name: &str) -> ImportResult<PathBuf> {
        if !is_valid_export_name(file_name) {
            return Err(ImportError::InvalidFileName(file_name.to_string()));
        }
        Ok(self.export_dir.join(file_name))
    }

    /// 读取导出文件（供下载）
    ///
    /// # 返回
    /// - Err(InvalidFileName): 文件名不符合规则（未访问文件系统）
    /// - Err(ExportNotFound): 文件不存在（已被清理或从未生成）
    pub fn read_export(&self, file_name: &str) -> ImportResult<Vec<u8>> {
        let path = self.resolve(file_name)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ImportError::ExportNotFound(file_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 下载后延迟删除（后台任务，失败只记日志）
    pub fn schedule_cleanup(&self, file_name: &str, delay: Duration) {
        let path = match self.resolve(file_name) {
            Ok(p) => p,
            Err(_) => return,
        };
        let name = file_name.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(file = %name, "拒绝文件已清理"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(file = %name, error = %e, "拒绝文件清理失败"),
            }
        });
    }

    /// 创建新文件（毫秒时间戳命名，重名时顺延）
    fn create_unique_file(&self) -> ImportResult<(String, std::fs::File)> {
        let base = Utc::now().timestamp_millis();
        for offset in 0..MAX_NAME_ATTEMPTS {
            let name = format!("duplicates_{}.csv", base + offset);
            let path = self.export_dir.join(&name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((name, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(ImportError::ExportError(e.to_string())),
            }
        }
        Err(ImportError::ExportError(
            "could not allocate a unique file name".to_string(),
        ))
    }
}

impl RejectedRecordsExporter for CsvRejectedExporter {
    fn export(&self, rows: &[RejectedRow]) -> ImportResult<String> {
        std::fs::create_dir_all(&self.export_dir)
            .map_err(|e| ImportError::ExportError(e.to_string()))?;

        let (name, file) = self.create_unique_file()?;
        let mut writer = csv::Writer::from_writer(file);

        let write_all = |writer: &mut csv::Writer<std::fs::File>| -> csv::Result<()> {
            writer.write_record(EXPORT_HEADERS)?;
            for rejected in rows {
                let raw = &rejected.row;
                let field = |v: &Option<String>| v.clone().unwrap_or_default();
                writer.write_record([
                    rejected.row_number().to_string(),
                    field(&raw.customer_name),
                    field(&raw.phone_number),
                    field(&raw.weight),
                    field(&raw.pin_code),
                    field(&raw.address),
                    field(&raw.latitude),
                    field(&raw.longitude),
                    field(&raw.status),
                    rejected.reason(),
                ])?;
            }
            writer.flush()?;
            Ok(())
        };

        if let Err(e) = write_all(&mut writer) {
            // 半成品文件不保留
            let _ = std::fs::remove_file(self.export_dir.join(&name));
            return Err(ImportError::ExportError(e.to_string()));
        }

        debug!(file = %name, rows = rows.len(), "拒绝文件已生成");
        Ok(name)
    }
}
