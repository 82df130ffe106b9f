// ==========================================
// 包裹派送管理后台 - 文件解析器实现
// ==========================================
// 阶段: 文件读取与解析
// 支持: CSV (.csv) / Excel (.xlsx)
// 输入: 上传的原始字节（不落盘）
// 行号: 数据行逐条保留（含全空行），下游按位置编号
// 单元格: 原值不做 trim，拒绝文件据此回写
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::parcel_importer_trait::FileParser;
use calamine::{Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// 文件扩展名（小写）
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(
        &self,
        _file_name: &str,
        content: &[u8],
    ) -> ImportResult<Vec<HashMap<String, String>>> {
        // 去掉 UTF-8 BOM（Excel 另存为 CSV 时常见）
        let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(content);

        // 读取表头（列名忽略大小写）
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        // 读取所有行
        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.to_string());
                }
            }

            // 全空行同样保留，由校验环节拒绝
            records.push(row_map);
        }

        Ok(records)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(
        &self,
        _file_name: &str,
        content: &[u8],
    ) -> ImportResult<Vec<HashMap<String, String>>> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(content.to_vec()))
            .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("workbook has no sheets".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // 提取表头（第一行）；空表视为无数据行
        let mut rows = range.rows();
        let header_row = match rows.next() {
            Some(row) => row,
            None => return Ok(Vec::new()),
        };

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_lowercase())
            .collect();

        // 读取数据行
        let mut records = Vec::new();
        for data_row in rows {
            let mut row_map = HashMap::new();

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), cell.to_string());
                }
            }

            records.push(row_map);
        }

        Ok(records)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_records(
        &self,
        file_name: &str,
        content: &[u8],
    ) -> ImportResult<Vec<HashMap<String, String>>> {
        match extension_of(file_name).as_str() {
            "csv" => CsvParser.parse_to_raw_records(file_name, content),
            "xlsx" => ExcelParser.parse_to_raw_records(file_name, content),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}
