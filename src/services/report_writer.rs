//! 结果写入服务 - 业务能力层
//!
//! 只负责"把结果落盘"：压缩包、CT-e 汇总表、操作结果表

use crate::error::{AppError, AppResult};
use crate::models::{DocumentKind, DocumentRecord, OperationResult, SUMMARY_HEADERS};
use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// 汇总表文件名
pub const SUMMARY_FILE_NAME: &str = "Resumo_CTes.xlsx";
/// 汇总表工作表名
pub const SUMMARY_SHEET_NAME: &str = "Resumo_CTes";
/// 操作结果表文件名
pub const OPERATIONS_FILE_NAME: &str = "Resumo_Operacoes.xlsx";

/// 结果写入服务
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 确保输出目录存在
    pub fn prepare(&self) -> AppResult<()> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| AppError::write_failed(self.output_dir.display().to_string(), e))
    }

    /// 写入一个企业的压缩包，文件名如 CTe_{CNPJ}.zip
    pub fn write_archive(&self, kind: DocumentKind, cnpj: &str, bytes: &[u8]) -> AppResult<PathBuf> {
        let path = self.output_dir.join(kind.file_name(cnpj));
        fs::write(&path, bytes).map_err(|e| AppError::write_failed(path.display().to_string(), e))?;
        debug!("已写入 {} 压缩包: {}", kind, path.display());
        Ok(path)
    }

    /// 写入 CT-e 汇总表
    pub fn write_summary(&self, documents: &[DocumentRecord]) -> AppResult<PathBuf> {
        let bytes = summary_workbook(documents)?;
        let path = self.output_dir.join(SUMMARY_FILE_NAME);
        fs::write(&path, bytes).map_err(|e| AppError::write_failed(path.display().to_string(), e))?;
        info!("✅ 汇总表已生成: {} ({} 条)", path.display(), documents.len());
        Ok(path)
    }

    /// 写入操作结果表
    pub fn write_operations(&self, results: &[OperationResult]) -> AppResult<PathBuf> {
        let bytes = operations_workbook(results)?;
        let path = self.output_dir.join(OPERATIONS_FILE_NAME);
        fs::write(&path, bytes).map_err(|e| AppError::write_failed(path.display().to_string(), e))?;
        info!("📊 操作结果表已生成: {}", path.display());
        Ok(path)
    }
}

/// 生成 CT-e 汇总表（xlsx 字节）
pub fn summary_workbook(documents: &[DocumentRecord]) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SUMMARY_SHEET_NAME)?;

    for (col, title) in SUMMARY_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }
    for (row, document) in documents.iter().enumerate() {
        for (col, value) in document.summary_row().iter().enumerate() {
            sheet.write_string(row as u32 + 1, col as u16, *value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// 生成操作结果表（xlsx 字节）
pub fn operations_workbook(results: &[OperationResult]) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Resumo_Operacoes")?;

    for (col, title) in OperationResult::HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }
    for (row, result) in results.iter().enumerate() {
        let row = row as u32 + 1;
        sheet.write_string(row, 0, &result.empresa)?;
        sheet.write_string(row, 1, &result.cnpj)?;
        sheet.write_string(row, 2, result.status.as_str())?;
    }

    Ok(workbook.save_to_buffer()?)
}
