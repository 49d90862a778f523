use crate::error::{AppResult, FileError};
use crate::models::company::CompanyCredential;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// 输入表格必须包含的列
pub const REQUIRED_COLUMNS: [&str; 4] = ["Empresa", "CNPJ", "Usuario", "Senha"];

/// 读取企业列表表格（第一个工作表，第一行为表头）
///
/// 列的顺序不限，多余的列会被忽略；整行为空的行会被跳过。
pub fn load_company_rows(path: &Path) -> AppResult<Vec<CompanyCredential>> {
    let path_str = path.display().to_string();

    let mut workbook =
        open_workbook_auto(path).map_err(|e| FileError::SpreadsheetOpenFailed {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FileError::EmptyWorkbook {
            path: path_str.clone(),
        })?
        .map_err(|e| FileError::SpreadsheetOpenFailed {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(|c| cell_to_string(c).trim().to_string()).collect())
        .unwrap_or_default();

    let mut indices = [0usize; 4];
    for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = header
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| FileError::MissingColumn {
                path: path_str.clone(),
                column: column.to_string(),
            })?;
    }
    let [empresa, cnpj, usuario, senha] = indices;

    let mut companies = Vec::new();
    for (row_number, cells) in rows.enumerate() {
        let cell = |idx: usize| cells.get(idx).map(cell_to_string).unwrap_or_default();

        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            tracing::debug!("跳过空行: 第 {} 行", row_number + 2);
            continue;
        }

        companies.push(CompanyCredential::new(
            cell(empresa),
            cell(cnpj),
            cell(usuario),
            cell(senha),
        ));
    }

    tracing::info!("成功加载 {} 个企业: {}", companies.len(), path_str);
    Ok(companies)
}

/// 单元格转字符串；CNPJ 常被存成数字，整数值的浮点数不带小数部分
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
