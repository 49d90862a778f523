use crate::error::ConfigError;
use chrono::NaiveDate;

/// 表格中的一行：企业登录凭据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyCredential {
    pub empresa: String,
    pub cnpj: String,
    pub usuario: String,
    pub senha: String,
}

impl CompanyCredential {
    pub fn new(
        empresa: impl Into<String>,
        cnpj: impl Into<String>,
        usuario: impl Into<String>,
        senha: impl Into<String>,
    ) -> Self {
        Self {
            empresa: empresa.into(),
            cnpj: cnpj.into(),
            usuario: usuario.into(),
            senha: senha.into(),
        }
    }
}

/// 闭区间日期范围，保证 start <= end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// 门户查询参数格式 dd/mm/yyyy
    pub fn start_param(&self) -> String {
        self.start.format("%d/%m/%Y").to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format("%d/%m/%Y").to_string()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ~ {}", self.start_param(), self.end_param())
    }
}
