use crate::error::ConfigError;
use crate::models::DateRange;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 门户根地址
    pub portal_base_url: String,
    /// 登录成功后门户写入的认证 Cookie 名称
    pub auth_cookie_name: String,
    /// 模拟浏览器的 User-Agent
    pub user_agent: String,
    /// 企业列表表格（Empresa, CNPJ, Usuario, Senha）
    pub input_spreadsheet: String,
    /// 压缩包和汇总表的输出目录
    pub output_dir: String,
    /// 开始日期
    pub date_start: String,
    /// 结束日期
    pub date_end: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal_base_url: "https://brf.multitransportador.com.br".to_string(),
            auth_cookie_name: "SGT.WebAdmin.Auth".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            input_spreadsheet: "empresas.xlsx".to_string(),
            output_dir: "downloads".to_string(),
            date_start: "2026-01-01".to_string(),
            date_end: "2026-01-31".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：TOML 文件（若存在）+ 环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        let base = if Path::new(&path).exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件读取配置，缺失的字段使用默认值
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
                path: path.to_string(),
                source,
            })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            portal_base_url: std::env::var("PORTAL_BASE_URL").unwrap_or(self.portal_base_url),
            auth_cookie_name: std::env::var("AUTH_COOKIE_NAME").unwrap_or(self.auth_cookie_name),
            user_agent: std::env::var("USER_AGENT").unwrap_or(self.user_agent),
            input_spreadsheet: std::env::var("INPUT_SPREADSHEET").unwrap_or(self.input_spreadsheet),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
            date_start: std::env::var("DATA_INICIAL").unwrap_or(self.date_start),
            date_end: std::env::var("DATA_FINAL").unwrap_or(self.date_end),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
    }

    /// 解析配置中的日期区间
    pub fn date_range(&self) -> Result<DateRange, ConfigError> {
        let start = parse_date("DATA_INICIAL", &self.date_start)?;
        let end = parse_date("DATA_FINAL", &self.date_end)?;
        DateRange::new(start, end)
    }
}

/// 支持 yyyy-mm-dd 和 dd/mm/yyyy 两种写法
fn parse_date(var_name: &str, value: &str) -> Result<NaiveDate, ConfigError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .map_err(|_| ConfigError::InvalidDate {
            var_name: var_name.to_string(),
            value: value.to_string(),
        })
}
