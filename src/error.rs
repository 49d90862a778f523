use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 门户访问错误
    #[error("门户错误: {0}")]
    Portal(#[from] PortalError),
    /// 文档解析错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 门户（HTTP 会话）相关错误
#[derive(Debug, Error)]
pub enum PortalError {
    /// 创建 HTTP 客户端失败
    #[error("创建 HTTP 会话失败: {source}")]
    ClientBuildFailed {
        #[source]
        source: reqwest::Error,
    },
    /// 门户地址无效
    #[error("无效的门户地址 {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// 请求头无效
    #[error("无效的请求头 {name}: {value}")]
    InvalidHeader { name: String, value: String },
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

/// XML / ZIP 文档错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 文件内容不是合法的 UTF-8
    #[error("XML 不是合法的 UTF-8 ({entry}): {source}")]
    InvalidUtf8 {
        entry: String,
        #[source]
        source: std::str::Utf8Error,
    },
    /// XML 解析失败
    #[error("XML 解析失败 ({entry}): {source}")]
    XmlParseFailed {
        entry: String,
        #[source]
        source: roxmltree::Error,
    },
    /// 无法打开 ZIP 压缩包
    #[error("无法打开 ZIP 压缩包: {source}")]
    ZipOpenFailed {
        #[source]
        source: zip::result::ZipError,
    },
    /// 读取压缩包条目失败
    #[error("读取压缩包条目失败 ({entry}): {reason}")]
    ZipEntryFailed { entry: String, reason: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 打开表格失败
    #[error("无法打开表格 ({path}): {reason}")]
    SpreadsheetOpenFailed { path: String, reason: String },
    /// 表格中没有工作表
    #[error("表格中没有工作表: {path}")]
    EmptyWorkbook { path: String },
    /// 缺少必需的列
    #[error("表格缺少必需的列 '{column}': {path}")]
    MissingColumn { path: String, column: String },
    /// 生成 xlsx 失败
    #[error("生成 xlsx 失败: {source}")]
    XlsxWriteFailed {
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 日期解析失败
    #[error("配置项 {var_name} 解析失败: 值 '{value}' 不是合法日期 (yyyy-mm-dd 或 dd/mm/yyyy)")]
    InvalidDate { var_name: String, value: String },
    /// 日期区间无效
    #[error("日期区间无效: 开始日期 {start} 晚于结束日期 {end}")]
    InvalidDateRange { start: String, end: String },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::File(FileError::XlsxWriteFailed { source: err })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Portal(PortalError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
