use super::company::CompanyCredential;
use std::fmt;

/// 单个企业处理结束时的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    /// 登录页无法访问
    AccessError,
    /// 登录后没有拿到认证 Cookie
    LoginFailed,
    /// 登录成功并已尝试下载（不代表两个压缩包都成功）
    DownloadOk,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::AccessError => "Erro acesso",
            OperationStatus::LoginFailed => "Login falhou",
            OperationStatus::DownloadOk => "✅ Download OK",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 操作结果表中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub empresa: String,
    pub cnpj: String,
    pub status: OperationStatus,
}

impl OperationResult {
    pub const HEADERS: [&'static str; 3] = ["Empresa", "CNPJ", "Status"];

    pub fn new(credential: &CompanyCredential, status: OperationStatus) -> Self {
        Self {
            empresa: credential.empresa.clone(),
            cnpj: credential.cnpj.clone(),
            status,
        }
    }
}
