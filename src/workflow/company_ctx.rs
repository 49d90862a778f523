//! 企业处理上下文
//!
//! 封装"我正在处理表格第几行的哪家企业"这一信息

use crate::models::CompanyCredential;
use std::fmt::Display;

/// 企业处理上下文
#[derive(Debug, Clone)]
pub struct CompanyCtx {
    /// 行号（从1开始，仅用于日志显示）
    pub row_index: usize,

    /// 企业名称
    pub empresa: String,

    /// 企业 CNPJ
    pub cnpj: String,
}

impl CompanyCtx {
    pub fn new(row_index: usize, credential: &CompanyCredential) -> Self {
        Self {
            row_index,
            empresa: credential.empresa.clone(),
            cnpj: credential.cnpj.clone(),
        }
    }
}

impl Display for CompanyCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[企业 #{} {} CNPJ#{}]", self.row_index, self.empresa, self.cnpj)
    }
}
