//! 批量解压服务 - 业务能力层
//!
//! 只负责"把一个 CT-e 压缩包拆成取消键和已授权记录"，单个条目失败不影响其他条目

use crate::error::DocumentError;
use crate::models::DocumentRecord;
use crate::services::document_classifier::{Classification, DocumentClassifier};
use std::io::{Cursor, Read};
use tracing::{debug, warn};
use zip::ZipArchive;

/// 处理失败的 XML 条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub entry: String,
    pub reason: String,
}

/// 一个压缩包的处理结果
#[derive(Debug, Default, Clone)]
pub struct BatchReport {
    /// 取消事件引用的 CT-e 键（按出现顺序，可能重复）
    pub cancellation_keys: Vec<String>,
    /// 已授权记录，已带上 Empresa / CNPJ
    pub documents: Vec<DocumentRecord>,
    /// 失败的条目
    pub failures: Vec<EntryFailure>,
    /// 处理过的 XML 条目数
    pub xml_entries: usize,
}

/// 批量解压服务
pub struct BatchExtractor {
    classifier: DocumentClassifier,
}

impl BatchExtractor {
    pub fn new() -> Self {
        Self {
            classifier: DocumentClassifier::new(),
        }
    }

    /// 解析 CT-e 压缩包
    ///
    /// # 参数
    /// - `zip_bytes`: 压缩包原始内容
    /// - `empresa` / `cnpj`: 当前企业，用于标记记录
    ///
    /// # 返回
    /// 压缩包本身无法打开时返回错误；条目级别的失败记录在 `BatchReport::failures`
    pub fn extract(
        &self,
        zip_bytes: &[u8],
        empresa: &str,
        cnpj: &str,
    ) -> Result<BatchReport, DocumentError> {
        let mut archive = ZipArchive::new(Cursor::new(zip_bytes))
            .map_err(|source| DocumentError::ZipOpenFailed { source })?;

        let mut report = BatchReport::default();

        for index in 0..archive.len() {
            let (name, content) = match read_entry(&mut archive, index) {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(e) => {
                    warn!("⚠️ {}", e);
                    report.failures.push(failure_of(&e));
                    continue;
                }
            };

            report.xml_entries += 1;

            match self.classifier.classify(&name, &content) {
                Ok(Classification::Cancellation { chave: Some(chave) }) => {
                    debug!("取消事件: {} -> {}", name, chave);
                    report.cancellation_keys.push(chave);
                }
                Ok(Classification::Cancellation { chave: None }) => {
                    debug!("取消事件缺少 chCTe: {}", name);
                }
                Ok(Classification::Authorized(fields)) => {
                    report
                        .documents
                        .push(DocumentRecord::from_fields(empresa, cnpj, fields));
                }
                Err(e) => {
                    warn!("⚠️ 处理 XML 出错: {}", e);
                    report.failures.push(EntryFailure {
                        entry: name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}

impl Default for BatchExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// 读取一个条目；不是 .xml 的条目返回 None
fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    index: usize,
) -> Result<Option<(String, Vec<u8>)>, DocumentError> {
    let mut file = archive
        .by_index(index)
        .map_err(|e| DocumentError::ZipEntryFailed {
            entry: format!("#{}", index),
            reason: e.to_string(),
        })?;

    let name = file.name().to_string();
    if !name.to_lowercase().ends_with(".xml") {
        return Ok(None);
    }

    let mut content = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut content)
        .map_err(|e| DocumentError::ZipEntryFailed {
            entry: name.clone(),
            reason: e.to_string(),
        })?;

    Ok(Some((name, content)))
}

fn failure_of(err: &DocumentError) -> EntryFailure {
    let entry = match err {
        DocumentError::ZipEntryFailed { entry, .. }
        | DocumentError::InvalidUtf8 { entry, .. }
        | DocumentError::XmlParseFailed { entry, .. } => entry.clone(),
        DocumentError::ZipOpenFailed { .. } => String::new(),
    };
    EntryFailure {
        entry,
        reason: err.to_string(),
    }
}
