//! 单次运行的汇总状态 - 编排层
//!
//! 由批量处理器独占持有，按行累积各企业的结果；所有行处理完后统一对账一次

use crate::models::{DocumentKind, DocumentRecord, OperationResult, OperationStatus, STATUS_CANCELADO};
use crate::services::{BatchReport, EntryFailure};
use std::collections::{BTreeMap, HashSet};

/// 对账结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// 没有任何 CT-e 记录（提示信息，不是错误）
    Empty,
    /// 已对账
    Reconciled { documents: usize, cancelled: usize },
}

/// 单次运行的汇总状态
///
/// 取消键集合是整次运行共享的，不按企业隔离：
/// 后处理的企业中的取消事件可以命中先处理企业的记录
#[derive(Debug, Default)]
pub struct RunContext {
    documents: Vec<DocumentRecord>,
    cancellation_keys: HashSet<String>,
    results: Vec<OperationResult>,
    cte_archives: BTreeMap<String, Option<Vec<u8>>>,
    mdfe_archives: BTreeMap<String, Option<Vec<u8>>>,
    entry_failures: Vec<EntryFailure>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 清空所有集合，开始新一轮运行
    pub fn clear(&mut self) {
        self.documents.clear();
        self.cancellation_keys.clear();
        self.results.clear();
        self.cte_archives.clear();
        self.mdfe_archives.clear();
        self.entry_failures.clear();
    }

    /// 合并一个压缩包的处理结果（不去重）
    pub fn absorb(&mut self, report: BatchReport) {
        self.cancellation_keys.extend(report.cancellation_keys);
        self.documents.extend(report.documents);
        self.entry_failures.extend(report.failures);
    }

    /// 记录一个企业的最终状态
    pub fn record_result(&mut self, result: OperationResult) {
        self.results.push(result);
    }

    /// 记录某企业某类压缩包，None 表示下载无效；同一 CNPJ 后写覆盖先写
    pub fn store_archive(&mut self, kind: DocumentKind, cnpj: &str, bytes: Option<Vec<u8>>) {
        let archives = match kind {
            DocumentKind::Cte => &mut self.cte_archives,
            DocumentKind::Mdfe => &mut self.mdfe_archives,
        };
        archives.insert(cnpj.to_string(), bytes);
    }

    /// 用全局取消键集合对账，命中的记录状态改为 "Cancelado"
    pub fn reconcile(&mut self) -> ReconcileOutcome {
        if self.documents.is_empty() {
            return ReconcileOutcome::Empty;
        }

        let keys = &self.cancellation_keys;
        for document in self.documents.iter_mut().filter(|d| keys.contains(&d.chave)) {
            document.status = STATUS_CANCELADO.to_string();
        }

        ReconcileOutcome::Reconciled {
            documents: self.documents.len(),
            cancelled: self.documents.iter().filter(|d| d.is_cancelled()).count(),
        }
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn results(&self) -> &[OperationResult] {
        &self.results
    }

    pub fn entry_failures(&self) -> &[EntryFailure] {
        &self.entry_failures
    }

    /// 某类压缩包：CNPJ -> 内容（None 表示下载无效）
    pub fn archives(&self, kind: DocumentKind) -> &BTreeMap<String, Option<Vec<u8>>> {
        match kind {
            DocumentKind::Cte => &self.cte_archives,
            DocumentKind::Mdfe => &self.mdfe_archives,
        }
    }

    /// 某状态的企业数量
    pub fn count_status(&self, status: OperationStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}
