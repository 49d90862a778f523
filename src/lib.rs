//! # CT-e Batch Download
//!
//! 按企业表格批量登录运输门户，下载 CT-e / MDF-e 压缩包并生成汇总表
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP 会话 + Cookie 罐），只暴露能力
//! - `HttpPortal` / `HttpPortalSession` - 每家企业一个全新会话
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心企业列表
//! - `DocumentClassifier` - 单份 XML 分类（取消事件 / 已授权 CT-e）
//! - `BatchExtractor` - 单个压缩包拆分
//! - `ReportWriter` - 压缩包与汇总表落盘
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一家企业"的完整处理流程
//! - `CompanyCtx` - 上下文封装（行号 + Empresa + CNPJ）
//! - `CompanyFlow` - 流程编排（登录页 → 登录 → CT-e → MDF-e）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量企业处理器，顺序调度并输出结果
//! - `orchestrator/run_context` - 单次运行的汇总状态与统一对账
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
pub(crate) mod fixtures;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{HttpPortal, PortalConnector, PortalSession};
pub use models::{CompanyCredential, DateRange, DocumentRecord, OperationResult, OperationStatus};
pub use orchestrator::{App, ReconcileOutcome, RunContext};
pub use workflow::{CompanyCtx, CompanyFlow};
