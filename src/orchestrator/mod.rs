//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量企业处理器
//! - 管理应用生命周期（初始化、运行、输出）
//! - 加载企业表格（Vec<CompanyCredential>）
//! - 按行顺序调度 CompanyFlow
//! - 输出全局统计信息
//!
//! ### `run_context` - 单次运行的汇总状态
//! - 累积 CT-e 记录、取消键、操作结果、压缩包
//! - 所有企业处理完后统一对账
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<CompanyCredential>，持有 RunContext)
//!     ↓
//! workflow::CompanyFlow (处理单个企业)
//!     ↓
//! services (能力层：classify / extract / write)
//!     ↓
//! infrastructure (基础设施：PortalSession)
//! ```

pub mod batch_processor;
pub mod run_context;

// 重新导出主要类型
pub use batch_processor::App;
pub use run_context::{ReconcileOutcome, RunContext};
