//! 批量企业处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量企业的处理和结果输出。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、解析日期区间、创建门户连接器
//! 2. **批量加载**：读取企业表格（`Vec<CompanyCredential>`）
//! 3. **顺序处理**：按表格行顺序逐个企业处理，不并发
//! 4. **统一对账**：所有企业处理完后，用取消键集合对账一次
//! 5. **结果输出**：压缩包、CT-e 汇总表、操作结果表
//! 6. **全局统计**：汇总所有企业的处理结果

use crate::config::Config;
use crate::infrastructure::{HttpPortal, PortalConnector};
use crate::models::{load_company_rows, CompanyCredential, DateRange, DocumentKind, OperationStatus};
use crate::orchestrator::run_context::{ReconcileOutcome, RunContext};
use crate::services::ReportWriter;
use crate::utils::logging;
use crate::workflow::{CompanyCtx, CompanyFlow};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// 应用主结构
pub struct App<C: PortalConnector = HttpPortal> {
    config: Config,
    range: DateRange,
    connector: C,
}

impl App<HttpPortal> {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        let connector = HttpPortal::new(&config).context("无法创建门户连接器")?;
        Self::with_connector(config, connector)
    }
}

impl<C: PortalConnector> App<C> {
    /// 使用指定的门户连接器创建应用
    pub fn with_connector(config: Config, connector: C) -> Result<Self> {
        let range = config.date_range().context("日期区间配置无效")?;

        logging::log_startup(&config.portal_base_url, &range);

        Ok(Self {
            config,
            range,
            connector,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunContext> {
        // 加载所有企业
        let companies = self.load_companies()?;

        if companies.is_empty() {
            warn!("⚠️ 表格中没有企业，只生成空的操作结果表");
        } else {
            logging::log_companies_loaded(companies.len());
        }

        // 处理所有企业
        let mut state = RunContext::new();
        let outcome = self.process_all(&companies, &mut state).await;

        // 输出结果文件
        self.write_outputs(&state, outcome)?;

        // 输出最终统计
        print_final_stats(&state, &self.config);

        Ok(state)
    }

    /// 加载企业表格
    fn load_companies(&self) -> Result<Vec<CompanyCredential>> {
        info!("\n📁 正在读取企业表格: {}", self.config.input_spreadsheet);
        load_company_rows(Path::new(&self.config.input_spreadsheet))
            .with_context(|| format!("无法读取企业表格: {}", self.config.input_spreadsheet))
    }

    /// 顺序处理所有企业，最后统一对账
    pub async fn process_all(
        &self,
        companies: &[CompanyCredential],
        state: &mut RunContext,
    ) -> ReconcileOutcome {
        state.clear();
        let flow = CompanyFlow::new(&self.connector, self.range);
        let total = companies.len();

        for (idx, credential) in companies.iter().enumerate() {
            let ctx = CompanyCtx::new(idx + 1, credential);
            logging::log_company_start(&ctx, total);

            let status = flow.run(&ctx, credential, state).await;
            info!("{} 结果: {}", ctx, status);
        }

        let outcome = state.reconcile();
        match outcome {
            ReconcileOutcome::Empty => {
                warn!("⚠️ 没有解析到任何 CT-e，不生成汇总表");
            }
            ReconcileOutcome::Reconciled {
                documents,
                cancelled,
            } => {
                info!("🔁 对账完成: CT-e {} 条，其中已取消 {} 条", documents, cancelled);
            }
        }
        outcome
    }

    /// 写出压缩包和汇总表
    fn write_outputs(&self, state: &RunContext, outcome: ReconcileOutcome) -> Result<()> {
        let writer = ReportWriter::new(&self.config.output_dir);
        writer.prepare()?;

        for kind in DocumentKind::ALL {
            for (cnpj, bytes) in state.archives(kind) {
                let Some(bytes) = bytes else { continue };
                // 单个压缩包写失败不影响汇总表
                if let Err(e) = writer.write_archive(kind, cnpj, bytes) {
                    warn!("⚠️ {} 压缩包写入失败 (CNPJ {}): {}", kind, cnpj, e);
                }
            }
        }

        if outcome != ReconcileOutcome::Empty {
            writer.write_summary(state.documents())?;
        }
        writer.write_operations(state.results())?;

        logging::log_operation_table(state.results());
        Ok(())
    }
}

// ========== 日志辅助函数 ==========

fn print_final_stats(state: &RunContext, config: &Config) {
    logging::print_final_stats(&logging::FinalStats {
        companies: state.results().len(),
        download_ok: state.count_status(OperationStatus::DownloadOk),
        login_failed: state.count_status(OperationStatus::LoginFailed),
        access_error: state.count_status(OperationStatus::AccessError),
        documents: state.documents().len(),
        cancelled: state.documents().iter().filter(|d| d.is_cancelled()).count(),
        entry_failures: state.entry_failures().len(),
        output_dir: config.output_dir.clone(),
        log_file: config.output_log_file.clone(),
    });
}
