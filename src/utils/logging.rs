use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::{DateRange, OperationResult};
use crate::workflow::CompanyCtx;

/// 初始化 tracing 订阅者
///
/// `RUST_LOG` 优先；未设置时默认 info，`verbose` 为真时为 debug
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
    {
        tracing::debug!("日志订阅者已存在，跳过初始化: {}", e);
    }
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\nCT-e / MDF-e 下载日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(portal: &str, range: &DateRange) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - CT-e / MDF-e 批量下载");
    info!("🌐 门户: {}", portal);
    info!("📅 日期区间: {}", range);
    info!("{}", "=".repeat(60));
}

/// 记录企业加载信息
pub fn log_companies_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的企业", total);
    info!("📋 将按表格顺序逐个处理\n");
}

/// 记录单个企业开始处理
pub fn log_company_start(ctx: &CompanyCtx, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("🔐 [{}/{}] 正在登录: {}", ctx.row_index, total, ctx.empresa);
    info!("{}", "─".repeat(60));
}

/// 打印操作结果表
pub fn log_operation_table(results: &[OperationResult]) {
    info!("\n📊 操作结果:");
    info!("{:<30} {:<16} {}", "Empresa", "CNPJ", "Status");
    for result in results {
        info!(
            "{:<30} {:<16} {}",
            truncate_text(&result.empresa, 30),
            result.cnpj,
            result.status
        );
    }
}

/// 最终统计
#[derive(Debug, Default)]
pub struct FinalStats {
    pub companies: usize,
    pub download_ok: usize,
    pub login_failed: usize,
    pub access_error: usize,
    pub documents: usize,
    pub cancelled: usize,
    pub entry_failures: usize,
    pub output_dir: String,
    pub log_file: String,
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &FinalStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 下载成功: {}/{}", stats.download_ok, stats.companies);
    info!("🔒 登录失败: {}", stats.login_failed);
    info!("❌ 访问错误: {}", stats.access_error);
    info!("📄 CT-e: {} 条 (已取消 {})", stats.documents, stats.cancelled);
    if stats.entry_failures > 0 {
        info!("⚠️ 无法处理的 XML: {}", stats.entry_failures);
    }
    info!("{}", "=".repeat(60));
    info!("\n输出目录: {}", stats.output_dir);
    info!("日志已保存至: {}", stats.log_file);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("Transportes São João", 11), "Transportes...");
        assert_eq!(truncate_text("Acme", 30), "Acme");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(false);
        init(true);
    }

    #[test]
    fn test_log_file_header_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");

        init_log_file(path.to_str().unwrap()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&"=".repeat(60)));
        assert!(content.contains("CT-e / MDF-e"));
    }
}
