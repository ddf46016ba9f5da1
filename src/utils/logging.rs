use anyhow::{Context, Result};
/// 日志工具模块
///
/// 初始化 tracing 订阅者，并提供格式化输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::models::JobStatus;

/// 初始化日志：同时输出到终端和日志文件
///
/// `RUST_LOG` 优先；未设置时默认 `info`，详细模式下为 `debug`
pub fn init(config: &Config) -> Result<()> {
    init_log_file(&config.output_log_file)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.output_log_file)
        .with_context(|| format!("无法打开日志文件: {}", config.output_log_file))?;

    let default_level = if config.verbose_logging { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("日志系统初始化失败")?;

    Ok(())
}

/// 在日志文件中追加本次运行的分隔头
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "\n{}\n投递日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );

    if let Some(parent) = std::path::Path::new(log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    file.write_all(log_header.as_bytes())?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 自动投递模式");
    if config.headless {
        info!("🖥️ 浏览器: 无头模式");
    } else {
        info!("🖥️ 浏览器: 调试端口 {}", config.browser_debug_port);
    }
    info!("📋 职位列表: {}", config.jobs_file);
    info!("📒 投递台账: {}", config.ledger_file);
    info!("{}", "=".repeat(60));
}

/// 记录职位加载信息
pub fn log_jobs_loaded(total: usize, already_done: usize) {
    info!("✓ 找到 {} 个职位", total);
    if already_done > 0 {
        info!("⏭️ 其中 {} 个已投递成功，将跳过", already_done);
    }
}

/// 运行统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub skipped: usize,
    pub success: usize,
    pub already_applied: usize,
    pub ambiguous: usize,
    pub failed: usize,
    /// 是否因中断信号提前结束
    pub cancelled: bool,
}

impl RunStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record(&mut self, status: JobStatus) {
        match status {
            JobStatus::SuccessfullyApplied => self.success += 1,
            JobStatus::AlreadyApplied => self.already_applied += 1,
            JobStatus::SubmissionAmbiguous => self.ambiguous += 1,
            JobStatus::Failed => self.failed += 1,
        }
    }

    /// 本次实际处理的职位数
    pub fn processed(&self) -> usize {
        self.success + self.already_applied + self.ambiguous + self.failed
    }
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &RunStats, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    info!("ℹ️ 已投递过: {}", stats.already_applied);
    info!("❓ 结果不明: {}", stats.ambiguous);
    info!("❌ 失败: {}", stats.failed);
    info!("⏭️ 跳过: {}", stats.skipped);
    if stats.cancelled {
        info!("🛑 运行被中断，剩余 {} 个职位未处理", stats.total.saturating_sub(stats.skipped + stats.processed()));
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
