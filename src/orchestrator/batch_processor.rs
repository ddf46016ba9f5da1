//! 批量投递处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责职位列表的顺序处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：连接或启动浏览器、创建 JsExecutor
//! 2. **加载输入**：申请人配置、职位列表、投递台账
//! 3. **顺序处理**：同一个页面上逐个投递，已成功的职位跳过
//! 4. **结果落盘**：每个职位结束立即写台账，中断信号到来时当前职位记为 `Failed`
//! 5. **全局统计**：汇总各状态数量
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 Browser 的模块
//! - **严格顺序**：只有一个页面，职位之间不并发
//! - **向下委托**：委托 ApplyFlow 处理单个职位

use crate::browser;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{CdpFormPage, JsExecutor};
use crate::models::{load_applicant_profile, load_job_postings, ApplicantProfile, JobPosting, JobStatus};
use crate::services::{AnswerStore, FieldClassifier, FormPage, JobLedger, PageResumeAttacher, ResumeAttacher};
use crate::utils::logging::{log_jobs_loaded, log_startup, print_final_stats, RunStats};
use crate::workflow::{ApplyFlow, FlowTimings, JobCtx};
use anyhow::Result;
use chromiumoxide::Browser;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    executor: JsExecutor,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let (browser, page) = if config.headless {
            browser::launch_headless_browser(config.chrome_executable.as_deref(), &config.start_url).await?
        } else {
            browser::connect_to_browser_and_page(config.browser_debug_port, &config.start_url).await?
        };

        // 创建 JsExecutor（持有 page）
        let executor = JsExecutor::new(page);

        Ok(Self {
            config,
            _browser: browser,
            executor,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        info!("\n📁 正在加载配置...");
        let profile = load_applicant_profile(Path::new(&self.config.profile_file)).await?;
        let jobs = load_job_postings(Path::new(&self.config.jobs_file), &self.config.job_base_url).await?;

        if jobs.is_empty() {
            warn!("⚠️ 职位列表为空，程序结束");
            return Ok(());
        }

        let flow = build_flow(&self.config, &profile)?;
        let mut ledger = JobLedger::load(&self.config.ledger_file).map_err(AppError::from)?;
        log_jobs_loaded(jobs.len(), jobs.iter().filter(|j| ledger.is_done(&j.url)).count());

        let page = CdpFormPage::new(&self.executor);
        let stats = BatchRunner::new(&page, &flow).run(&jobs, &mut ledger).await?;

        print_final_stats(&stats, &self.config.output_log_file);
        Ok(())
    }
}

/// 由配置组装投递流程
pub fn build_flow(config: &Config, profile: &ApplicantProfile) -> AppResult<ApplyFlow<PageResumeAttacher>> {
    let classifier = FieldClassifier::from_config(&profile.aliases, &profile.locators)?;
    info!("✓ 别名表共 {} 个写法", classifier.aliases().len());

    let timings = FlowTimings::from(config);
    let resume_path = profile
        .resume
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.resume_file));
    let attacher = PageResumeAttacher::new(
        resume_path,
        profile.resume.clone(),
        timings.probe_timeout,
        timings.probe_poll,
    );
    info!("📎 简历上传方式: {:?}", attacher.mode());

    Ok(ApplyFlow::new(
        classifier,
        AnswerStore::from_profile(profile),
        profile.wizard.clone(),
        attacher,
        timings,
    ))
}

/// 顺序投递一批职位
pub struct BatchRunner<'a, P, R> {
    page: &'a P,
    flow: &'a ApplyFlow<R>,
}

impl<'a, P: FormPage, R: ResumeAttacher> BatchRunner<'a, P, R> {
    pub fn new(page: &'a P, flow: &'a ApplyFlow<R>) -> Self {
        Self { page, flow }
    }

    /// 处理所有职位，Ctrl-C 时记录当前职位后停止
    pub async fn run(&self, jobs: &[JobPosting], ledger: &mut JobLedger) -> AppResult<RunStats> {
        self.run_until(jobs, ledger, async {
            if tokio::signal::ctrl_c().await.is_err() {
                // 无法监听信号时不中断
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// 处理所有职位，直到 `shutdown` 完成
    pub async fn run_until<F>(
        &self,
        jobs: &[JobPosting],
        ledger: &mut JobLedger,
        shutdown: F,
    ) -> AppResult<RunStats>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let total = jobs.len();
        let mut stats = RunStats::new(total);

        for (idx, job) in jobs.iter().enumerate() {
            let ctx = JobCtx::new(job, idx + 1, total);

            if ledger.is_done(&job.url) {
                info!("{} ⏭️ 已投递成功，跳过", ctx);
                stats.skipped += 1;
                continue;
            }

            info!("\n{}", "─".repeat(60));
            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => None,
                status = self.flow.run(self.page, &ctx) => Some(status),
            };

            match outcome {
                Some(status) => {
                    ledger.record(&job.url, status)?;
                    stats.record(status);
                    info!("{} 📒 已记录: {}", ctx, status);
                }
                None => {
                    warn!("{} 🛑 收到中断信号，当前职位记为 {}", ctx, JobStatus::Failed);
                    ledger.record(&job.url, JobStatus::Failed)?;
                    stats.record(JobStatus::Failed);
                    stats.cancelled = true;
                    break;
                }
            }
        }

        Ok(stats)
    }
}
