//! 单个职位的投递流程 - 流程层
//!
//! 核心职责：驱动申请向导从打开链接一直走到提交结果
//!
//! 状态顺序：
//! ```text
//! Start → Applied → AttachmentSelected → ResumeUploaded → PageFilled
//!       → Advancing ⟲ (Next → PageFilled) → Submitted → Finished
//! ```
//!
//! 每一步的等待都有上限；任一步失败都结束本职位并记为 `Failed`。

use std::time::Duration;

use anyhow::anyhow;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{JobError, JobResult};
use crate::models::{ElementHandle, ElementQuery, Interaction, JobStatus, WizardSelectors};
use crate::services::{
    await_required, interact_with_fallback, probe, AnswerStore, FieldClassifier, FillRecord,
    FormPage, ResumeAttacher,
};
use crate::workflow::job_ctx::JobCtx;
use crate::workflow::page_filler::PageFiller;

/// 流程中所有等待的时间参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowTimings {
    pub settle_delay: Duration,
    pub probe_poll: Duration,
    pub probe_timeout: Duration,
    pub next_probe_timeout: Duration,
    pub outcome_timeout: Duration,
    pub completion_poll: Duration,
    pub completion_max_wait: Duration,
    pub max_pages: usize,
}

impl From<&Config> for FlowTimings {
    fn from(config: &Config) -> Self {
        Self {
            settle_delay: config.settle_delay(),
            probe_poll: config.probe_poll(),
            probe_timeout: Duration::from_secs(config.probe_timeout_secs),
            next_probe_timeout: Duration::from_secs(config.next_probe_timeout_secs),
            outcome_timeout: Duration::from_secs(config.outcome_timeout_secs),
            completion_poll: config.completion_poll(),
            completion_max_wait: Duration::from_secs(config.completion_max_wait_secs),
            max_pages: config.max_wizard_pages,
        }
    }
}

impl Default for FlowTimings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// 向导状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyState {
    Start,
    Applied,
    AttachmentSelected,
    ResumeUploaded,
    /// 第 `page` 页已填写
    PageFilled { page: usize },
    /// 第 `page` 页必填项已完成，准备翻页或提交
    Advancing { page: usize },
    Submitted,
    Finished(JobStatus),
}

/// 投递流程
///
/// - 不持有页面，页面由编排层传入
/// - 每次调用 `run` 使用一份新的填写台账
pub struct ApplyFlow<R> {
    classifier: FieldClassifier,
    answers: AnswerStore,
    wizard: WizardSelectors,
    attacher: R,
    timings: FlowTimings,
}

impl<R: ResumeAttacher> ApplyFlow<R> {
    pub fn new(
        classifier: FieldClassifier,
        answers: AnswerStore,
        wizard: WizardSelectors,
        attacher: R,
        timings: FlowTimings,
    ) -> Self {
        Self {
            classifier,
            answers,
            wizard,
            attacher,
            timings,
        }
    }

    pub fn attacher(&self) -> &R {
        &self.attacher
    }

    /// 投递一个职位，所有错误都折算为 `Failed`
    pub async fn run<P: FormPage>(&self, page: &P, ctx: &JobCtx) -> JobStatus {
        match self.drive(page, ctx).await {
            Ok(status) => status,
            Err(e) => {
                error!("{} ❌ 投递失败: {}", ctx, e);
                JobStatus::Failed
            }
        }
    }

    /// 驱动状态机直到终态
    pub async fn drive<P: FormPage>(&self, page: &P, ctx: &JobCtx) -> JobResult<JobStatus> {
        let filler = PageFiller::new(&self.classifier, &self.answers);
        let mut record = FillRecord::new();
        let mut state = ApplyState::Start;

        loop {
            debug!("{} 状态: {:?}", ctx, state);
            state = match state {
                ApplyState::Start => {
                    info!("{} 🌐 打开职位: {}", ctx, ctx.url);
                    page.goto(&ctx.url).await?;
                    self.settle().await;
                    self.click(page, &self.wizard.apply, "Apply", self.timings.probe_timeout)
                        .await?;
                    self.settle().await;
                    ApplyState::Applied
                }
                ApplyState::Applied => {
                    for query in &self.wizard.attachment {
                        self.click(page, query, &query.to_string(), self.timings.probe_timeout)
                            .await?;
                    }
                    ApplyState::AttachmentSelected
                }
                ApplyState::AttachmentSelected => {
                    self.attacher
                        .attach(page)
                        .await
                        .map_err(|e| JobError::ResumeAttachFailed(format!("{:#}", e)))?;
                    self.settle().await;
                    ApplyState::ResumeUploaded
                }
                ApplyState::ResumeUploaded => {
                    filler.fill_page(page, &mut record, ctx).await?;
                    ApplyState::PageFilled { page: 1 }
                }
                ApplyState::PageFilled { page: current } => {
                    await_required(
                        page,
                        self.timings.completion_poll,
                        self.timings.completion_max_wait,
                    )
                    .await?;
                    ApplyState::Advancing { page: current }
                }
                ApplyState::Advancing { page: current } => {
                    let next = probe(
                        page,
                        &self.wizard.next,
                        self.timings.next_probe_timeout,
                        self.timings.probe_poll,
                    )
                    .await;

                    match next {
                        Some(handle) => {
                            if current >= self.timings.max_pages {
                                return Err(JobError::TooManyPages(self.timings.max_pages));
                            }
                            info!("{} ➡️ 第 {} 页完成，进入下一页", ctx, current);
                            self.press(page, handle, "Next").await?;
                            self.settle().await;
                            filler.fill_page(page, &mut record, ctx).await?;
                            ApplyState::PageFilled { page: current + 1 }
                        }
                        None => {
                            info!("{} 📤 提交申请 (共 {} 页)", ctx, current);
                            self.click(
                                page,
                                &self.wizard.send,
                                "Send Application",
                                self.timings.probe_timeout,
                            )
                            .await?;
                            self.settle().await;
                            ApplyState::Submitted
                        }
                    }
                }
                ApplyState::Submitted => ApplyState::Finished(self.classify_outcome(page, ctx).await),
                ApplyState::Finished(status) => return Ok(status),
            };
        }
    }

    /// 提交后判断结果：先找成功提示，再找"已投递过"提示
    async fn classify_outcome<P: FormPage>(&self, page: &P, ctx: &JobCtx) -> JobStatus {
        let success = probe(
            page,
            &self.wizard.success_marker,
            self.timings.outcome_timeout,
            self.timings.probe_poll,
        )
        .await;
        if success.is_some() {
            info!("{} ✅ 投递成功", ctx);
            return JobStatus::SuccessfullyApplied;
        }

        let already = probe(
            page,
            &self.wizard.already_applied_marker,
            self.timings.outcome_timeout,
            self.timings.probe_poll,
        )
        .await;
        if already.is_some() {
            info!("{} ℹ️ 之前已投递过", ctx);
            return JobStatus::AlreadyApplied;
        }

        warn!("{} ⚠️ 已提交，但没有看到结果提示", ctx);
        JobStatus::SubmissionAmbiguous
    }

    /// 限时查找并点击
    async fn click<P: FormPage>(
        &self,
        page: &P,
        query: &ElementQuery,
        affordance: &str,
        timeout: Duration,
    ) -> JobResult<()> {
        let handle = probe(page, query, timeout, self.timings.probe_poll)
            .await
            .ok_or_else(|| JobError::AffordanceNotFound {
                affordance: affordance.to_string(),
                waited: timeout,
            })?;
        self.press(page, handle, affordance).await
    }

    async fn press<P: FormPage>(&self, page: &P, handle: ElementHandle, affordance: &str) -> JobResult<()> {
        interact_with_fallback(page, handle, &Interaction::Click)
            .await
            .map_err(|e| JobError::Browser(anyhow!("点击 {} 失败: {}", affordance, e)))
    }

    async fn settle(&self) {
        if !self.timings.settle_delay.is_zero() {
            sleep(self.timings.settle_delay).await;
        }
    }
}
