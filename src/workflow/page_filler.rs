//! 单页填写流程 - 流程层
//!
//! 识别当前页面的字段，逐个填写。字段级错误只记日志，不中断本页。

use anyhow::Result;
use tracing::{debug, info};

use crate::services::{AnswerStore, FieldClassifier, FillExecutor, FillOutcome, FillRecord, FormPage};
use crate::workflow::job_ctx::JobCtx;

/// 单页填写统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageFillStats {
    pub filled: usize,
    pub already_satisfied: usize,
    pub already_recorded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 本页上找不到的固定选择器（其他向导页的字段）
    pub missed_locators: usize,
}

impl PageFillStats {
    fn count(&mut self, outcome: &FillOutcome) {
        match outcome {
            FillOutcome::Filled => self.filled += 1,
            FillOutcome::AlreadySatisfied => self.already_satisfied += 1,
            FillOutcome::AlreadyRecorded => self.already_recorded += 1,
            FillOutcome::Skipped => self.skipped += 1,
            FillOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// 单页填写流程
pub struct PageFiller<'a> {
    classifier: &'a FieldClassifier,
    answers: &'a AnswerStore,
    executor: FillExecutor,
}

impl<'a> PageFiller<'a> {
    pub fn new(classifier: &'a FieldClassifier, answers: &'a AnswerStore) -> Self {
        Self {
            classifier,
            answers,
            executor: FillExecutor::new(),
        }
    }

    /// 填写当前页面
    pub async fn fill_page<P: FormPage>(
        &self,
        page: &P,
        record: &mut FillRecord,
        ctx: &JobCtx,
    ) -> Result<PageFillStats> {
        let classified = self.classifier.classify(page, self.answers).await?;

        for miss in &classified.misses {
            debug!("{} 固定选择器: {}", ctx, miss);
        }

        let mut stats = PageFillStats {
            missed_locators: classified.misses.len(),
            ..Default::default()
        };
        for plan in &classified.plans {
            let outcome = self.executor.fill(page, record, plan).await;
            stats.count(&outcome);
        }

        info!(
            "{} 📝 本页字段: 填写 {} / 已有值 {} / 已填过 {} / 跳过 {} / 失败 {}",
            ctx,
            stats.filled,
            stats.already_satisfied,
            stats.already_recorded,
            stats.skipped,
            stats.failed
        );

        Ok(stats)
    }
}
