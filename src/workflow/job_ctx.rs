//! 职位处理上下文
//!
//! 封装"我正在处理第几个职位"这一信息

use crate::models::JobPosting;
use std::fmt::Display;

/// 职位处理上下文
#[derive(Debug, Clone)]
pub struct JobCtx {
    pub job_id: String,
    pub url: String,

    /// 职位在本次运行中的序号（从1开始，仅用于日志显示）
    pub index: usize,

    pub total: usize,
}

impl JobCtx {
    pub fn new(job: &JobPosting, index: usize, total: usize) -> Self {
        Self {
            job_id: job.job_id.clone(),
            url: job.url.clone(),
            index,
            total,
        }
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.job_id.is_empty() {
            write!(f, "[职位 {}/{}]", self.index, self.total)
        } else {
            write!(f, "[职位 {}/{} #{}]", self.index, self.total, self.job_id)
        }
    }
}
