use serde::{Deserialize, Serialize};
use std::fmt;

/// 待投递的职位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default)]
    pub job_id: String,
    pub url: String,
}

impl JobPosting {
    pub fn new(job_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            url: url.into(),
        }
    }
}

/// 投递结果
///
/// 读取台账时兼容旧版本写入的带空格写法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(alias = "Successfully Applied")]
    SuccessfullyApplied,
    #[serde(alias = "Already Submitted", alias = "Already Applied")]
    AlreadyApplied,
    /// 已点击发送，但既没看到成功提示也没看到"已投递过"提示
    #[serde(alias = "SubmissionFailed", alias = "Submission Failed")]
    SubmissionAmbiguous,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::SuccessfullyApplied => "SuccessfullyApplied",
            JobStatus::AlreadyApplied => "AlreadyApplied",
            JobStatus::SubmissionAmbiguous => "SubmissionAmbiguous",
            JobStatus::Failed => "Failed",
        }
    }

    /// 下次运行时是否可以跳过
    pub fn is_done(self) -> bool {
        self == JobStatus::SuccessfullyApplied
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 台账中的一条记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub job_link: String,
    pub status: JobStatus,
}
