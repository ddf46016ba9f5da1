//! 错误类型
//!
//! 按影响范围分为三级：
//! - 字段级 `FieldError`：记录日志后跳过该字段，继续填写下一个
//! - 职位级 `JobError`：结束当前职位并记为 `Failed`，继续下一个职位
//! - 运行级 `AppError`（`ConfigError` / `FileError` / 浏览器）：停止整个批次

use std::time::Duration;
use thiserror::Error;

/// 页面交互错误（由 `FormPage` 返回）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    /// 元素已失效（页面跳转或被移除）
    #[error("元素已失效: {0}")]
    Detached(String),
    /// 交互被拒绝，例如元素被遮挡无法点击
    #[error("交互被拒绝: {0}")]
    Rejected(String),
    /// 没有匹配的选项
    #[error("没有匹配的选项: {0}")]
    NoMatchingOption(String),
    /// 脚本执行失败
    #[error("脚本执行失败: {0}")]
    Script(String),
}

/// 字段级错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// 定位不到元素
    #[error("未找到元素: {target}")]
    ElementNotFound { target: String },
    /// 原生交互和脚本交互都失败
    #[error("交互失败 ({target}): {reason}")]
    InteractionRejected { target: String, reason: String },
    /// 找不到可用的取值，或取值在页面上没有对应选项
    #[error("无法映射取值 ({target}): {value:?}")]
    MappingMiss {
        target: String,
        value: Option<String>,
    },
}

/// 必填字段在限定时间内仍未完成
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("等待 {waited:?} 后仍有 {} 个必填字段未填写: {}", unfilled.len(), unfilled.join(", "))]
pub struct IncompleteError {
    pub waited: Duration,
    pub unfilled: Vec<String>,
}

/// 职位级错误
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Incomplete(#[from] IncompleteError),

    /// 限定时间内没有找到按钮（Apply / Next / Send）
    #[error("未找到按钮 {affordance} (等待 {waited:?})")]
    AffordanceNotFound {
        affordance: String,
        waited: Duration,
    },

    #[error("简历上传失败: {0}")]
    ResumeAttachFailed(String),

    #[error("向导页数超过上限 {0}")]
    TooManyPages(usize),

    #[error("浏览器错误: {0}")]
    Browser(#[from] anyhow::Error),
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 同一个别名被映射到两个不同的语义键
    #[error("别名 '{variant}' 同时属于 '{existing}' 和 '{conflicting}'")]
    DuplicateAlias {
        variant: String,
        existing: String,
        conflicting: String,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("TOML序列化失败 ({path}): {source}")]
    TomlWriteFailed {
        path: String,
        #[source]
        source: toml::ser::Error,
    },
}

/// 职位级结果类型
pub type JobResult<T> = Result<T, JobError>;

/// 运行级错误：出现时整个批次停止
#[derive(Debug, Error)]
pub enum AppError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("文件错误: {0}")]
    File(#[from] FileError),

    #[error("浏览器错误: {0}")]
    Browser(#[from] anyhow::Error),
}

/// 运行级结果类型
pub type AppResult<T> = Result<T, AppError>;
