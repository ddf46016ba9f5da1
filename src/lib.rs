//! # Auto Apply Submit
//!
//! 一个自动填写并提交职位申请表的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() / goto() 能力
//! - `CdpFormPage` - 用 JS 脚本和 CDP 实现 `FormPage`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只面向 `FormPage` 接口
//! - `AliasTable` - 标签归一化与别名解析
//! - `AnswerStore` - 为字段取值
//! - `FieldClassifier` - 字段识别（固定选择器 + 标签）
//! - `FillExecutor` - 按类型填写字段
//! - `await_required` - 等待必填字段完成
//! - `JobLedger` - 投递台账
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个职位"的完整投递流程
//! - `JobCtx` - 上下文封装（职位序号 + 链接）
//! - `ApplyFlow` - 向导状态机（Apply → 简历 → 逐页填写 → 提交 → 判断结果）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 顺序处理职位列表，写台账，统计结果
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser_and_page, launch_headless_browser};
pub use config::Config;
pub use error::{AppError, AppResult, FieldError, IncompleteError, InteractionError, JobError};
pub use infrastructure::{CdpFormPage, JsExecutor};
pub use models::{ApplicantProfile, JobPosting, JobStatus};
pub use orchestrator::{build_flow, App, BatchRunner};
pub use services::{FormPage, JobLedger, ResumeAttacher};
pub use workflow::{ApplyFlow, ApplyState, FlowTimings, JobCtx};
