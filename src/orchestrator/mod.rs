//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量调度，是整个系统的"指挥中心"。
//!
//! ### `batch_processor` - 批量投递处理器
//! - 管理应用生命周期（初始化、运行）
//! - 加载申请人配置、职位列表、投递台账
//! - 管理浏览器资源（Browser、JsExecutor）
//! - 逐个职位调用 ApplyFlow，并把结果写入台账
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<JobPosting>)
//!     ↓
//! workflow::ApplyFlow (处理单个职位的向导)
//!     ↓
//! workflow::PageFiller (处理单个向导页)
//!     ↓
//! services (能力层：识别 / 取值 / 填写 / 等待 / 台账)
//!     ↓
//! infrastructure (基础设施：JsExecutor、CdpFormPage)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有 Browser 和 JsExecutor
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无业务逻辑**：只做调度、记录和统计

pub mod batch_processor;

pub use batch_processor::{build_flow, App, BatchRunner};
