pub mod apply_flow;
pub mod job_ctx;
pub mod page_filler;

pub use apply_flow::{ApplyFlow, ApplyState, FlowTimings};
pub use job_ctx::JobCtx;
pub use page_filler::{PageFillStats, PageFiller};
