pub mod cdp_page;
pub mod js_executor;

pub use cdp_page::CdpFormPage;
pub use js_executor::JsExecutor;
