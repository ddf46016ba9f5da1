//! 页面能力接口 - 业务能力层与基础设施层之间的边界
//!
//! 上层只通过这个 trait 读取和操作页面，看不到任何浏览器自动化库的类型。
//! 这里不做重试，重试策略由调用方决定。

use crate::error::InteractionError;
use crate::models::{ElementHandle, ElementQuery, ElementSnapshot, Interaction, InteractionPath};
use anyhow::Result;
use std::path::Path;

/// 表单页面
#[allow(async_fn_in_trait)]
pub trait FormPage {
    /// 打开链接
    async fn goto(&self, url: &str) -> Result<()>;

    /// 列出当前页面上所有 input / select / textarea
    async fn list_interactive_elements(&self) -> Result<Vec<ElementSnapshot>>;

    /// 离元素最近的标签文本
    ///
    /// 由内向外逐层查找祖先节点（最多 5 层），第一个找到的标签生效
    async fn nearest_label(&self, handle: ElementHandle) -> Result<Option<String>>;

    /// 读取元素当前值
    async fn read_value(&self, handle: ElementHandle) -> Result<Option<String>>;

    /// 对元素执行一次交互
    async fn apply_interaction(
        &self,
        handle: ElementHandle,
        interaction: &Interaction,
        path: InteractionPath,
    ) -> Result<(), InteractionError>;

    /// 查找第一个匹配的元素，返回的句柄与 `list_interactive_elements` 一致
    async fn find(&self, query: &ElementQuery) -> Result<Option<ElementHandle>>;

    /// 为文件输入框设置文件
    async fn upload_file(&self, handle: ElementHandle, path: &Path) -> Result<(), InteractionError>;
}
