//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"和导航的能力

use anyhow::{Context, Result};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() / goto() 能力
/// - 不认识表单字段，也不认识职位
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于元素级操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 打开链接并等待加载完成
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("打开页面失败: {}", url))?;
        Ok(())
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 以参数调用一个 JS 函数表达式：`(function) (args...)`
    ///
    /// 参数经 JSON 编码后拼接，不需要手动转义
    pub async fn call_as<T: DeserializeOwned, A: Serialize>(&self, function: &str, args: &A) -> Result<T> {
        let args = serde_json::to_string(args)?;
        self.eval_as(format!("({})(...{})", function, args)).await
    }
}
