//! 申请人配置（从 TOML 加载）
//!
//! ```toml
//! default_answer = "AutoFilled"
//!
//! [profile]
//! first_name = "Ada"
//! zip = 94105
//!
//! [questions]
//! "Are you at least 18 years of age?" = "Yes"
//!
//! [aliases]
//! first_name = ["Preferred First Name"]
//!
//! [[locators]]
//! semantic_key = "gender"
//! selector = "#jv-field-gender-1"
//! kind = "radio"
//! value = "{{ gender }}"
//! ```

use crate::models::field::{ElementQuery, FieldKind};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// 申请人配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicantProfile {
    /// 扁平的 key → value 资料表
    #[serde(default, deserialize_with = "deserialize_scalar_map")]
    pub profile: BTreeMap<String, String>,
    /// 问题原文 → 答案
    #[serde(default, deserialize_with = "deserialize_scalar_map")]
    pub questions: BTreeMap<String, String>,
    /// 语义键 → 额外的标签写法
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
    /// 固定选择器规则
    #[serde(default)]
    pub locators: Vec<LocatorDecl>,
    /// 必填字段找不到答案时使用的兜底值
    #[serde(default)]
    pub default_answer: Option<String>,
    #[serde(default)]
    pub wizard: WizardSelectors,
    #[serde(default)]
    pub resume: ResumeSettings,
}

/// 固定选择器规则
///
/// `value` 可以是字面值，也可以包含 `{{ key }}` 模板；
/// 省略时按 `semantic_key` 从资料表取值。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocatorDecl {
    #[serde(default)]
    pub semantic_key: Option<String>,
    pub selector: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub value: Option<String>,
}

/// 申请向导的按钮与提示元素
///
/// 默认值对应 Jobvite 的页面结构
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WizardSelectors {
    pub apply: ElementQuery,
    /// 上传简历前需要依次点击的元素（例如 "Select" 按钮）
    pub attachment: Vec<ElementQuery>,
    pub next: ElementQuery,
    pub send: ElementQuery,
    pub success_marker: ElementQuery,
    pub already_applied_marker: ElementQuery,
}

impl Default for WizardSelectors {
    fn default() -> Self {
        Self {
            apply: ElementQuery::with_text("a", "Apply"),
            attachment: vec![ElementQuery::with_text("button", "Select")],
            next: ElementQuery::with_text("button.jv-button-primary", "Next"),
            send: ElementQuery::with_text("button.jv-button-primary", "Send Application"),
            success_marker: ElementQuery::css("h2.jv-page-message-header"),
            already_applied_marker: ElementQuery::css("p.jv-page-error-header"),
        }
    }
}

/// 简历提交方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeMode {
    /// 通过文件选择框上传
    File,
    /// 粘贴纯文本
    Paste,
}

/// 简历上传设置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResumeSettings {
    /// 覆盖 `RESUME_FILE` 环境变量
    pub path: Option<PathBuf>,
    /// 省略时按扩展名判断：`.txt` 粘贴，其余上传
    pub mode: Option<ResumeMode>,
    /// 文件模式下，出现文件框之前要点击的选项
    pub file_option: Option<ElementQuery>,
    pub file_input: ElementQuery,
    pub paste_link: ElementQuery,
    pub paste_textarea: ElementQuery,
    pub paste_save: ElementQuery,
}

impl Default for ResumeSettings {
    fn default() -> Self {
        Self {
            path: None,
            mode: None,
            file_option: Some(ElementQuery::with_text("#attachmentDropdown label span", "File")),
            file_input: ElementQuery::css("input[type='file']"),
            paste_link: ElementQuery::css("span.jv-text-block.jv-text-link"),
            paste_textarea: ElementQuery::css("#jv-paste-resume-textarea0"),
            paste_save: ElementQuery::css("button.jv-button.jv-button-primary[ng-disabled='!pastedText']"),
        }
    }
}

impl ResumeSettings {
    /// 实际使用的提交方式
    pub fn effective_mode(&self, path: &std::path::Path) -> ResumeMode {
        self.mode.unwrap_or_else(|| {
            let is_text = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
            if is_text {
                ResumeMode::Paste
            } else {
                ResumeMode::File
            }
        })
    }
}

/// 把字符串 / 整数 / 浮点 / 布尔值统一读成字符串
fn deserialize_scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw = BTreeMap::<String, toml::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(D::Error::custom(format!(
                        "字段 '{}' 的值必须是字符串或数字，实际为 {}",
                        key,
                        other.type_str()
                    )))
                }
            };
            Ok((key, text))
        })
        .collect()
}
