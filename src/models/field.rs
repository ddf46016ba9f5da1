//! 表单字段模型
//!
//! 这些类型每次页面加载都会重新发现，不做持久化。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 元素句柄
///
/// 只在一次页面加载内有效，翻页后同一个数字可能指向别的元素，
/// 所以不能用它来判断"是否已填写"。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(pub u32);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    #[serde(alias = "text_area")]
    TextArea,
    Select,
    Radio,
    Checkbox,
}

impl FieldKind {
    /// 根据标签名和 type 属性推断字段类型
    ///
    /// 不可填写的元素（hidden / submit / file 等）返回 `None`
    pub fn from_tag(tag: &str, input_type: Option<&str>) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "textarea" => Some(FieldKind::TextArea),
            "select" => Some(FieldKind::Select),
            "input" => {
                let input_type = input_type.unwrap_or("text").to_ascii_lowercase();
                match input_type.as_str() {
                    "radio" => Some(FieldKind::Radio),
                    "checkbox" => Some(FieldKind::Checkbox),
                    "hidden" | "submit" | "button" | "reset" | "image" | "file" => None,
                    _ => Some(FieldKind::Text),
                }
            }
            _ => None,
        }
    }

    /// 单选 / 多选组
    pub fn is_choice(self) -> bool {
        matches!(self, FieldKind::Radio | FieldKind::Checkbox)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::TextArea => "textarea",
            FieldKind::Select => "select",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
        };
        f.write_str(name)
    }
}

/// 选项：select 的 `<option>`，或单选 / 多选组中的一个 input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// 组内 input 自己的句柄；select 的 option 没有句柄
    #[serde(default)]
    pub handle: Option<ElementHandle>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub selected: bool,
}

/// 页面元素的原始快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub handle: ElementHandle,
    pub tag: String,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: bool,
    /// 仅 select 有
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

impl ElementSnapshot {
    pub fn kind(&self) -> Option<FieldKind> {
        FieldKind::from_tag(&self.tag, self.input_type.as_deref())
    }
}

/// 一个逻辑字段
///
/// 同名的单选 / 多选 input 合并为一个字段，`options` 中每一项对应一个 input。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// 组内第一个元素的句柄
    pub handle: ElementHandle,
    pub kind: FieldKind,
    pub raw_label: Option<String>,
    pub required: bool,
    pub current_value: Option<String>,
    pub name: Option<String>,
    pub id: Option<String>,
    pub options: Vec<FieldOption>,
}

impl FormField {
    /// 当前是否已有值（单选 / 多选组有任一选中即可）
    pub fn is_satisfied(&self) -> bool {
        if self.kind.is_choice() {
            self.options.iter().any(|o| o.selected)
        } else {
            self.current_value
                .as_deref()
                .is_some_and(|v| !v.trim().is_empty())
        }
    }

    /// 日志中使用的字段描述
    pub fn describe(&self) -> String {
        self.raw_label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .or(self.name.as_deref())
            .or(self.id.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| self.handle.to_string())
    }

    /// 所有属于该字段的元素句柄
    pub fn handles(&self) -> Vec<ElementHandle> {
        let mut handles = vec![self.handle];
        for h in self.options.iter().filter_map(|o| o.handle) {
            if !handles.contains(&h) {
                handles.push(h);
            }
        }
        handles
    }
}

/// 元素查询：CSS 选择器，加上可选的可见文本过滤（包含、不区分大小写）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementQuery {
    pub selector: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl ElementQuery {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            text: None,
        }
    }

    pub fn with_text(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            text: Some(text.into()),
        }
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{} [文本含 '{}']", self.selector, text),
            None => f.write_str(&self.selector),
        }
    }
}

/// 对元素执行的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// 先清空再输入
    SetText(String),
    /// 按 option 的 value 选择
    SelectByValue(String),
    /// 按 option 的可见文本选择
    SelectByText(String),
    /// 选中单选框 / 复选框
    Check,
    /// 点击按钮或链接
    Click,
}

/// 交互路径：先走原生事件，被拒绝后改走脚本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPath {
    Native,
    Script,
}
