//! 已填写字段台账
//!
//! 每个职位开始时新建，跨向导页累积，职位结束时丢弃。
//! 键是可重建的字段身份，不是元素句柄：翻页后句柄会失效或被复用。

use crate::services::label_resolver::{normalize, Resolution};
use std::collections::HashSet;
use std::fmt;

/// 字段身份
///
/// 优先级：语义键 > 归一化标签 > 选择器
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldIdentity {
    Key(String),
    Label(String),
    Selector(String),
}

impl FieldIdentity {
    /// 按优先级取第一个可用的身份
    pub fn derive(
        semantic_key: Option<&str>,
        raw_label: Option<&str>,
        selector: Option<&str>,
    ) -> Option<Self> {
        if let Some(key) = semantic_key.map(str::trim).filter(|k| !k.is_empty()) {
            return Some(FieldIdentity::Key(key.to_string()));
        }
        if let Some(label) = raw_label.map(normalize).filter(|l| !l.is_empty()) {
            return Some(FieldIdentity::Label(label));
        }
        selector
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| FieldIdentity::Selector(s.to_string()))
    }

    /// 由别名解析结果得到身份：命中别名表用语义键，否则用归一化标签
    pub fn from_resolution(resolution: &Resolution) -> Option<Self> {
        match resolution {
            Resolution::Known(key) => Some(FieldIdentity::Key(key.to_string())),
            Resolution::AdHoc(label) if !label.is_empty() => {
                Some(FieldIdentity::Label(label.clone()))
            }
            Resolution::AdHoc(_) => None,
        }
    }
}

impl fmt::Display for FieldIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIdentity::Key(k) => write!(f, "key:{}", k),
            FieldIdentity::Label(l) => write!(f, "label:{}", l),
            FieldIdentity::Selector(s) => write!(f, "selector:{}", s),
        }
    }
}

/// 一次投递中已满足的字段集合，只增不减
#[derive(Debug, Default)]
pub struct FillRecord {
    filled: HashSet<FieldIdentity>,
}

impl FillRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记为已填写，返回是否为新记录
    pub fn mark_filled(&mut self, identity: FieldIdentity) -> bool {
        self.filled.insert(identity)
    }

    pub fn is_filled(&self, identity: &FieldIdentity) -> bool {
        self.filled.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.filled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filled.is_empty()
    }
}
