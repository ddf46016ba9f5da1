//! 标签归一化与别名解析
//!
//! 同一个问题在不同页面上的写法各不相同（"Legal First Name *"、
//! "First name:"），先归一化，再通过别名表映射到统一的语义键。

use crate::error::ConfigError;
use phf::phf_ordered_map;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::warn;

/// 内置别名表
///
/// 顺序即包含匹配的优先级："email" 必须排在 "address" 前面，
/// 否则 "Email Address" 会被识别成地址。
static BUILTIN_ALIASES: phf::OrderedMap<&'static str, &'static [&'static str]> = phf_ordered_map! {
    "first_name" => &["first name", "given name", "legal first name", "forename"],
    "last_name" => &["last name", "family name", "surname", "legal last name"],
    "email" => &["email", "e mail", "email address"],
    "phone" => &["phone", "phone number", "mobile", "telephone", "cell phone"],
    "pronouns" => &["preferred pronouns", "pronouns"],
    "address" => &["address", "street address", "address line 1"],
    "city" => &["city", "town"],
    "state" => &["state", "province", "state province"],
    "zip" => &["zip", "zip code", "postal code", "postcode"],
    "country" => &["country", "country of residence"],
    "referred" => &["referred by", "referral", "referred"],
    "compensation" => &["desired compensation", "salary expectations", "expected salary", "compensation"],
    "work_status" => &["work status", "employment status"],
    "work_authorization" => &["work authorization", "authorized to work", "work permit"],
    "gender" => &["gender", "sex"],
};

/// 归一化标签：标点视为分隔符，合并空白，转小写
///
/// 结果只包含字母数字和单个空格，所以重复调用结果不变。
pub fn normalize(label: &str) -> String {
    let replaced: String = label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 语义键
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemanticKey(String);

impl SemanticKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SemanticKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// 命中别名表
    Known(SemanticKey),
    /// 未命中，归一化后的标签本身作为临时键
    AdHoc(String),
}

impl Resolution {
    pub fn key(&self) -> &str {
        match self {
            Resolution::Known(key) => key.as_str(),
            Resolution::AdHoc(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Resolution::Known(_))
    }
}

/// 别名表
///
/// 一个写法只能属于一个语义键。解析时先做完全匹配，
/// 再按声明顺序做词组包含匹配，第一个命中即返回。
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    ordered: Vec<(Vec<String>, SemanticKey)>,
    exact: HashMap<String, SemanticKey>,
}

impl AliasTable {
    /// 空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置别名表
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (key, variants) in BUILTIN_ALIASES.entries() {
            for variant in std::iter::once(key).chain(variants.iter()) {
                if let Err(e) = table.insert(key, variant) {
                    warn!("内置别名冲突，已忽略: {}", e);
                }
            }
        }
        table
    }

    /// 内置表加上用户配置的别名
    pub fn with_user_aliases(user: &BTreeMap<String, Vec<String>>) -> Result<Self, ConfigError> {
        let mut table = Self::builtin();
        table.extend(user)?;
        Ok(table)
    }

    /// 追加别名；语义键本身也作为一个写法
    pub fn extend(&mut self, aliases: &BTreeMap<String, Vec<String>>) -> Result<(), ConfigError> {
        for (key, variants) in aliases {
            self.insert(key, key)?;
            for variant in variants {
                self.insert(key, variant)?;
            }
        }
        Ok(())
    }

    /// 添加一个写法
    pub fn insert(&mut self, key: &str, variant: &str) -> Result<(), ConfigError> {
        let canonical = normalize(variant);
        if canonical.is_empty() {
            return Ok(());
        }

        if let Some(existing) = self.exact.get(&canonical) {
            if existing.as_str() == key {
                return Ok(());
            }
            return Err(ConfigError::DuplicateAlias {
                variant: canonical,
                existing: existing.to_string(),
                conflicting: key.to_string(),
            });
        }

        let semantic_key = SemanticKey::new(key);
        let tokens = canonical.split(' ').map(str::to_string).collect();
        self.exact.insert(canonical, semantic_key.clone());
        self.ordered.push((tokens, semantic_key));
        Ok(())
    }

    /// 解析已归一化的标签
    pub fn resolve(&self, canonical: &str) -> Resolution {
        if canonical.is_empty() {
            return Resolution::AdHoc(String::new());
        }

        if let Some(key) = self.exact.get(canonical) {
            return Resolution::Known(key.clone());
        }

        let tokens: Vec<&str> = canonical.split(' ').collect();
        for (variant, key) in &self.ordered {
            if contains_phrase(&tokens, variant) {
                return Resolution::Known(key.clone());
            }
        }

        Resolution::AdHoc(canonical.to_string())
    }

    /// 是否为某个写法的完全匹配（不含词组包含匹配）
    pub fn is_exact(&self, canonical: &str) -> bool {
        self.exact.contains_key(canonical)
    }

    /// 归一化并解析原始标签
    pub fn resolve_label(&self, raw: &str) -> Resolution {
        self.resolve(&normalize(raw))
    }

    /// 写法数量
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

/// 按整词判断 `haystack` 是否包含连续的 `needle`
fn contains_phrase(haystack: &[&str], needle: &[String]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|window| window.iter().zip(needle).all(|(a, b)| *a == b.as_str()))
}
