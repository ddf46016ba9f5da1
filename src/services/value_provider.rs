//! 取值服务 - 业务能力层
//!
//! 只负责"这个字段应该填什么"，不接触页面

use crate::models::ApplicantProfile;
use crate::services::label_resolver::{normalize, Resolution};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use tracing::debug;

/// `{{ key }}` 占位符
static TEMPLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("占位符正则是常量"));

/// 答案库
///
/// 取值顺序：
/// 1. 问题表，按原始标签匹配（先精确、再归一化）
/// 2. 资料表，按解析出的语义键
/// 3. 资料表，按元素的 name 属性
/// 4. 兜底值，仅限必填字段
///
/// 运行期间只读。
#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    questions: BTreeMap<String, String>,
    questions_normalized: HashMap<String, String>,
    profile: BTreeMap<String, String>,
    profile_normalized: HashMap<String, String>,
    default_answer: Option<String>,
}

impl AnswerStore {
    pub fn new(
        questions: BTreeMap<String, String>,
        profile: BTreeMap<String, String>,
        default_answer: Option<String>,
    ) -> Self {
        let questions: BTreeMap<String, String> = questions
            .into_iter()
            .map(|(q, a)| (q.trim().to_string(), a))
            .collect();
        let questions_normalized = index_normalized(&questions);
        let profile_normalized = index_normalized(&profile);

        Self {
            questions,
            questions_normalized,
            profile,
            profile_normalized,
            default_answer,
        }
    }

    pub fn from_profile(profile: &ApplicantProfile) -> Self {
        Self::new(
            profile.questions.clone(),
            profile.profile.clone(),
            profile.default_answer.clone(),
        )
    }

    /// 为字段取值；找不到时返回 `None`，字段将被跳过
    pub fn value_for(
        &self,
        key: &Resolution,
        raw_label: Option<&str>,
        name_attr: Option<&str>,
        required: bool,
    ) -> Option<String> {
        if let Some(answer) = raw_label.and_then(|label| self.question_answer(label)) {
            debug!("问题表命中: {:?}", raw_label);
            return Some(answer.to_string());
        }

        if let Some(value) = self.profile_value(key.key()) {
            debug!("资料表命中: {}", key.key());
            return Some(value.to_string());
        }

        if let Some(value) = name_attr.and_then(|name| self.profile_value(name)) {
            debug!("资料表按 name 属性命中: {:?}", name_attr);
            return Some(value.to_string());
        }

        if required {
            if let Some(default) = &self.default_answer {
                debug!("必填字段使用兜底值: {}", key.key());
                return Some(default.clone());
            }
        }

        None
    }

    /// 问题表查找
    pub fn question_answer(&self, raw_label: &str) -> Option<&str> {
        let trimmed = raw_label.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.questions
            .get(trimmed)
            .or_else(|| self.questions_normalized.get(&normalize(trimmed)))
            .map(String::as_str)
    }

    /// 资料表查找（先精确，再归一化）
    pub fn profile_value(&self, key: &str) -> Option<&str> {
        if key.is_empty() {
            return None;
        }
        self.profile
            .get(key)
            .or_else(|| self.profile_normalized.get(&normalize(key)))
            .map(String::as_str)
    }

    /// 展开 `{{ key }}` 模板
    ///
    /// 模板名按原样、空格换成下划线两种方式查资料表；
    /// 任一占位符无法展开时返回 `None`。
    pub fn resolve_template(&self, template: &str) -> Option<String> {
        let mut missing = false;

        let expanded = TEMPLATE_RE.replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match self
                .profile_value(name)
                .or_else(|| self.profile_value(&name.replace(' ', "_")))
            {
                Some(value) => value.to_string(),
                None => {
                    missing = true;
                    String::new()
                }
            }
        });

        if missing {
            debug!("模板无法展开: {}", template);
            None
        } else {
            Some(expanded.into_owned())
        }
    }

    pub fn default_answer(&self) -> Option<&str> {
        self.default_answer.as_deref()
    }
}

fn index_normalized(table: &BTreeMap<String, String>) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for (key, value) in table {
        let canonical = normalize(key);
        if !canonical.is_empty() {
            index.entry(canonical).or_insert_with(|| value.clone());
        }
    }
    index
}
