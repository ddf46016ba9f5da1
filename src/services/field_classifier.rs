//! 字段识别与定位 - 业务能力层
//!
//! 两条并行的发现路径，产出同一种填写计划：
//! - 固定选择器：调用方声明的位置稳定的字段，类型和取值以声明为准
//! - 标签识别：由元素类型推断字段类型，由最近的标签解析语义键

use crate::error::{ConfigError, FieldError};
use crate::models::{
    ElementHandle, ElementQuery, ElementSnapshot, FieldKind, FormField, LocatorDecl,
};
use crate::services::fill_state::FieldIdentity;
use crate::services::label_resolver::{normalize, AliasTable, Resolution};
use crate::services::page_port::FormPage;
use crate::services::value_provider::AnswerStore;
use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// 固定选择器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedLocator {
    pub semantic_key: Option<String>,
    pub selector: String,
    pub kind: FieldKind,
    /// 字面值或 `{{ key }}` 模板
    pub value: Option<String>,
}

impl From<&LocatorDecl> for FixedLocator {
    fn from(decl: &LocatorDecl) -> Self {
        Self {
            semantic_key: decl.semantic_key.clone(),
            selector: decl.selector.clone(),
            kind: decl.kind,
            value: decl.value.clone(),
        }
    }
}

/// 计划来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    Locator(String),
    Label(Resolution),
}

/// 单个字段的填写计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    pub field: FormField,
    pub kind: FieldKind,
    pub identity: Option<FieldIdentity>,
    pub value: Option<String>,
    pub source: PlanSource,
    /// 固定选择器指向单选 / 多选组中的某个具体选项
    pub target_option: Option<ElementHandle>,
}

impl FieldPlan {
    pub fn describe(&self) -> String {
        match &self.source {
            PlanSource::Locator(selector) => format!("{} ({})", self.field.describe(), selector),
            PlanSource::Label(_) => self.field.describe(),
        }
    }
}

/// 一页的识别结果
#[derive(Debug, Default)]
pub struct ClassifiedPage {
    pub plans: Vec<FieldPlan>,
    /// 定位失败的固定选择器
    pub misses: Vec<FieldError>,
}

/// 字段识别器
pub struct FieldClassifier {
    aliases: AliasTable,
    locators: Vec<FixedLocator>,
}

impl FieldClassifier {
    pub fn new(aliases: AliasTable, locators: Vec<FixedLocator>) -> Self {
        Self { aliases, locators }
    }

    /// 内置别名表加上用户别名
    pub fn from_config(
        aliases: &BTreeMap<String, Vec<String>>,
        locators: &[LocatorDecl],
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            AliasTable::with_user_aliases(aliases)?,
            locators.iter().map(FixedLocator::from).collect(),
        ))
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// 识别当前页面上的所有字段
    pub async fn classify<P: FormPage>(&self, page: &P, answers: &AnswerStore) -> Result<ClassifiedPage> {
        let snapshots = page.list_interactive_elements().await?;
        let fields = group_elements(&snapshots);
        debug!("页面共 {} 个元素, 合并为 {} 个字段", snapshots.len(), fields.len());

        let mut result = ClassifiedPage::default();
        let assignments = self.locate_fixed(page, &fields, &mut result.misses).await;

        for (index, field) in fields.into_iter().enumerate() {
            let plan = match assignments.get(&index) {
                Some((locator, target)) => self.plan_from_locator(field, locator, *target, answers),
                None => self.plan_from_label(page, field, answers).await,
            };
            result.plans.push(plan);
        }

        Ok(result)
    }

    /// 把固定选择器对应到字段，返回 字段下标 → (选择器, 命中的元素)
    async fn locate_fixed<'a, P: FormPage>(
        &'a self,
        page: &P,
        fields: &[FormField],
        misses: &mut Vec<FieldError>,
    ) -> HashMap<usize, (&'a FixedLocator, ElementHandle)> {
        let mut assignments = HashMap::new();

        for locator in &self.locators {
            let handle = match page.find(&ElementQuery::css(&locator.selector)).await {
                Ok(Some(handle)) => handle,
                Ok(None) => {
                    debug!("固定选择器未命中: {}", locator.selector);
                    misses.push(FieldError::ElementNotFound {
                        target: locator.selector.clone(),
                    });
                    continue;
                }
                Err(e) => {
                    warn!("固定选择器查询失败 {}: {}", locator.selector, e);
                    misses.push(FieldError::ElementNotFound {
                        target: locator.selector.clone(),
                    });
                    continue;
                }
            };

            match fields.iter().position(|f| f.handles().contains(&handle)) {
                Some(index) => {
                    // 同一个字段只采用第一条规则
                    assignments.entry(index).or_insert((locator, handle));
                }
                None => {
                    debug!("固定选择器命中的元素不可填写: {}", locator.selector);
                    misses.push(FieldError::ElementNotFound {
                        target: locator.selector.clone(),
                    });
                }
            }
        }

        assignments
    }

    fn plan_from_locator(
        &self,
        field: FormField,
        locator: &FixedLocator,
        target: ElementHandle,
        answers: &AnswerStore,
    ) -> FieldPlan {
        let value = match &locator.value {
            Some(template) => answers.resolve_template(template),
            None => locator
                .semantic_key
                .as_deref()
                .and_then(|key| answers.profile_value(key))
                .map(str::to_string),
        };

        let target_option = if field.kind.is_choice() && target != field.handle {
            Some(target)
        } else if field.kind.is_choice() {
            field.options.first().and_then(|o| o.handle)
        } else {
            None
        };

        FieldPlan {
            identity: FieldIdentity::derive(
                locator.semantic_key.as_deref(),
                None,
                Some(&locator.selector),
            ),
            kind: locator.kind,
            value,
            source: PlanSource::Locator(locator.selector.clone()),
            target_option,
            field,
        }
    }

    async fn plan_from_label<P: FormPage>(
        &self,
        page: &P,
        mut field: FormField,
        answers: &AnswerStore,
    ) -> FieldPlan {
        field.raw_label = match page.nearest_label(field.handle).await {
            Ok(label) => label.filter(|l| !l.trim().is_empty()),
            Err(e) => {
                debug!("读取标签失败 {}: {}", field.handle, e);
                None
            }
        };

        if field.required {
            debug!(
                "必填字段 {} name={:?} id={:?} 最近标签: {:?}",
                field.handle, field.name, field.id, field.raw_label
            );
        }

        // 没有标签时退而使用 name / id
        let label_text = field
            .raw_label
            .as_deref()
            .or(field.name.as_deref())
            .or(field.id.as_deref())
            .unwrap_or_default();
        let canonical = normalize(label_text);
        let resolution = self.aliases.resolve(&canonical);

        let value = answers.value_for(
            &resolution,
            field.raw_label.as_deref(),
            field.name.as_deref(),
            field.required,
        );

        // 完全命中别名才用语义键作身份；问题表作答或词组包含命中时用归一化标签
        let by_question = field
            .raw_label
            .as_deref()
            .is_some_and(|label| answers.question_answer(label).is_some());
        let identity = if by_question || !self.aliases.is_exact(&canonical) {
            FieldIdentity::derive(None, Some(&canonical), None)
        } else {
            FieldIdentity::from_resolution(&resolution)
        };

        let identity = identity.or_else(|| {
            field
                .id
                .as_deref()
                .map(|id| format!("#{}", id))
                .or_else(|| field.name.as_deref().map(|n| format!("[name='{}']", n)))
                .map(FieldIdentity::Selector)
        });

        FieldPlan {
            kind: field.kind,
            identity,
            value,
            source: PlanSource::Label(resolution),
            target_option: None,
            field,
        }
    }
}

/// 把元素快照合并为逻辑字段
///
/// 同名的单选 / 多选 input 合并为一个字段，任一成员必填则整组必填；
/// 不可填写的元素被丢弃。
pub fn group_elements(snapshots: &[ElementSnapshot]) -> Vec<FormField> {
    let mut fields: Vec<FormField> = Vec::new();
    let mut groups: HashMap<(FieldKind, String), usize> = HashMap::new();

    for snapshot in snapshots {
        let Some(kind) = snapshot.kind() else {
            continue;
        };

        if kind.is_choice() {
            let option = crate::models::FieldOption {
                handle: Some(snapshot.handle),
                value: snapshot.value.clone().unwrap_or_default(),
                text: String::new(),
                selected: snapshot.checked,
            };

            let group_name = snapshot.name.clone().filter(|n| !n.is_empty());
            if let Some(name) = group_name {
                if let Some(&index) = groups.get(&(kind, name.clone())) {
                    let field = &mut fields[index];
                    field.required |= snapshot.required;
                    if snapshot.checked {
                        field.current_value = Some(option.value.clone());
                    }
                    field.options.push(option);
                    continue;
                }
                groups.insert((kind, name), fields.len());
            }

            fields.push(FormField {
                handle: snapshot.handle,
                kind,
                raw_label: None,
                required: snapshot.required,
                current_value: snapshot.checked.then(|| option.value.clone()),
                name: snapshot.name.clone(),
                id: snapshot.id.clone(),
                options: vec![option],
            });
            continue;
        }

        fields.push(FormField {
            handle: snapshot.handle,
            kind,
            raw_label: None,
            required: snapshot.required,
            current_value: snapshot.value.clone(),
            name: snapshot.name.clone(),
            id: snapshot.id.clone(),
            options: snapshot.options.clone(),
        });
    }

    fields
}
