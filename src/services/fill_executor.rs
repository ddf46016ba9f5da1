//! 字段填写 - 业务能力层
//!
//! 按字段类型选择填写策略。所有策略都先检查页面上的现有值，
//! 已满足的字段不再操作，所以重复执行是安全的。

use crate::error::{FieldError, InteractionError};
use crate::models::{ElementHandle, FieldKind, FieldOption, Interaction, InteractionPath};
use crate::services::field_classifier::FieldPlan;
use crate::services::fill_state::FillRecord;
use crate::services::page_port::FormPage;
use crate::utils::truncate_text;
use tracing::{debug, info, warn};

/// 单个字段的填写结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// 本次写入了值
    Filled,
    /// 页面上已有值
    AlreadySatisfied,
    /// 之前的向导页已经填过同一个字段
    AlreadyRecorded,
    /// 非必填且没有可用的值
    Skipped,
    Failed(FieldError),
}

impl FillOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FillOutcome::Failed(_))
    }
}

/// 原生交互被拒绝时，改用脚本再试一次
pub async fn interact_with_fallback<P: FormPage>(
    page: &P,
    handle: ElementHandle,
    interaction: &Interaction,
) -> Result<(), InteractionError> {
    match page
        .apply_interaction(handle, interaction, InteractionPath::Native)
        .await
    {
        Err(InteractionError::Rejected(reason)) => {
            debug!("原生交互被拒绝 {} ({}), 改用脚本", handle, reason);
            page.apply_interaction(handle, interaction, InteractionPath::Script)
                .await
        }
        other => other,
    }
}

/// 字段填写器
#[derive(Debug, Default, Clone, Copy)]
pub struct FillExecutor;

impl FillExecutor {
    pub fn new() -> Self {
        Self
    }

    /// 填写一个字段，成功或已满足时记入台账
    pub async fn fill<P: FormPage>(
        &self,
        page: &P,
        record: &mut FillRecord,
        plan: &FieldPlan,
    ) -> FillOutcome {
        if let Some(identity) = &plan.identity {
            if record.is_filled(identity) {
                debug!("已填写过，跳过: {}", identity);
                return FillOutcome::AlreadyRecorded;
            }
        }

        let outcome = match plan.kind {
            FieldKind::Text | FieldKind::TextArea => self.fill_text(page, plan).await,
            FieldKind::Select => self.fill_select(page, plan).await,
            FieldKind::Radio | FieldKind::Checkbox => self.fill_choice(page, plan).await,
        };

        match &outcome {
            FillOutcome::Filled => {
                info!(
                    "  ✓ {} = {}",
                    plan.describe(),
                    truncate_text(plan.value.as_deref().unwrap_or(""), 40)
                );
                self.remember(record, plan);
            }
            FillOutcome::AlreadySatisfied => {
                debug!("  已有值: {}", plan.describe());
                self.remember(record, plan);
            }
            FillOutcome::Skipped => debug!("  跳过: {}", plan.describe()),
            FillOutcome::AlreadyRecorded => {}
            FillOutcome::Failed(e) => warn!("  ✗ {}", e),
        }

        outcome
    }

    fn remember(&self, record: &mut FillRecord, plan: &FieldPlan) {
        if let Some(identity) = &plan.identity {
            record.mark_filled(identity.clone());
        }
    }

    async fn fill_text<P: FormPage>(&self, page: &P, plan: &FieldPlan) -> FillOutcome {
        let handle = plan.field.handle;
        let current = match page.read_value(handle).await {
            Ok(value) => value,
            Err(e) => {
                debug!("读取当前值失败 {}: {}", handle, e);
                plan.field.current_value.clone()
            }
        };
        if current.as_deref().is_some_and(|v| !v.trim().is_empty()) {
            return FillOutcome::AlreadySatisfied;
        }

        let Some(value) = plan.value.as_deref() else {
            return missing_value(plan);
        };

        match interact_with_fallback(page, handle, &Interaction::SetText(value.to_string())).await {
            Ok(()) => FillOutcome::Filled,
            Err(e) => FillOutcome::Failed(to_field_error(plan, Some(value), e)),
        }
    }

    async fn fill_select<P: FormPage>(&self, page: &P, plan: &FieldPlan) -> FillOutcome {
        let Some(value) = plan.value.as_deref() else {
            return unanswered(plan);
        };

        if plan
            .field
            .options
            .iter()
            .any(|o| o.selected && option_matches(o, value))
        {
            return FillOutcome::AlreadySatisfied;
        }

        let handle = plan.field.handle;
        let by_value = interact_with_fallback(page, handle, &Interaction::SelectByValue(value.to_string())).await;
        let result = match by_value {
            Err(InteractionError::NoMatchingOption(_)) => {
                interact_with_fallback(page, handle, &Interaction::SelectByText(value.to_string())).await
            }
            other => other,
        };

        match result {
            Ok(()) => FillOutcome::Filled,
            Err(e) => FillOutcome::Failed(to_field_error(plan, Some(value), e)),
        }
    }

    async fn fill_choice<P: FormPage>(&self, page: &P, plan: &FieldPlan) -> FillOutcome {
        let options = &plan.field.options;

        let target = match plan.value.as_deref() {
            Some(value) => options
                .iter()
                .find(|o| o.value.trim().eq_ignore_ascii_case(value.trim()))
                .or_else(|| {
                    // 单个复选框：肯定的回答表示勾选
                    (plan.kind == FieldKind::Checkbox && options.len() == 1 && is_truthy(value))
                        .then(|| &options[0])
                })
                .or_else(|| {
                    plan.target_option
                        .and_then(|h| options.iter().find(|o| o.handle == Some(h)))
                }),
            None => plan
                .target_option
                .and_then(|h| options.iter().find(|o| o.handle == Some(h))),
        };

        let Some(target) = target else {
            return match plan.value.as_deref() {
                Some(value) => FillOutcome::Failed(FieldError::MappingMiss {
                    target: plan.describe(),
                    value: Some(value.to_string()),
                }),
                None => unanswered(plan),
            };
        };

        if target.selected {
            return FillOutcome::AlreadySatisfied;
        }

        let handle = target.handle.unwrap_or(plan.field.handle);
        match interact_with_fallback(page, handle, &Interaction::Check).await {
            Ok(()) => FillOutcome::Filled,
            Err(e) => FillOutcome::Failed(to_field_error(plan, plan.value.as_deref(), e)),
        }
    }
}

/// 没有取值但页面上已有有效选择（预选项、已勾选项）时视为已满足
fn unanswered(plan: &FieldPlan) -> FillOutcome {
    if plan.field.is_satisfied() {
        FillOutcome::AlreadySatisfied
    } else {
        missing_value(plan)
    }
}

/// 没有取值：必填字段记为映射失败，交给完成等待去暴露；非必填直接跳过
fn missing_value(plan: &FieldPlan) -> FillOutcome {
    if plan.field.required {
        FillOutcome::Failed(FieldError::MappingMiss {
            target: plan.describe(),
            value: None,
        })
    } else {
        FillOutcome::Skipped
    }
}

fn option_matches(option: &FieldOption, value: &str) -> bool {
    let value = value.trim();
    option.value.trim() == value || option.text.trim().eq_ignore_ascii_case(value)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "on" | "1" | "checked" | "y"
    )
}

fn to_field_error(plan: &FieldPlan, value: Option<&str>, error: InteractionError) -> FieldError {
    match error {
        InteractionError::Detached(_) => FieldError::ElementNotFound {
            target: plan.describe(),
        },
        InteractionError::NoMatchingOption(_) => FieldError::MappingMiss {
            target: plan.describe(),
            value: value.map(str::to_string),
        },
        InteractionError::Rejected(reason) | InteractionError::Script(reason) => {
            FieldError::InteractionRejected {
                target: plan.describe(),
                reason,
            }
        }
    }
}
