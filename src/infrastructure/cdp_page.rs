//! `FormPage` 的浏览器实现 - 基础设施层
//!
//! 元素句柄就是元素上的 `data-autofill-idx` 属性：扫描或查找时给元素打上编号，
//! 之后用属性选择器取回。页面跳转后编号随 DOM 一起消失。

use crate::error::InteractionError;
use crate::infrastructure::js_executor::JsExecutor;
use crate::models::{ElementHandle, ElementQuery, ElementSnapshot, Interaction, InteractionPath};
use crate::services::page_port::FormPage;
use anyhow::{anyhow, Result};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::element::Element;
use std::path::Path;
use tracing::debug;

const HANDLE_ATTR: &str = "data-autofill-idx";

/// 给元素分配编号，扫描和查找共用
const TAG_FN: &str = r#"
    const tag = (el) => {
        if (window.__autofillSeq === undefined) window.__autofillSeq = 0;
        if (!el.hasAttribute('data-autofill-idx')) {
            el.setAttribute('data-autofill-idx', String(window.__autofillSeq++));
        }
        return Number(el.getAttribute('data-autofill-idx'));
    };
"#;

const SCAN_JS: &str = r#"() => {
    TAG_FN
    return Array.from(document.querySelectorAll('input, select, textarea'))
        .filter(el => !el.disabled)
        .map(el => {
            const tagName = el.tagName.toLowerCase();
            return {
                handle: tag(el),
                tag: tagName,
                inputType: tagName === 'input' ? (el.getAttribute('type') || 'text').toLowerCase() : null,
                name: el.getAttribute('name'),
                id: el.id || null,
                required: el.required || el.getAttribute('aria-required') === 'true',
                value: el.value === undefined ? null : String(el.value),
                checked: !!el.checked,
                options: tagName === 'select'
                    ? Array.from(el.options).map(o => ({ value: o.value, text: (o.text || '').trim(), selected: o.selected }))
                    : [],
            };
        });
}"#;

/// 由内向外查找标签。单选 / 多选框跳过属于选项自身的 label，取组标题。
const LABEL_JS: &str = r#"(idx) => {
    const el = document.querySelector(`[data-autofill-idx="${idx}"]`);
    if (!el) return '';
    const text = (n) => n ? (n.innerText || n.textContent || '').trim() : '';
    const type = (el.getAttribute('type') || '').toLowerCase();
    const isChoice = type === 'radio' || type === 'checkbox';
    const isOptionLabel = (label) => {
        const control = label.control;
        if (!control) return false;
        const t = (control.getAttribute('type') || '').toLowerCase();
        return t === 'radio' || t === 'checkbox';
    };

    if (isChoice) {
        const fieldset = el.closest('fieldset');
        if (fieldset && text(fieldset.querySelector('legend'))) return text(fieldset.querySelector('legend'));
        const group = el.closest('[role="radiogroup"], [role="group"]');
        if (group) {
            const labelledBy = group.getAttribute('aria-labelledby');
            if (labelledBy && text(document.getElementById(labelledBy.split(' ')[0]))) {
                return text(document.getElementById(labelledBy.split(' ')[0]));
            }
            if (group.getAttribute('aria-label')) return group.getAttribute('aria-label').trim();
        }
    } else {
        if (el.labels && el.labels.length && text(el.labels[0])) return text(el.labels[0]);
        const labelledBy = el.getAttribute('aria-labelledby');
        if (labelledBy && text(document.getElementById(labelledBy.split(' ')[0]))) {
            return text(document.getElementById(labelledBy.split(' ')[0]));
        }
        if (el.getAttribute('aria-label')) return el.getAttribute('aria-label').trim();
    }

    let node = el.parentElement;
    for (let depth = 0; node && depth < 5; depth++, node = node.parentElement) {
        for (const candidate of node.querySelectorAll(':scope > label, :scope > legend')) {
            if (isChoice && candidate.tagName.toLowerCase() === 'label' && isOptionLabel(candidate)) continue;
            const t = text(candidate);
            if (t) return t;
        }
    }
    return isChoice ? '' : (el.getAttribute('placeholder') || '');
}"#;

const READ_VALUE_JS: &str = r#"(idx) => {
    const el = document.querySelector(`[data-autofill-idx="${idx}"]`);
    if (!el) return { found: false, value: '' };
    return { found: true, value: el.value === undefined ? '' : String(el.value) };
}"#;

/// 返回匹配元素的编号，找不到返回 -1。可见元素优先。
const FIND_JS: &str = r#"(selector, needle) => {
    TAG_FN
    const lowered = needle ? needle.toLowerCase() : null;
    const matches = Array.from(document.querySelectorAll(selector)).filter(n => {
        if (!lowered) return true;
        const content = (n.innerText || n.textContent || n.value || '').toLowerCase();
        return content.includes(lowered);
    });
    const visible = matches.find(n => n.getClientRects().length > 0);
    const el = visible || matches[0];
    return el ? tag(el) : -1;
}"#;

/// 返回 'ok' / 'missing' / 'nomatch'
const SELECT_JS: &str = r#"(idx, wanted, byText) => {
    const el = document.querySelector(`[data-autofill-idx="${idx}"]`);
    if (!el) return 'missing';
    if (!el.options) return 'nomatch';
    const target = wanted.trim();
    const option = Array.from(el.options).find(o => byText
        ? (o.text || '').trim().toLowerCase() === target.toLowerCase()
        : o.value === target);
    if (!option) return 'nomatch';
    el.value = option.value;
    option.selected = true;
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
    return 'ok';
}"#;

const SET_TEXT_JS: &str = r#"(idx, text) => {
    const el = document.querySelector(`[data-autofill-idx="${idx}"]`);
    if (!el) return 'missing';
    const proto = el.tagName.toLowerCase() === 'textarea' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
    const setter = Object.getOwnPropertyDescriptor(proto, 'value');
    if (setter && setter.set) setter.set.call(el, text); else el.value = text;
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
    return 'ok';
}"#;

const CLEAR_JS: &str = r#"(idx) => {
    const el = document.querySelector(`[data-autofill-idx="${idx}"]`);
    if (!el) return 'missing';
    el.value = '';
    el.dispatchEvent(new Event('input', { bubbles: true }));
    return 'ok';
}"#;

const CLICK_JS: &str = r#"(idx) => {
    const el = document.querySelector(`[data-autofill-idx="${idx}"]`);
    if (!el) return 'missing';
    el.scrollIntoView({ block: 'center' });
    el.click();
    return 'ok';
}"#;

#[derive(serde::Deserialize)]
struct ReadValue {
    found: bool,
    value: String,
}

/// 基于 chromiumoxide 的表单页面
pub struct CdpFormPage<'a> {
    executor: &'a JsExecutor,
}

impl<'a> CdpFormPage<'a> {
    pub fn new(executor: &'a JsExecutor) -> Self {
        Self { executor }
    }

    fn selector_for(handle: ElementHandle) -> String {
        format!("[{}=\"{}\"]", HANDLE_ATTR, handle.0)
    }

    async fn element(&self, handle: ElementHandle) -> Result<Element, InteractionError> {
        self.executor
            .page()
            .find_element(Self::selector_for(handle))
            .await
            .map_err(|e| InteractionError::Detached(format!("{}: {}", handle, e)))
    }

    /// 执行返回 'ok' / 'missing' / 'nomatch' 的脚本
    async fn run_status_script<A: serde::Serialize>(
        &self,
        handle: ElementHandle,
        function: &str,
        args: &A,
    ) -> Result<(), InteractionError> {
        let status: String = self
            .executor
            .call_as(function, args)
            .await
            .map_err(|e| InteractionError::Script(e.to_string()))?;

        match status.as_str() {
            "ok" => Ok(()),
            "missing" => Err(InteractionError::Detached(handle.to_string())),
            "nomatch" => Err(InteractionError::NoMatchingOption(handle.to_string())),
            other => Err(InteractionError::Script(format!("未知的脚本结果: {}", other))),
        }
    }

    async fn native_set_text(&self, handle: ElementHandle, text: &str) -> Result<(), InteractionError> {
        let element = self.element(handle).await?;
        self.run_status_script(handle, CLEAR_JS, &(handle.0,)).await?;
        element
            .focus()
            .await
            .map_err(|e| InteractionError::Rejected(e.to_string()))?;
        element
            .type_str(text)
            .await
            .map_err(|e| InteractionError::Rejected(e.to_string()))?;
        Ok(())
    }

    async fn native_click(&self, handle: ElementHandle) -> Result<(), InteractionError> {
        let element = self.element(handle).await?;
        element
            .scroll_into_view()
            .await
            .map_err(|e| InteractionError::Rejected(e.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| InteractionError::Rejected(e.to_string()))?;
        Ok(())
    }
}

impl FormPage for CdpFormPage<'_> {
    async fn goto(&self, url: &str) -> Result<()> {
        self.executor.goto(url).await
    }

    async fn list_interactive_elements(&self) -> Result<Vec<ElementSnapshot>> {
        let js = SCAN_JS.replace("TAG_FN", TAG_FN);
        self.executor.eval_as(format!("({})()", js)).await
    }

    async fn nearest_label(&self, handle: ElementHandle) -> Result<Option<String>> {
        let label: String = self.executor.call_as(LABEL_JS, &(handle.0,)).await?;
        let label = label.trim();
        Ok((!label.is_empty()).then(|| label.to_string()))
    }

    async fn read_value(&self, handle: ElementHandle) -> Result<Option<String>> {
        let result: ReadValue = self.executor.call_as(READ_VALUE_JS, &(handle.0,)).await?;
        if !result.found {
            return Err(anyhow!("元素已失效: {}", handle));
        }
        Ok(Some(result.value))
    }

    async fn apply_interaction(
        &self,
        handle: ElementHandle,
        interaction: &Interaction,
        path: InteractionPath,
    ) -> Result<(), InteractionError> {
        debug!("{:?} {} {:?}", path, handle, interaction);
        match (interaction, path) {
            (Interaction::SetText(text), InteractionPath::Native) => self.native_set_text(handle, text).await,
            (Interaction::SetText(text), InteractionPath::Script) => {
                self.run_status_script(handle, SET_TEXT_JS, &(handle.0, text)).await
            }
            (Interaction::SelectByValue(value), _) => {
                self.run_status_script(handle, SELECT_JS, &(handle.0, value, false)).await
            }
            (Interaction::SelectByText(text), _) => {
                self.run_status_script(handle, SELECT_JS, &(handle.0, text, true)).await
            }
            (Interaction::Check | Interaction::Click, InteractionPath::Native) => self.native_click(handle).await,
            (Interaction::Check | Interaction::Click, InteractionPath::Script) => {
                self.run_status_script(handle, CLICK_JS, &(handle.0,)).await
            }
        }
    }

    async fn find(&self, query: &ElementQuery) -> Result<Option<ElementHandle>> {
        let js = FIND_JS.replace("TAG_FN", TAG_FN);
        let idx: i64 = self
            .executor
            .call_as(&js, &(&query.selector, &query.text))
            .await?;
        Ok(u32::try_from(idx).ok().map(ElementHandle))
    }

    async fn upload_file(&self, handle: ElementHandle, path: &Path) -> Result<(), InteractionError> {
        let element = self.element(handle).await?;
        let file = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string();

        let params = SetFileInputFilesParams::builder()
            .file(file)
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(InteractionError::Script)?;

        self.executor
            .page()
            .execute(params)
            .await
            .map_err(|e| InteractionError::Rejected(e.to_string()))?;
        Ok(())
    }
}
