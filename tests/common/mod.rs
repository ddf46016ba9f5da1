//! 测试用的内存页面
//!
//! 每个"站点"是一组页面，每个页面是一组元素。点击带 `navigates_to` 的元素切换页面，
//! `goto` 时从模板重新生成站点，句柄在不同页面之间可以重复。

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use auto_apply_submit::error::InteractionError;
use auto_apply_submit::models::{
    ElementHandle, ElementQuery, ElementSnapshot, FieldOption, Interaction, InteractionPath,
};
use auto_apply_submit::services::{AliasTable, AnswerStore, FieldClassifier, FormPage, ResumeAttacher};
use auto_apply_submit::workflow::FlowTimings;

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub snapshot: ElementSnapshot,
    /// 为 false 时不出现在 `list_interactive_elements` 中（按钮、提示文字等）
    pub interactive: bool,
    pub label: Option<String>,
    pub text: String,
    pub selectors: Vec<String>,
    pub reject_native: bool,
    pub navigates_to: Option<usize>,
}

impl FakeElement {
    fn base(handle: u32, tag: &str, input_type: Option<&str>) -> Self {
        Self {
            snapshot: ElementSnapshot {
                handle: ElementHandle(handle),
                tag: tag.to_string(),
                input_type: input_type.map(str::to_string),
                name: None,
                id: None,
                required: false,
                value: None,
                checked: false,
                options: Vec::new(),
            },
            interactive: true,
            label: None,
            text: String::new(),
            selectors: Vec::new(),
            reject_native: false,
            navigates_to: None,
        }
    }

    pub fn text_input(handle: u32, name: &str, label: &str) -> Self {
        let mut el = Self::base(handle, "input", Some("text"));
        el.snapshot.name = Some(name.to_string());
        el.snapshot.value = Some(String::new());
        el.label = Some(label.to_string());
        el
    }

    pub fn textarea(handle: u32, name: &str, label: &str) -> Self {
        let mut el = Self::base(handle, "textarea", None);
        el.snapshot.name = Some(name.to_string());
        el.snapshot.value = Some(String::new());
        el.label = Some(label.to_string());
        el
    }

    /// `options` 为 (value, text)，第一个选项默认选中
    pub fn select(handle: u32, name: &str, label: &str, options: &[(&str, &str)]) -> Self {
        let mut el = Self::base(handle, "select", None);
        el.snapshot.name = Some(name.to_string());
        el.snapshot.options = options
            .iter()
            .enumerate()
            .map(|(i, (value, text))| FieldOption {
                handle: None,
                value: value.to_string(),
                text: text.to_string(),
                selected: i == 0,
            })
            .collect();
        el.snapshot.value = options.first().map(|(v, _)| v.to_string());
        el.label = Some(label.to_string());
        el
    }

    pub fn radio(handle: u32, name: &str, value: &str, group_label: &str) -> Self {
        let mut el = Self::base(handle, "input", Some("radio"));
        el.snapshot.name = Some(name.to_string());
        el.snapshot.value = Some(value.to_string());
        el.label = Some(group_label.to_string());
        el
    }

    pub fn checkbox(handle: u32, name: &str, value: &str, label: &str) -> Self {
        let mut el = Self::base(handle, "input", Some("checkbox"));
        el.snapshot.name = Some(name.to_string());
        el.snapshot.value = Some(value.to_string());
        el.label = Some(label.to_string());
        el
    }

    pub fn button(handle: u32, selector: &str, text: &str) -> Self {
        let mut el = Self::base(handle, "button", None);
        el.interactive = false;
        el.text = text.to_string();
        el.selectors.push(selector.to_string());
        el
    }

    /// 只能被查找到的元素（提示文字、文件框等）
    pub fn marker(handle: u32, selector: &str, text: &str) -> Self {
        let mut el = Self::button(handle, selector, text);
        el.snapshot.tag = "div".to_string();
        el
    }

    pub fn required(mut self) -> Self {
        self.snapshot.required = true;
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.snapshot.id = Some(id.to_string());
        self.selectors.push(format!("#{}", id));
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.snapshot.value = Some(value.to_string());
        self
    }

    pub fn checked(mut self) -> Self {
        self.snapshot.checked = true;
        self
    }

    pub fn without_label(mut self) -> Self {
        self.label = None;
        self
    }

    pub fn selector(mut self, selector: &str) -> Self {
        self.selectors.push(selector.to_string());
        self
    }

    pub fn navigates_to(mut self, page: usize) -> Self {
        self.navigates_to = Some(page);
        self
    }

    pub fn rejecting_native(mut self) -> Self {
        self.reject_native = true;
        self
    }

    pub fn handle(&self) -> ElementHandle {
        self.snapshot.handle
    }
}

pub type Site = Vec<Vec<FakeElement>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInteraction {
    pub page: usize,
    pub handle: ElementHandle,
    pub interaction: Interaction,
    pub path: InteractionPath,
}

/// 第 `after_polls` 次列出元素时把某个字段改成指定值，模拟人工补填
#[derive(Debug, Clone)]
struct ExternalFill {
    after_polls: usize,
    handle: ElementHandle,
    value: String,
}

#[derive(Debug, Default)]
struct FakeState {
    default_site: Site,
    sites: HashMap<String, Site>,
    pages: Site,
    current: usize,
    visits: Vec<String>,
    interactions: Vec<RecordedInteraction>,
    uploads: Vec<PathBuf>,
    list_calls: usize,
    external_fills: Vec<ExternalFill>,
}

impl FakeState {
    fn element_mut(&mut self, handle: ElementHandle) -> Option<&mut FakeElement> {
        let current = self.current;
        self.pages
            .get_mut(current)?
            .iter_mut()
            .find(|e| e.snapshot.handle == handle)
    }

    fn current_page(&self) -> &[FakeElement] {
        self.pages.get(self.current).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Default)]
pub struct FakePage {
    state: RefCell<FakeState>,
}

impl FakePage {
    /// 单个页面，不需要 `goto`
    pub fn single(elements: Vec<FakeElement>) -> Self {
        Self::with_site(vec![elements])
    }

    /// 所有链接共用的站点
    pub fn with_site(site: Site) -> Self {
        let page = Self::default();
        {
            let mut state = page.state.borrow_mut();
            state.pages = site.clone();
            state.default_site = site;
        }
        page
    }

    /// 为某个链接指定单独的站点
    pub fn add_site(self, url: &str, site: Site) -> Self {
        self.state.borrow_mut().sites.insert(url.to_string(), site);
        self
    }

    pub fn fill_externally_after(&self, after_polls: usize, handle: ElementHandle, value: &str) {
        self.state.borrow_mut().external_fills.push(ExternalFill {
            after_polls,
            handle,
            value: value.to_string(),
        });
    }

    pub fn visits(&self) -> Vec<String> {
        self.state.borrow().visits.clone()
    }

    pub fn interactions(&self) -> Vec<RecordedInteraction> {
        self.state.borrow().interactions.clone()
    }

    pub fn interaction_count(&self) -> usize {
        self.state.borrow().interactions.len()
    }

    pub fn uploads(&self) -> Vec<PathBuf> {
        self.state.borrow().uploads.clone()
    }

    pub fn current_page_index(&self) -> usize {
        self.state.borrow().current
    }

    /// 当前页面上某个元素的值
    pub fn value_of(&self, handle: ElementHandle) -> Option<String> {
        let state = self.state.borrow();
        state
            .current_page()
            .iter()
            .find(|e| e.snapshot.handle == handle)
            .and_then(|e| e.snapshot.value.clone())
    }

    pub fn is_checked(&self, handle: ElementHandle) -> bool {
        let state = self.state.borrow();
        state
            .current_page()
            .iter()
            .any(|e| e.snapshot.handle == handle && e.snapshot.checked)
    }
}

impl FormPage for FakePage {
    async fn goto(&self, url: &str) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();
        state.visits.push(url.to_string());
        let site = state
            .sites
            .get(url)
            .cloned()
            .unwrap_or_else(|| state.default_site.clone());
        state.pages = site;
        state.current = 0;
        Ok(())
    }

    async fn list_interactive_elements(&self) -> anyhow::Result<Vec<ElementSnapshot>> {
        let mut state = self.state.borrow_mut();
        state.list_calls += 1;
        let calls = state.list_calls;

        let due: Vec<ExternalFill> = state
            .external_fills
            .iter()
            .filter(|f| f.after_polls <= calls)
            .cloned()
            .collect();
        state.external_fills.retain(|f| f.after_polls > calls);
        for fill in due {
            if let Some(el) = state.element_mut(fill.handle) {
                el.snapshot.value = Some(fill.value);
            }
        }

        Ok(state
            .current_page()
            .iter()
            .filter(|e| e.interactive)
            .map(|e| e.snapshot.clone())
            .collect())
    }

    async fn nearest_label(&self, handle: ElementHandle) -> anyhow::Result<Option<String>> {
        let state = self.state.borrow();
        Ok(state
            .current_page()
            .iter()
            .find(|e| e.snapshot.handle == handle)
            .and_then(|e| e.label.clone()))
    }

    async fn read_value(&self, handle: ElementHandle) -> anyhow::Result<Option<String>> {
        let state = self.state.borrow();
        state
            .current_page()
            .iter()
            .find(|e| e.snapshot.handle == handle)
            .map(|e| e.snapshot.value.clone())
            .ok_or_else(|| anyhow::anyhow!("detached {}", handle))
    }

    async fn apply_interaction(
        &self,
        handle: ElementHandle,
        interaction: &Interaction,
        path: InteractionPath,
    ) -> Result<(), InteractionError> {
        let mut state = self.state.borrow_mut();
        let page = state.current;
        state.interactions.push(RecordedInteraction {
            page,
            handle,
            interaction: interaction.clone(),
            path,
        });

        let el = state
            .element_mut(handle)
            .ok_or_else(|| InteractionError::Detached(handle.to_string()))?;

        if el.reject_native && path == InteractionPath::Native {
            return Err(InteractionError::Rejected("element is covered".to_string()));
        }

        match interaction {
            Interaction::SetText(text) => {
                el.snapshot.value = Some(text.clone());
            }
            Interaction::SelectByValue(wanted) | Interaction::SelectByText(wanted) => {
                let by_text = matches!(interaction, Interaction::SelectByText(_));
                let index = el.snapshot.options.iter().position(|o| {
                    if by_text {
                        o.text.trim().eq_ignore_ascii_case(wanted.trim())
                    } else {
                        o.value == *wanted
                    }
                });
                let Some(index) = index else {
                    return Err(InteractionError::NoMatchingOption(wanted.clone()));
                };
                for (i, option) in el.snapshot.options.iter_mut().enumerate() {
                    option.selected = i == index;
                }
                el.snapshot.value = Some(el.snapshot.options[index].value.clone());
            }
            Interaction::Check => {
                let is_radio = el.snapshot.input_type.as_deref() == Some("radio");
                let name = el.snapshot.name.clone();
                el.snapshot.checked = true;
                if is_radio {
                    let current = state.current;
                    for other in state.pages[current].iter_mut() {
                        if other.snapshot.handle != handle
                            && other.snapshot.input_type.as_deref() == Some("radio")
                            && other.snapshot.name == name
                        {
                            other.snapshot.checked = false;
                        }
                    }
                }
            }
            Interaction::Click => {
                if let Some(target) = el.navigates_to {
                    state.current = target;
                }
            }
        }
        Ok(())
    }

    async fn find(&self, query: &ElementQuery) -> anyhow::Result<Option<ElementHandle>> {
        let state = self.state.borrow();
        let needle = query.text.as_ref().map(|t| t.to_lowercase());
        Ok(state
            .current_page()
            .iter()
            .find(|e| {
                e.selectors.iter().any(|s| *s == query.selector)
                    && needle
                        .as_ref()
                        .map_or(true, |n| e.text.to_lowercase().contains(n))
            })
            .map(|e| e.snapshot.handle))
    }

    async fn upload_file(&self, handle: ElementHandle, path: &Path) -> Result<(), InteractionError> {
        let mut state = self.state.borrow_mut();
        if state.element_mut(handle).is_none() {
            return Err(InteractionError::Detached(handle.to_string()));
        }
        state.uploads.push(path.to_path_buf());
        Ok(())
    }
}

/// 只计数的简历上传
#[derive(Debug, Default)]
pub struct FakeAttacher {
    pub calls: Cell<usize>,
    pub fail: bool,
}

impl FakeAttacher {
    pub fn failing() -> Self {
        Self {
            calls: Cell::new(0),
            fail: true,
        }
    }
}

impl ResumeAttacher for FakeAttacher {
    async fn attach<P: FormPage>(&self, _page: &P) -> anyhow::Result<()> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            anyhow::bail!("file input not found");
        }
        Ok(())
    }
}

/// 测试用的短时间参数
pub fn fast_timings() -> FlowTimings {
    FlowTimings {
        settle_delay: Duration::ZERO,
        probe_poll: Duration::from_millis(10),
        probe_timeout: Duration::from_millis(200),
        next_probe_timeout: Duration::from_millis(50),
        outcome_timeout: Duration::from_millis(100),
        completion_poll: Duration::from_millis(50),
        completion_max_wait: Duration::from_millis(300),
        max_pages: 5,
    }
}

pub fn classifier() -> FieldClassifier {
    FieldClassifier::new(AliasTable::builtin(), Vec::new())
}

pub fn answers(profile: &[(&str, &str)], questions: &[(&str, &str)], default_answer: Option<&str>) -> AnswerStore {
    AnswerStore::new(
        questions.iter().map(|(q, a)| (q.to_string(), a.to_string())).collect(),
        profile.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        default_answer.map(str::to_string),
    )
}

pub fn applicant_answers() -> AnswerStore {
    answers(
        &[
            ("first_name", "Ada"),
            ("last_name", "Lovelace"),
            ("email", "ada@example.com"),
            ("phone", "555-0100"),
            ("country", "United States"),
            ("gender", "Female"),
        ],
        &[("Are you at least 18 years of age?", "Yes")],
        None,
    )
}

// ========== 向导站点 ==========

pub const APPLY: &str = "a";
pub const PRIMARY: &str = "button.jv-button-primary";
pub const SUCCESS: &str = "h2.jv-page-message-header";
pub const ALREADY: &str = "p.jv-page-error-header";

/// Jobvite 风格的向导：落地页 → 表单页… → 结果页
///
/// `form_pages` 的第一页上会加上 "Select" 按钮；除最后一页外每页加 "Next"，
/// 最后一页加 "Send Application"。`outcome` 为结果页上的元素。
pub fn wizard_site(form_pages: Vec<Vec<FakeElement>>, outcome: Vec<FakeElement>) -> Site {
    let count = form_pages.len();
    let mut site = vec![vec![FakeElement::button(900, APPLY, "Apply").navigates_to(1)]];

    for (i, mut fields) in form_pages.into_iter().enumerate() {
        let page_index = i + 1;
        if i == 0 {
            fields.push(FakeElement::button(901, "button", "Select"));
        }
        if page_index < count {
            fields.push(FakeElement::button(902, PRIMARY, "Next").navigates_to(page_index + 1));
        } else {
            fields.push(FakeElement::button(903, PRIMARY, "Send Application").navigates_to(count + 1));
        }
        site.push(fields);
    }

    site.push(outcome);
    site
}

pub fn success_outcome() -> Vec<FakeElement> {
    vec![FakeElement::marker(950, SUCCESS, "Thank you for applying")]
}

pub fn already_applied_outcome() -> Vec<FakeElement> {
    vec![FakeElement::marker(951, ALREADY, "You have already applied")]
}

/// 两页表单，都能用 `applicant_answers` 填满
pub fn two_page_form() -> Vec<Vec<FakeElement>> {
    vec![
        vec![
            FakeElement::text_input(1, "fname", "Legal First Name *").required(),
            FakeElement::text_input(2, "lname", "Last Name").required(),
            FakeElement::text_input(3, "contact", "Email Address").required(),
        ],
        vec![
            FakeElement::select(1, "country", "Country", &[("", "Choose..."), ("US", "United States"), ("CA", "Canada")])
                .required(),
            FakeElement::radio(2, "gender", "Male", "Gender"),
            FakeElement::radio(3, "gender", "Female", "Gender"),
            FakeElement::select(4, "adult", "Are you at least 18 years of age?", &[("", "--"), ("Yes", "Yes"), ("No", "No")])
                .required(),
        ],
    ]
}
