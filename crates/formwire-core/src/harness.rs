#![forbid(unsafe_code)]

//! Deterministic host for driving the controller without a browser.
//!
//! [`MemoryDom`] is a flat map from selector to element state: a selector
//! addresses exactly the element inserted under that string, no matching
//! rules apply. [`HostHarness`] plays the browser's part: it routes events
//! through the resolved binding table, settles clipboard writes from a
//! scripted outcome, runs revert timers on a manually advanced clock, and
//! records downloads and diagnostics.

use core::time::Duration;
use std::collections::{BTreeMap, BTreeSet};

use crate::binding::{BindingTable, DomEvent};
use crate::config::ControllerConfig;
use crate::controller::{Effect, FormController, SummaryDownload};
use crate::copy_button::RevertTimer;
use crate::dom::FormDom;

/// State of one in-memory element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryElement {
    pub value: String,
    pub text: String,
    pub inner_html: String,
    pub classes: BTreeSet<String>,
    pub disabled: bool,
    /// Names of the selected files, in selection order.
    pub files: Vec<String>,
}

impl MemoryElement {
    #[must_use]
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            inner_html: text.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_inner_html(html: &str) -> Self {
        Self {
            text: strip_tags(html),
            inner_html: html.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }
}

/// Text content of a markup fragment: everything outside `<...>`.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDom {
    elements: BTreeMap<String, MemoryElement>,
}

impl MemoryDom {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The summarizer page with its default form values.
    #[must_use]
    pub fn summarizer_page() -> Self {
        let mut dom = Self::new();
        dom.insert("form")
            .insert("#submit-btn")
            .insert_element("#loader", MemoryElement::default().with_class("hidden"))
            .insert("#file-input")
            .insert_element("#file-name", MemoryElement::with_text(""))
            .insert_element("#method", MemoryElement::with_value("abstractive"))
            .insert_element(
                ".extractive-options",
                MemoryElement::default().with_class("hidden"),
            )
            .insert(".abstractive-options")
            .insert_element("#ratio", MemoryElement::with_value("0.3"))
            .insert_element("#ratio-value", MemoryElement::with_text(""))
            .insert_element("#min-length", MemoryElement::with_value("50"))
            .insert_element("#max-length", MemoryElement::with_value("150"))
            .insert_element(
                "#copy-btn",
                MemoryElement::with_inner_html(r#"<i class="fas fa-copy"></i> Copy"#),
            )
            .insert("#download-btn")
            .insert_element(".summary-text p", MemoryElement::with_text(""));
        dom
    }

    pub fn insert(&mut self, selector: &str) -> &mut Self {
        self.insert_element(selector, MemoryElement::default())
    }

    pub fn insert_element(&mut self, selector: &str, element: MemoryElement) -> &mut Self {
        self.elements.insert(selector.to_string(), element);
        self
    }

    pub fn remove(&mut self, selector: &str) -> Option<MemoryElement> {
        self.elements.remove(selector)
    }

    #[must_use]
    pub fn element(&self, selector: &str) -> Option<&MemoryElement> {
        self.elements.get(selector)
    }

    pub fn element_mut(&mut self, selector: &str) -> Option<&mut MemoryElement> {
        self.elements.get_mut(selector)
    }

    /// Replace the file selection of a file input.
    pub fn select_files(&mut self, selector: &str, names: &[&str]) -> bool {
        let Some(element) = self.elements.get_mut(selector) else {
            return false;
        };
        element.files = names.iter().map(|name| (*name).to_string()).collect();
        true
    }

    #[must_use]
    pub fn value_of(&self, selector: &str) -> Option<&str> {
        self.element(selector).map(|el| el.value.as_str())
    }

    #[must_use]
    pub fn text_of(&self, selector: &str) -> Option<&str> {
        self.element(selector).map(|el| el.text.as_str())
    }

    #[must_use]
    pub fn inner_html_of(&self, selector: &str) -> Option<&str> {
        self.element(selector).map(|el| el.inner_html.as_str())
    }

    #[must_use]
    pub fn has_class(&self, selector: &str, class: &str) -> bool {
        self.element(selector)
            .is_some_and(|el| el.classes.contains(class))
    }

    #[must_use]
    pub fn is_disabled(&self, selector: &str) -> bool {
        self.element(selector).is_some_and(|el| el.disabled)
    }
}

impl FormDom for MemoryDom {
    fn exists(&self, selector: &str) -> bool {
        self.elements.contains_key(selector)
    }

    fn value(&self, selector: &str) -> Option<String> {
        self.value_of(selector).map(str::to_string)
    }

    fn set_value(&mut self, selector: &str, value: &str) -> bool {
        self.element_mut(selector)
            .map(|el| el.value = value.to_string())
            .is_some()
    }

    fn text(&self, selector: &str) -> Option<String> {
        self.text_of(selector).map(str::to_string)
    }

    fn set_text(&mut self, selector: &str, text: &str) -> bool {
        self.element_mut(selector)
            .map(|el| {
                el.text = text.to_string();
                el.inner_html = text.to_string();
            })
            .is_some()
    }

    fn set_hidden(&mut self, selector: &str, class: &str, hidden: bool) -> bool {
        self.element_mut(selector)
            .map(|el| {
                if hidden {
                    el.classes.insert(class.to_string());
                } else {
                    el.classes.remove(class);
                }
            })
            .is_some()
    }

    fn set_disabled(&mut self, selector: &str, disabled: bool) -> bool {
        self.element_mut(selector)
            .map(|el| el.disabled = disabled)
            .is_some()
    }

    fn set_inner_html(&mut self, selector: &str, html: &str) -> bool {
        self.element_mut(selector)
            .map(|el| {
                el.text = strip_tags(html);
                el.inner_html = html.to_string();
            })
            .is_some()
    }

    fn first_file_name(&self, selector: &str) -> Option<String> {
        self.element(selector)?.files.first().cloned()
    }
}

/// How the simulated clipboard answers write requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardMode {
    Grant,
    Deny(String),
}

/// A download the harness offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub contents: String,
    pub object_url: String,
}

/// One browser call made while offering a download, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStep {
    CreateObjectUrl(String),
    AppendAnchor { href: String, download: String },
    ClickAnchor(String),
    RemoveAnchor(String),
    RevokeObjectUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduledRevert {
    due: Duration,
    timer: RevertTimer,
}

/// Browser stand-in for the controller.
pub struct HostHarness {
    controller: FormController,
    dom: MemoryDom,
    bindings: BindingTable,
    now: Duration,
    timers: Vec<ScheduledRevert>,
    clipboard_mode: ClipboardMode,
    clipboard: Option<String>,
    downloads: Vec<DownloadedFile>,
    download_steps: Vec<DownloadStep>,
    next_object_url: u64,
    diagnostics: Vec<String>,
}

impl HostHarness {
    /// Build a harness and run the controller's initialization.
    #[must_use]
    pub fn new(config: ControllerConfig, mut dom: MemoryDom) -> Self {
        let mut controller = FormController::new(config);
        let bindings = controller.initialize(&mut dom);
        Self {
            controller,
            dom,
            bindings,
            now: Duration::ZERO,
            timers: Vec::new(),
            clipboard_mode: ClipboardMode::Grant,
            clipboard: None,
            downloads: Vec::new(),
            download_steps: Vec::new(),
            next_object_url: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Harness over [`MemoryDom::summarizer_page`] with default config.
    #[must_use]
    pub fn summarizer_page() -> Self {
        Self::new(ControllerConfig::default(), MemoryDom::summarizer_page())
    }

    #[must_use]
    pub fn dom(&self) -> &MemoryDom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut MemoryDom {
        &mut self.dom
    }

    #[must_use]
    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FormController {
        &mut self.controller
    }

    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn set_clipboard_mode(&mut self, mode: ClipboardMode) {
        self.clipboard_mode = mode;
    }

    #[must_use]
    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    #[must_use]
    pub fn downloads(&self) -> &[DownloadedFile] {
        &self.downloads
    }

    #[must_use]
    pub fn download_steps(&self) -> &[DownloadStep] {
        &self.download_steps
    }

    /// Object URLs created and not yet revoked.
    #[must_use]
    pub fn live_object_urls(&self) -> usize {
        let mut live = BTreeSet::new();
        for step in &self.download_steps {
            match step {
                DownloadStep::CreateObjectUrl(url) => {
                    live.insert(url);
                }
                DownloadStep::RevokeObjectUrl(url) => {
                    live.remove(url);
                }
                _ => {}
            }
        }
        live.len()
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Deliver `event` to `selector`; returns how many listeners ran.
    pub fn fire(&mut self, event: DomEvent, selector: &str) -> usize {
        let actions: Vec<_> = self
            .bindings
            .bindings()
            .iter()
            .filter(|b| b.event == event && b.selector == selector)
            .map(|b| b.action)
            .collect();
        for &action in &actions {
            let effects = self.controller.dispatch(action, &mut self.dom);
            self.run_effects(effects);
        }
        actions.len()
    }

    pub fn submit(&mut self) -> usize {
        let form = self.controller.config().selectors.form.clone();
        self.fire(DomEvent::Submit, &form)
    }

    pub fn click(&mut self, selector: &str) -> usize {
        self.fire(DomEvent::Click, selector)
    }

    /// Type a value and commit it.
    pub fn change_value(&mut self, selector: &str, value: &str) -> usize {
        self.dom.set_value(selector, value);
        self.fire(DomEvent::Change, selector)
    }

    /// Move a slider or type without committing.
    pub fn input_value(&mut self, selector: &str, value: &str) -> usize {
        self.dom.set_value(selector, value);
        self.fire(DomEvent::Input, selector)
    }

    pub fn choose_files(&mut self, selector: &str, names: &[&str]) -> usize {
        self.dom.select_files(selector, names);
        self.fire(DomEvent::Change, selector)
    }

    /// Advance the clock, firing due timers in due order.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
        loop {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, scheduled)| scheduled.due <= self.now)
                .min_by_key(|(_, scheduled)| scheduled.due)
                .map(|(idx, _)| idx);
            let Some(idx) = next else {
                break;
            };
            let scheduled = self.timers.remove(idx);
            self.controller
                .revert_timer_fired(scheduled.timer, &mut self.dom);
        }
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Same call sequence as the browser host: the URL is revoked only after
    /// the anchor was clicked and removed.
    fn offer_download(&mut self, download: SummaryDownload) {
        let object_url = format!("blob:formwire/{}", self.next_object_url);
        self.next_object_url += 1;
        self.download_steps.extend([
            DownloadStep::CreateObjectUrl(object_url.clone()),
            DownloadStep::AppendAnchor {
                href: object_url.clone(),
                download: download.file_name.clone(),
            },
            DownloadStep::ClickAnchor(object_url.clone()),
            DownloadStep::RemoveAnchor(object_url.clone()),
            DownloadStep::RevokeObjectUrl(object_url.clone()),
        ]);
        self.downloads.push(DownloadedFile {
            file_name: download.file_name,
            mime_type: download.mime_type,
            contents: download.contents,
            object_url,
        });
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::WriteClipboard { text } => {
                    let result = match &self.clipboard_mode {
                        ClipboardMode::Grant => {
                            self.clipboard = Some(text);
                            Ok(())
                        }
                        ClipboardMode::Deny(reason) => Err(reason.clone()),
                    };
                    let follow_up = self.controller.clipboard_resolved(result, &mut self.dom);
                    self.run_effects(follow_up);
                }
                Effect::ScheduleRevert(timer) => self.timers.push(ScheduledRevert {
                    due: self.now.saturating_add(timer.delay),
                    timer,
                }),
                Effect::CancelRevert(timer) => self
                    .timers
                    .retain(|scheduled| scheduled.timer.generation != timer.generation),
                Effect::Download(download) => self.offer_download(download),
                Effect::ReportError { message } => self.diagnostics.push(message),
            }
        }
    }
}
