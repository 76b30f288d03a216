#![forbid(unsafe_code)]

//! The form interaction controller.
//!
//! The controller is host-driven: the host resolves the binding table once,
//! forwards each DOM event as an [`Action`], and performs the [`Effect`]s the
//! controller hands back. Asynchronous capabilities (clipboard writes,
//! timers) re-enter through [`FormController::clipboard_resolved`] and
//! [`FormController::revert_timer_fired`].

use core::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::binding::{Action, BindingTable};
use crate::config::ControllerConfig;
use crate::copy_button::{CopyButton, CopyButtonState, RevertTimer};
use crate::dom::FormDom;
use crate::log::{InteractionLog, InteractionRecord, Outcome};
use crate::rules::{
    LengthPair, MethodPanels, clamp_after_max_change, clamp_after_min_change, file_name_label,
    ratio_label,
};

const INITIALIZE: &str = "initialize";
const CLIPBOARD_RESOLVED: &str = "clipboard_resolved";
const REVERT_TIMER: &str = "revert_timer";

/// File the host should offer for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDownload {
    pub file_name: String,
    pub mime_type: String,
    pub contents: String,
}

impl SummaryDownload {
    #[must_use]
    pub fn new(contents: String, config: &ControllerConfig) -> Self {
        Self {
            file_name: config.download.file_name.clone(),
            mime_type: config.download.mime_type.clone(),
            contents,
        }
    }
}

/// Work the host performs on the controller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start an asynchronous clipboard write, then call
    /// [`FormController::clipboard_resolved`] with its outcome.
    WriteClipboard { text: String },
    /// Call [`FormController::revert_timer_fired`] after `timer.delay`.
    ScheduleRevert(RevertTimer),
    /// Drop a previously scheduled revert.
    CancelRevert(RevertTimer),
    /// Offer a file download; release the object URL after the click.
    Download(SummaryDownload),
    /// Write to the diagnostic channel. Not shown to the user.
    ReportError { message: String },
}

pub struct FormController {
    config: ControllerConfig,
    copy_button: CopyButton,
    log: InteractionLog,
}

impl FormController {
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        let copy_button = CopyButton::new(Duration::from_millis(u64::from(config.copy_revert_ms)));
        let log = InteractionLog::new(config.log_capacity);
        Self {
            config,
            copy_button,
            log,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[must_use]
    pub fn copy_state(&self) -> CopyButtonState {
        self.copy_button.state()
    }

    /// Resolve the binding table against `dom` and sync the ratio label once.
    ///
    /// The host attaches one listener per returned binding.
    pub fn initialize(&mut self, dom: &mut impl FormDom) -> BindingTable {
        let bindings = BindingTable::for_contract(&self.config.selectors).resolve(dom);
        debug!(bound = bindings.len(), "form controller initialized");
        self.log.record(
            INITIALIZE,
            Outcome::Applied,
            Some(format!("bound={}", bindings.len())),
        );
        if bindings.contains(Action::SyncRatioLabel) {
            let effects = self.dispatch(Action::SyncRatioLabel, dom);
            debug_assert!(effects.is_empty());
        }
        bindings
    }

    /// Run one action against the current document.
    pub fn dispatch(&mut self, action: Action, dom: &mut impl FormDom) -> Vec<Effect> {
        let mut effects = Vec::new();
        let (outcome, detail) = match action {
            Action::ShowLoader => self.show_loader(dom),
            Action::ShowFileName => self.show_file_name(dom),
            Action::ToggleMethodPanels => self.toggle_method_panels(dom),
            Action::SyncRatioLabel => self.sync_ratio_label(dom),
            Action::ClampFromMin => self.clamp_lengths(dom, LengthSide::Min),
            Action::ClampFromMax => self.clamp_lengths(dom, LengthSide::Max),
            Action::CopySummary => self.request_copy(dom, &mut effects),
            Action::DownloadSummary => self.request_download(dom, &mut effects),
        };
        match outcome {
            Outcome::Applied => debug!(action = action.as_str(), detail = ?detail, "applied"),
            _ => trace!(action = action.as_str(), ?outcome, detail = ?detail, "not applied"),
        }
        self.log.record(action.as_str(), outcome, detail);
        effects
    }

    /// Host callback once the clipboard write settles.
    pub fn clipboard_resolved(
        &mut self,
        result: Result<(), String>,
        dom: &mut impl FormDom,
    ) -> Vec<Effect> {
        match result {
            Ok(()) => {
                let transition = self.copy_button.mark_copied();
                let selector = &self.config.selectors.copy_button;
                if !dom.set_inner_html(selector, &self.config.copy_labels.copied_html) {
                    warn!(selector = %selector, "copy button vanished before label update");
                }
                self.log.record(
                    CLIPBOARD_RESOLVED,
                    Outcome::Applied,
                    Some(format!("generation={}", transition.schedule.generation)),
                );
                let mut effects = Vec::with_capacity(2);
                if let Some(stale) = transition.cancel {
                    effects.push(Effect::CancelRevert(stale));
                }
                effects.push(Effect::ScheduleRevert(transition.schedule));
                effects
            }
            Err(reason) => {
                let message = format!("Failed to copy text: {reason}");
                error!(%reason, "clipboard write rejected");
                self.log
                    .record(CLIPBOARD_RESOLVED, Outcome::Failed, Some(reason));
                vec![Effect::ReportError { message }]
            }
        }
    }

    /// Host callback when a scheduled revert fires.
    ///
    /// Returns `true` if the label was reverted; stale timers are ignored.
    pub fn revert_timer_fired(&mut self, timer: RevertTimer, dom: &mut impl FormDom) -> bool {
        if !self.copy_button.revert(timer) {
            trace!(generation = timer.generation, "stale revert timer ignored");
            self.log.record(
                REVERT_TIMER,
                Outcome::Unchanged,
                Some(format!("stale generation={}", timer.generation)),
            );
            return false;
        }
        let selector = &self.config.selectors.copy_button;
        if !dom.set_inner_html(selector, &self.config.copy_labels.idle_html) {
            warn!(selector = %selector, "copy button vanished before label revert");
        }
        self.log.record(
            REVERT_TIMER,
            Outcome::Applied,
            Some(format!("generation={}", timer.generation)),
        );
        true
    }

    pub fn drain_log(&mut self) -> Vec<InteractionRecord> {
        self.log.drain()
    }

    fn show_loader(&self, dom: &mut impl FormDom) -> (Outcome, Option<String>) {
        let selectors = &self.config.selectors;
        if !dom.exists(&selectors.submit_button) || !dom.exists(&selectors.loader) {
            return (
                Outcome::Skipped,
                Some("submit button or loader missing".to_string()),
            );
        }
        dom.set_hidden(&selectors.loader, &self.config.hidden_class, false);
        dom.set_disabled(&selectors.submit_button, true);
        (Outcome::Applied, None)
    }

    fn show_file_name(&self, dom: &mut impl FormDom) -> (Outcome, Option<String>) {
        let selectors = &self.config.selectors;
        let name = dom.first_file_name(&selectors.file_input);
        let label = file_name_label(name.as_deref());
        if dom.set_text(&selectors.file_name, &label) {
            (Outcome::Applied, Some(label))
        } else {
            (Outcome::Skipped, Some("file name label missing".to_string()))
        }
    }

    fn toggle_method_panels(&self, dom: &mut impl FormDom) -> (Outcome, Option<String>) {
        let selectors = &self.config.selectors;
        let Some(method) = dom.value(&selectors.method) else {
            return (Outcome::Skipped, Some("method select missing".to_string()));
        };
        let panels = MethodPanels::for_method(&method);
        let hidden_class = &self.config.hidden_class;
        let extractive = dom.set_hidden(
            &selectors.extractive_options,
            hidden_class,
            !panels.extractive_visible,
        );
        let abstractive = dom.set_hidden(
            &selectors.abstractive_options,
            hidden_class,
            !panels.abstractive_visible,
        );
        if extractive && abstractive {
            (Outcome::Applied, Some(method))
        } else {
            (Outcome::Skipped, Some("option panel missing".to_string()))
        }
    }

    fn sync_ratio_label(&self, dom: &mut impl FormDom) -> (Outcome, Option<String>) {
        let selectors = &self.config.selectors;
        let Some(raw) = dom.value(&selectors.ratio) else {
            return (Outcome::Skipped, Some("ratio slider missing".to_string()));
        };
        let Some(label) = ratio_label(&raw) else {
            warn!(value = %raw, "ratio slider value is not a finite number");
            return (Outcome::Skipped, Some(format!("unparseable ratio `{raw}`")));
        };
        if dom.set_text(&selectors.ratio_value, &label) {
            (Outcome::Applied, Some(label))
        } else {
            (Outcome::Skipped, Some("ratio label missing".to_string()))
        }
    }

    fn clamp_lengths(&self, dom: &mut impl FormDom, side: LengthSide) -> (Outcome, Option<String>) {
        let selectors = &self.config.selectors;
        let (Some(min_raw), Some(max_raw)) = (
            dom.value(&selectors.min_length),
            dom.value(&selectors.max_length),
        ) else {
            return (Outcome::Skipped, Some("length field missing".to_string()));
        };
        let Some(current) = LengthPair::parse(&min_raw, &max_raw) else {
            return (
                Outcome::Unchanged,
                Some(format!("unreadable lengths min=`{min_raw}` max=`{max_raw}`")),
            );
        };

        let next = match side {
            LengthSide::Min => clamp_after_min_change(current),
            LengthSide::Max => clamp_after_max_change(current),
        };
        if next == current {
            return (Outcome::Unchanged, None);
        }

        let (selector, field, value) = match side {
            LengthSide::Min => (&selectors.max_length, "max", next.max),
            LengthSide::Max => (&selectors.min_length, "min", next.min),
        };
        if dom.set_value(selector, &value.to_string()) {
            (Outcome::Applied, Some(format!("{field}={value}")))
        } else {
            (Outcome::Skipped, Some(format!("{field} field missing")))
        }
    }

    fn request_copy(
        &self,
        dom: &mut impl FormDom,
        effects: &mut Vec<Effect>,
    ) -> (Outcome, Option<String>) {
        let selector = &self.config.selectors.summary_text;
        let Some(text) = dom.text(selector) else {
            warn!(selector = %selector, "no summary to copy");
            return (Outcome::Skipped, Some("summary missing".to_string()));
        };
        let detail = format!("chars={}", text.chars().count());
        effects.push(Effect::WriteClipboard { text });
        (Outcome::Applied, Some(detail))
    }

    fn request_download(
        &self,
        dom: &mut impl FormDom,
        effects: &mut Vec<Effect>,
    ) -> (Outcome, Option<String>) {
        let selector = &self.config.selectors.summary_text;
        let Some(text) = dom.text(selector) else {
            trace!(selector = %selector, "no summary to download");
            return (Outcome::Skipped, Some("summary missing".to_string()));
        };
        let download = SummaryDownload::new(text, &self.config);
        let detail = download.file_name.clone();
        effects.push(Effect::Download(download));
        (Outcome::Applied, Some(detail))
    }
}

#[derive(Debug, Clone, Copy)]
enum LengthSide {
    Min,
    Max,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::MemoryDom;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn controller() -> FormController {
        FormController::new(ControllerConfig::default())
    }

    #[test]
    fn initialize_syncs_ratio_label_eagerly() {
        let mut dom = MemoryDom::summarizer_page();
        dom.set_value("#ratio", "0.45");
        let mut controller = controller();
        let table = controller.initialize(&mut dom);
        assert_eq!(table.len(), 8);
        assert_eq!(dom.text_of("#ratio-value"), Some("45%"));
    }

    #[test]
    fn initialize_without_slider_leaves_label() {
        let mut dom = MemoryDom::summarizer_page();
        dom.remove("#ratio");
        let mut controller = controller();
        let table = controller.initialize(&mut dom);
        assert!(!table.contains(Action::SyncRatioLabel));
        assert_eq!(dom.text_of("#ratio-value"), Some(""));
    }

    #[test]
    fn show_loader_needs_both_elements() {
        let mut dom = MemoryDom::summarizer_page();
        dom.remove("#loader");
        let mut controller = controller();
        controller.dispatch(Action::ShowLoader, &mut dom);
        assert!(!dom.is_disabled("#submit-btn"));

        let log = controller.drain_log();
        assert_eq!(log.last().map(|r| r.outcome), Some(Outcome::Skipped));
    }

    #[test]
    fn clamp_from_min_writes_only_max() {
        let mut dom = MemoryDom::summarizer_page();
        dom.set_value("#min-length", "50");
        dom.set_value("#max-length", "40");
        let mut controller = controller();
        let effects = controller.dispatch(Action::ClampFromMin, &mut dom);
        assert!(effects.is_empty());
        assert_eq!(dom.value_of("#min-length"), Some("50"));
        assert_eq!(dom.value_of("#max-length"), Some("60"));
    }

    #[test]
    fn clamp_ignores_non_numeric_lengths() {
        let mut dom = MemoryDom::summarizer_page();
        dom.set_value("#min-length", "abc");
        dom.set_value("#max-length", "5");
        let mut controller = controller();
        controller.dispatch(Action::ClampFromMax, &mut dom);
        assert_eq!(dom.value_of("#min-length"), Some("abc"));
        assert_eq!(dom.value_of("#max-length"), Some("5"));

        let record = controller.drain_log().pop().unwrap();
        assert_eq!(record.action, "clamp_from_max");
        assert_eq!(record.outcome, Outcome::Unchanged);
    }

    #[test]
    fn copy_requests_clipboard_write() {
        let mut dom = MemoryDom::summarizer_page();
        dom.set_text(".summary-text p", "Short summary.");
        let mut controller = controller();
        let effects = controller.dispatch(Action::CopySummary, &mut dom);
        assert_eq!(
            effects,
            vec![Effect::WriteClipboard {
                text: "Short summary.".to_string()
            }]
        );
        assert_eq!(controller.copy_state(), CopyButtonState::Idle);
    }

    #[test]
    fn copy_without_summary_is_a_no_op() {
        let mut dom = MemoryDom::summarizer_page();
        dom.remove(".summary-text p");
        let mut controller = controller();
        assert!(controller.dispatch(Action::CopySummary, &mut dom).is_empty());
        assert!(controller.dispatch(Action::DownloadSummary, &mut dom).is_empty());
    }

    #[test]
    fn clipboard_success_schedules_revert() {
        let mut dom = MemoryDom::summarizer_page();
        let mut controller = controller();
        let effects = controller.clipboard_resolved(Ok(()), &mut dom);
        let [Effect::ScheduleRevert(timer)] = effects.as_slice() else {
            panic!("expected a single schedule, got {effects:?}");
        };
        assert_eq!(timer.delay, Duration::from_millis(2000));
        assert_eq!(
            dom.inner_html_of("#copy-btn"),
            Some(r#"<i class="fas fa-check"></i> Copied!"#)
        );

        assert!(controller.revert_timer_fired(*timer, &mut dom));
        assert_eq!(
            dom.inner_html_of("#copy-btn"),
            Some(r#"<i class="fas fa-copy"></i> Copy"#)
        );
    }

    #[traced_test]
    #[test]
    fn clipboard_failure_is_reported_not_shown() {
        let mut dom = MemoryDom::summarizer_page();
        let before = dom.inner_html_of("#copy-btn").map(str::to_string);
        let mut controller = controller();
        let effects = controller.clipboard_resolved(Err("NotAllowedError".to_string()), &mut dom);
        assert_eq!(
            effects,
            vec![Effect::ReportError {
                message: "Failed to copy text: NotAllowedError".to_string()
            }]
        );
        assert_eq!(dom.inner_html_of("#copy-btn").map(str::to_string), before);
        assert_eq!(controller.copy_state(), CopyButtonState::Idle);
        assert!(logs_contain("clipboard write rejected"));
    }

    #[test]
    fn download_uses_configured_file() {
        let config = ControllerConfig::from_json(
            r#"{"download": {"file_name": "notes.md", "mime_type": "text/markdown"}}"#,
        )
        .unwrap();
        let mut dom = MemoryDom::summarizer_page();
        dom.set_text(".summary-text p", "# Title");
        let mut controller = FormController::new(config);
        let effects = controller.dispatch(Action::DownloadSummary, &mut dom);
        assert_eq!(
            effects,
            vec![Effect::Download(SummaryDownload {
                file_name: "notes.md".to_string(),
                mime_type: "text/markdown".to_string(),
                contents: "# Title".to_string(),
            })]
        );
    }
}
