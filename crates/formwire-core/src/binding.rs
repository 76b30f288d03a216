#![forbid(unsafe_code)]

//! The binding table: which DOM event on which element runs which action.
//!
//! The table is built once from a [`DomContract`] and then resolved against a
//! document. Resolution drops every binding whose required elements are
//! missing, so hosts only attach listeners that can do something.

use serde::{Deserialize, Serialize};

use crate::config::DomContract;
use crate::dom::FormDom;

/// DOM event types the controller listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomEvent {
    Submit,
    /// Committed value change (blur / enter / select).
    Change,
    /// Every value change while the user drags or types.
    Input,
    Click,
}

impl DomEvent {
    /// Event type string passed to `addEventListener`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Change => "change",
            Self::Input => "input",
            Self::Click => "click",
        }
    }
}

/// One controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ShowLoader,
    ShowFileName,
    ToggleMethodPanels,
    SyncRatioLabel,
    ClampFromMin,
    ClampFromMax,
    CopySummary,
    DownloadSummary,
}

impl Action {
    pub const ALL: [Self; 8] = [
        Self::ShowLoader,
        Self::ShowFileName,
        Self::ToggleMethodPanels,
        Self::SyncRatioLabel,
        Self::ClampFromMin,
        Self::ClampFromMax,
        Self::CopySummary,
        Self::DownloadSummary,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShowLoader => "show_loader",
            Self::ShowFileName => "show_file_name",
            Self::ToggleMethodPanels => "toggle_method_panels",
            Self::SyncRatioLabel => "sync_ratio_label",
            Self::ClampFromMin => "clamp_from_min",
            Self::ClampFromMax => "clamp_from_max",
            Self::CopySummary => "copy_summary",
            Self::DownloadSummary => "download_summary",
        }
    }
}

/// A single listener registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Element the listener is attached to.
    pub selector: String,
    pub event: DomEvent,
    pub action: Action,
    /// Extra elements that must exist for the listener to be attached.
    pub requires: Vec<String>,
}

impl Binding {
    fn new(selector: &str, event: DomEvent, action: Action) -> Self {
        Self {
            selector: selector.to_string(),
            event,
            action,
            requires: Vec::new(),
        }
    }

    fn requiring(mut self, selector: &str) -> Self {
        self.requires.push(selector.to_string());
        self
    }

    fn is_attachable(&self, dom: &impl FormDom) -> bool {
        dom.exists(&self.selector) && self.requires.iter().all(|s| dom.exists(s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    /// Every binding the page can have, in registration order.
    #[must_use]
    pub fn for_contract(contract: &DomContract) -> Self {
        let bindings = vec![
            Binding::new(&contract.form, DomEvent::Submit, Action::ShowLoader),
            Binding::new(&contract.file_input, DomEvent::Change, Action::ShowFileName),
            Binding::new(&contract.method, DomEvent::Change, Action::ToggleMethodPanels),
            Binding::new(&contract.ratio, DomEvent::Input, Action::SyncRatioLabel),
            Binding::new(&contract.min_length, DomEvent::Change, Action::ClampFromMin)
                .requiring(&contract.max_length),
            Binding::new(&contract.max_length, DomEvent::Change, Action::ClampFromMax)
                .requiring(&contract.min_length),
            Binding::new(&contract.copy_button, DomEvent::Click, Action::CopySummary),
            Binding::new(
                &contract.download_button,
                DomEvent::Click,
                Action::DownloadSummary,
            ),
        ];
        Self { bindings }
    }

    /// Keep only bindings whose element (and required peers) exist.
    #[must_use]
    pub fn resolve(&self, dom: &impl FormDom) -> Self {
        let bindings = self
            .bindings
            .iter()
            .filter(|binding| binding.is_attachable(dom))
            .cloned()
            .collect();
        Self { bindings }
    }

    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    #[must_use]
    pub fn contains(&self, action: Action) -> bool {
        self.bindings.iter().any(|binding| binding.action == action)
    }

    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        self.bindings.iter().map(|binding| binding.action).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
