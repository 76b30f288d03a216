#![forbid(unsafe_code)]

//! `formwire-core` is the platform-independent half of the summarizer form
//! controller.
//!
//! Design goals:
//! - **Host-driven**: the embedding environment resolves the binding table,
//!   forwards DOM events as [`Action`]s and performs the returned
//!   [`Effect`]s.
//! - **Pure rules**: clamp, percentage, panel and label logic live in
//!   [`rules`] and never touch a document.
//! - **No JS types**: everything here runs and tests natively. The
//!   `formwire-web` crate binds it to a browser document.

pub mod binding;
pub mod config;
pub mod controller;
pub mod copy_button;
pub mod dom;
pub mod harness;
pub mod log;
pub mod rules;

pub use binding::{Action, Binding, BindingTable, DomEvent};
pub use config::{ConfigError, ControllerConfig, CopyLabels, DomContract, DownloadConfig};
pub use controller::{Effect, FormController, SummaryDownload};
pub use copy_button::{CopyButtonState, RevertTimer};
pub use dom::FormDom;
pub use log::{InteractionRecord, Outcome};
pub use rules::{FormDefaults, LENGTH_BUFFER, LengthPair};
