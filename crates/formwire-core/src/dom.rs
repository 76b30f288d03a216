#![forbid(unsafe_code)]

//! The edge between the controller and a document.
//!
//! Elements are addressed by CSS selector and the first match wins, the way
//! `querySelector` resolves. Writers return `false` when the selector
//! matched nothing so callers can log a skipped write.

/// Read/write access to the handful of element properties the form needs.
pub trait FormDom {
    /// Whether the selector matches at least one element.
    fn exists(&self, selector: &str) -> bool;

    /// Current `value` of an input or select element.
    fn value(&self, selector: &str) -> Option<String>;

    fn set_value(&mut self, selector: &str, value: &str) -> bool;

    /// Text content of the element.
    fn text(&self, selector: &str) -> Option<String>;

    fn set_text(&mut self, selector: &str, text: &str) -> bool;

    /// Add (`hidden = true`) or remove the given visibility class.
    fn set_hidden(&mut self, selector: &str, class: &str, hidden: bool) -> bool;

    fn set_disabled(&mut self, selector: &str, disabled: bool) -> bool;

    fn set_inner_html(&mut self, selector: &str, html: &str) -> bool;

    /// Name of the first file selected in a file input.
    ///
    /// `None` when the element is missing or nothing is selected.
    fn first_file_name(&self, selector: &str) -> Option<String>;
}
