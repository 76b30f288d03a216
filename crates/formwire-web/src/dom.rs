#![forbid(unsafe_code)]

//! [`FormDom`] over a live `web_sys::Document`.
//!
//! `value` and `disabled` go through property reflection so inputs, selects
//! and buttons are handled alike, the same as assigning `el.value` in JS.

use formwire_core::FormDom;
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlInputElement};

pub(crate) struct DocumentDom {
    document: Document,
}

impl DocumentDom {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    /// First element matching `selector`; invalid selectors match nothing.
    pub(crate) fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn set_property(&self, selector: &str, name: &str, value: &JsValue) -> bool {
        self.query(selector)
            .is_some_and(|el| Reflect::set(&el, &JsValue::from_str(name), value).unwrap_or(false))
    }
}

impl FormDom for DocumentDom {
    fn exists(&self, selector: &str) -> bool {
        self.query(selector).is_some()
    }

    fn value(&self, selector: &str) -> Option<String> {
        let el = self.query(selector)?;
        Reflect::get(&el, &JsValue::from_str("value"))
            .ok()?
            .as_string()
    }

    fn set_value(&mut self, selector: &str, value: &str) -> bool {
        self.set_property(selector, "value", &JsValue::from_str(value))
    }

    fn text(&self, selector: &str) -> Option<String> {
        self.query(selector)
            .map(|el| el.text_content().unwrap_or_default())
    }

    fn set_text(&mut self, selector: &str, text: &str) -> bool {
        self.query(selector)
            .map(|el| el.set_text_content(Some(text)))
            .is_some()
    }

    fn set_hidden(&mut self, selector: &str, class: &str, hidden: bool) -> bool {
        self.query(selector)
            .is_some_and(|el| el.class_list().toggle_with_force(class, hidden).is_ok())
    }

    fn set_disabled(&mut self, selector: &str, disabled: bool) -> bool {
        self.set_property(selector, "disabled", &JsValue::from_bool(disabled))
    }

    fn set_inner_html(&mut self, selector: &str, html: &str) -> bool {
        self.query(selector)
            .map(|el| el.set_inner_html(html))
            .is_some()
    }

    fn first_file_name(&self, selector: &str) -> Option<String> {
        let input = self.query(selector)?.dyn_into::<HtmlInputElement>().ok()?;
        input.files()?.get(0).map(|file| file.name())
    }
}
