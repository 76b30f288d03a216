#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the form controller.
//!
//! This module wraps [`formwire_core::FormController`] around a live document:
//! it attaches one listener per resolved binding, and performs the effects
//! the controller returns (clipboard writes, revert timers, downloads,
//! console diagnostics). Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use formwire_core::{
    Action, ControllerConfig, CopyButtonState, Effect, FormController, FormDefaults, RevertTimer,
    SummaryDownload,
};
use js_sys::{Array, Promise, Reflect};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Blob, BlobPropertyBag, Document, Event, EventTarget, HtmlAnchorElement, Url};

use crate::dom::DocumentDom;

/// Diagnostic channel for failures the user never sees.
fn console_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

/// Route panics to the console once per module instance.
fn install_panic_hook() {
    static HOOK: std::sync::Once = std::sync::Once::new();
    HOOK.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let payload = info.payload();
            let message = payload
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("non-string panic payload");
            let origin = info
                .location()
                .map(|loc| format!(" ({}:{})", loc.file(), loc.line()))
                .unwrap_or_default();
            console_error(&format!("form controller panicked{origin}: {message}"));
        }));
    });
}

fn js_array_from_strings<S: AsRef<str>>(items: &[S]) -> Array {
    let arr = Array::new_with_length(items.len() as u32);
    for (idx, item) in items.iter().enumerate() {
        arr.set(idx as u32, JsValue::from_str(item.as_ref()));
    }
    arr
}

/// Best-effort message for a rejected promise or thrown value.
fn js_error_message(err: &JsValue) -> String {
    if let Some(msg) = err.as_string() {
        return msg;
    }
    if let Ok(message) = Reflect::get(err, &"message".into()) {
        if let Some(message) = message.as_string() {
            return message;
        }
    }
    format!("{err:?}")
}

/// Parse host options (`undefined`, `null` or a plain object) into config.
fn parse_options(options: &JsValue) -> Result<ControllerConfig, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(ControllerConfig::default());
    }
    let json = js_sys::JSON::stringify(options)?;
    let json: String = json.into();
    ControllerConfig::from_json(&json).map_err(|err| JsValue::from_str(&err.to_string()))
}

struct PendingRevert {
    timer: RevertTimer,
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

struct Session {
    controller: FormController,
    dom: DocumentDom,
    pending_revert: Option<PendingRevert>,
    /// Last fired timer; kept until the next schedule so a closure is never
    /// dropped while it runs.
    spent_revert: Option<PendingRevert>,
}

type SharedSession = Rc<RefCell<Session>>;

fn dispatch(session: &SharedSession, action: Action) {
    let effects = {
        let mut guard = session.borrow_mut();
        let Session {
            controller, dom, ..
        } = &mut *guard;
        controller.dispatch(action, dom)
    };
    run_effects(session, effects);
}

fn run_effects(session: &SharedSession, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::WriteClipboard { text } => write_clipboard(session, text),
            Effect::ScheduleRevert(timer) => schedule_revert(session, timer),
            Effect::CancelRevert(timer) => cancel_revert(session, timer),
            Effect::Download(download) => {
                let document = session.borrow().dom.document().clone();
                if let Err(err) = offer_download(&document, &download) {
                    warn!(error = %js_error_message(&err), "summary download failed");
                }
            }
            Effect::ReportError { message } => console_error(&message),
        }
    }
}

fn clipboard_write_promise(text: &str) -> Result<Promise, JsValue> {
    let global = js_sys::global();
    let navigator = Reflect::get(&global, &"navigator".into())?;
    let clipboard = Reflect::get(&navigator, &"clipboard".into())?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return Err(JsValue::from_str("clipboard API is unavailable"));
    }
    let write_text = Reflect::get(&clipboard, &"writeText".into())?.dyn_into::<js_sys::Function>()?;
    write_text
        .call1(&clipboard, &JsValue::from_str(text))?
        .dyn_into::<Promise>()
        .map_err(JsValue::from)
}

fn write_clipboard(session: &SharedSession, text: String) {
    let session = Rc::clone(session);
    spawn_local(async move {
        let result = match clipboard_write_promise(&text) {
            Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
            Err(err) => Err(err),
        }
        .map_err(|err| js_error_message(&err));

        let effects = {
            let mut guard = session.borrow_mut();
            let Session {
                controller, dom, ..
            } = &mut *guard;
            controller.clipboard_resolved(result, dom)
        };
        run_effects(&session, effects);
    });
}

fn schedule_revert(session: &SharedSession, timer: RevertTimer) {
    let Some(window) = web_sys::window() else {
        warn!("no window; reverting copy label immediately");
        revert_fired(session, timer);
        return;
    };
    let weak: Weak<RefCell<Session>> = Rc::downgrade(session);
    let callback = Closure::<dyn FnMut()>::new(move || {
        if let Some(session) = weak.upgrade() {
            revert_fired(&session, timer);
        }
    });
    let delay_ms = i32::try_from(timer.delay.as_millis()).unwrap_or(i32::MAX);
    let handle = match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        delay_ms,
    ) {
        Ok(handle) => handle,
        Err(err) => {
            warn!(
                error = %js_error_message(&err),
                "failed to schedule copy label revert; reverting immediately"
            );
            revert_fired(session, timer);
            return;
        }
    };
    let replaced = session.borrow_mut().pending_revert.replace(PendingRevert {
        timer,
        handle,
        _callback: callback,
    });
    if let Some(replaced) = replaced {
        window.clear_timeout_with_handle(replaced.handle);
    }
}

fn cancel_revert(session: &SharedSession, timer: RevertTimer) {
    let cancelled = {
        let mut guard = session.borrow_mut();
        let matches = guard
            .pending_revert
            .as_ref()
            .is_some_and(|pending| pending.timer.generation == timer.generation);
        if matches {
            guard.pending_revert.take()
        } else {
            None
        }
    };
    if let (Some(cancelled), Some(window)) = (cancelled, web_sys::window()) {
        window.clear_timeout_with_handle(cancelled.handle);
        debug!(generation = timer.generation, "cancelled copy label revert");
    }
}

fn revert_fired(session: &SharedSession, timer: RevertTimer) {
    let mut guard = session.borrow_mut();
    let Session {
        controller,
        dom,
        pending_revert,
        spent_revert,
    } = &mut *guard;
    if pending_revert
        .as_ref()
        .is_some_and(|pending| pending.timer.generation == timer.generation)
    {
        *spent_revert = pending_revert.take();
    }
    controller.revert_timer_fired(timer, dom);
}

fn offer_download(document: &Document, download: &SummaryDownload) -> Result<(), JsValue> {
    let parts = Array::of1(&JsValue::from_str(&download.contents));
    let options = BlobPropertyBag::new();
    options.set_type(&download.mime_type);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;
    let clicked = click_download_anchor(document, &url, &download.file_name);
    Url::revoke_object_url(&url)?;
    clicked
}

fn click_download_anchor(document: &Document, url: &str, file_name: &str) -> Result<(), JsValue> {
    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()?;
    anchor.set_href(url);
    anchor.set_download(file_name);
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document body is unavailable"))?;
    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();
    Ok(())
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Live controller attached to a document.
///
/// Listeners stay attached until [`FormControllerHandle::dispose`] is called
/// or the handle is freed.
#[wasm_bindgen]
pub struct FormControllerHandle {
    session: SharedSession,
    listeners: Vec<Listener>,
    actions: Vec<Action>,
}

impl FormControllerHandle {
    fn attach(document: Document, config: ControllerConfig) -> Result<Self, JsValue> {
        let mut dom = DocumentDom::new(document);
        let mut controller = FormController::new(config);
        let table = controller.initialize(&mut dom);
        let session = Rc::new(RefCell::new(Session {
            controller,
            dom,
            pending_revert: None,
            spent_revert: None,
        }));

        let mut handle = Self {
            session,
            listeners: Vec::with_capacity(table.len()),
            actions: Vec::with_capacity(table.len()),
        };
        for binding in table.bindings() {
            let Some(target) = handle.session.borrow().dom.query(&binding.selector) else {
                continue;
            };
            let weak = Rc::downgrade(&handle.session);
            let action = binding.action;
            let callback = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                if let Some(session) = weak.upgrade() {
                    dispatch(&session, action);
                }
            });
            let event = binding.event.as_str();
            target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
            handle.listeners.push(Listener {
                target: target.into(),
                event,
                callback,
            });
            handle.actions.push(action);
        }
        debug!(listeners = handle.listeners.len(), "form controller attached");
        Ok(handle)
    }

    fn detach(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        self.actions.clear();
        let pending = self.session.borrow_mut().pending_revert.take();
        if let (Some(pending), Some(window)) = (pending, web_sys::window()) {
            window.clear_timeout_with_handle(pending.handle);
        }
    }
}

impl Drop for FormControllerHandle {
    fn drop(&mut self) {
        self.detach();
    }
}

#[wasm_bindgen]
impl FormControllerHandle {
    /// Names of the actions that received a listener, in binding order.
    #[wasm_bindgen(js_name = boundActions)]
    pub fn bound_actions(&self) -> Array {
        let names: Vec<&str> = self.actions.iter().map(|action| action.as_str()).collect();
        js_array_from_strings(&names)
    }

    /// Drain the interaction log as JSON lines.
    #[wasm_bindgen(js_name = drainLogs)]
    pub fn drain_logs(&self) -> Array {
        let lines: Vec<String> = self
            .session
            .borrow_mut()
            .controller
            .drain_log()
            .iter()
            .map(|record| record.to_jsonl())
            .collect();
        js_array_from_strings(&lines)
    }

    /// `"idle"` or `"copied"`.
    #[wasm_bindgen(js_name = copyState)]
    pub fn copy_state(&self) -> String {
        match self.session.borrow().controller.copy_state() {
            CopyButtonState::Idle => "idle".to_string(),
            CopyButtonState::Copied { .. } => "copied".to_string(),
        }
    }

    /// Remove every listener and clear any pending label revert.
    pub fn dispose(&mut self) {
        self.detach();
    }
}

/// Attach the controller to `document`.
///
/// `options` may be `undefined`, `null` or a plain object matching the
/// controller configuration; unknown keys are rejected.
#[wasm_bindgen]
pub fn initialize(document: Document, options: JsValue) -> Result<FormControllerHandle, JsValue> {
    install_panic_hook();
    let config = parse_options(&options)?;
    FormControllerHandle::attach(document, config)
}

thread_local! {
    static ATTACHED: RefCell<Option<FormControllerHandle>> = const { RefCell::new(None) };
}

fn attach_to_page(document: Document, config: ControllerConfig) -> Result<(), JsValue> {
    let handle = FormControllerHandle::attach(document, config)?;
    ATTACHED.with(|slot| *slot.borrow_mut() = Some(handle));
    Ok(())
}

/// Attach to `window.document` once it has been parsed.
///
/// Registers a one-shot `DOMContentLoaded` listener, or attaches right away
/// when the document is already past the loading state. The handle is kept
/// by the module; call [`detach`] to release it.
#[wasm_bindgen(js_name = attachOnReady)]
pub fn attach_on_ready(options: JsValue) -> Result<(), JsValue> {
    install_panic_hook();
    let config = parse_options(&options)?;
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("document is unavailable"))?;

    let ready_state = Reflect::get(&document, &"readyState".into())?
        .as_string()
        .unwrap_or_default();
    if ready_state != "loading" {
        return attach_to_page(document, config);
    }

    let target = document.clone();
    let on_ready = Closure::once_into_js(move || {
        if let Err(err) = attach_to_page(target, config) {
            console_error(&format!(
                "form controller failed to attach: {}",
                js_error_message(&err)
            ));
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
}

/// Dispose the controller attached by [`attach_on_ready`], if any.
#[wasm_bindgen]
pub fn detach() {
    let handle = ATTACHED.with(|slot| slot.borrow_mut().take());
    drop(handle);
}

/// Default form values of the summarizer page, as a plain object.
#[wasm_bindgen(js_name = formDefaults)]
pub fn form_defaults() -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(&FormDefaults::default())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    js_sys::JSON::parse(&json)
}
