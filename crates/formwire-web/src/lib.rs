#![forbid(unsafe_code)]

//! Browser frontend for the summarizer form controller.
//!
//! This crate provides [`initialize`] and [`attach_on_ready`], `wasm-bindgen`
//! exports that bind [`formwire_core::FormController`] to a live document.
//! All behavior lives in `formwire-core`; this crate only reads and writes
//! elements and calls browser capabilities (clipboard, timers, blob URLs).
//!
//! On non-wasm targets the crate re-exports the configuration types so hosts
//! can build and validate options natively.

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{FormControllerHandle, attach_on_ready, detach, form_defaults, initialize};

pub use formwire_core::{ConfigError, ControllerConfig, FormDefaults};

/// Validate a JSON options document the way [`initialize`] does.
///
/// Returns the normalized configuration serialized back to JSON, with every
/// default filled in.
pub fn normalize_options(json: &str) -> Result<String, ConfigError> {
    let config = ControllerConfig::from_json(json)?;
    Ok(serde_json::to_string(&config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_fills_defaults() {
        let normalized = normalize_options(r#"{"copy_revert_ms": 750}"#).unwrap();
        let config = ControllerConfig::from_json(&normalized).unwrap();
        assert_eq!(config.copy_revert_ms, 750);
        assert_eq!(config.selectors.copy_button, "#copy-btn");
        assert_eq!(config.download.file_name, "summary.txt");
    }

    #[test]
    fn normalize_rejects_invalid_options() {
        let err = normalize_options(r#"{"download": {"file_name": ""}}"#).unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { field: "download.file_name", .. }),
            "{err}"
        );
    }

    #[test]
    fn normalize_accepts_empty_input() {
        let normalized = normalize_options("").unwrap();
        assert_eq!(
            ControllerConfig::from_json(&normalized).unwrap(),
            ControllerConfig::default()
        );
    }
}
