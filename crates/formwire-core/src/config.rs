#![forbid(unsafe_code)]

//! Controller configuration.
//!
//! Every field has a default matching the summarizer page, so an empty JSON
//! object (or no options at all) yields a working controller. Unknown keys
//! are rejected to catch typos in host-supplied options.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default revert delay for the copy button label.
pub const DEFAULT_COPY_REVERT_MS: u32 = 2000;
/// Default interaction log capacity.
pub const DEFAULT_LOG_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse controller config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid controller config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Selectors the controller binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DomContract {
    pub form: String,
    pub submit_button: String,
    pub loader: String,
    pub file_input: String,
    pub file_name: String,
    pub method: String,
    pub extractive_options: String,
    pub abstractive_options: String,
    pub ratio: String,
    pub ratio_value: String,
    pub min_length: String,
    pub max_length: String,
    pub copy_button: String,
    pub download_button: String,
    pub summary_text: String,
}

impl Default for DomContract {
    fn default() -> Self {
        Self {
            form: "form".to_string(),
            submit_button: "#submit-btn".to_string(),
            loader: "#loader".to_string(),
            file_input: "#file-input".to_string(),
            file_name: "#file-name".to_string(),
            method: "#method".to_string(),
            extractive_options: ".extractive-options".to_string(),
            abstractive_options: ".abstractive-options".to_string(),
            ratio: "#ratio".to_string(),
            ratio_value: "#ratio-value".to_string(),
            min_length: "#min-length".to_string(),
            max_length: "#max-length".to_string(),
            copy_button: "#copy-btn".to_string(),
            download_button: "#download-btn".to_string(),
            summary_text: ".summary-text p".to_string(),
        }
    }
}

impl DomContract {
    fn entries(&self) -> [(&'static str, &str); 15] {
        [
            ("selectors.form", &self.form),
            ("selectors.submit_button", &self.submit_button),
            ("selectors.loader", &self.loader),
            ("selectors.file_input", &self.file_input),
            ("selectors.file_name", &self.file_name),
            ("selectors.method", &self.method),
            ("selectors.extractive_options", &self.extractive_options),
            ("selectors.abstractive_options", &self.abstractive_options),
            ("selectors.ratio", &self.ratio),
            ("selectors.ratio_value", &self.ratio_value),
            ("selectors.min_length", &self.min_length),
            ("selectors.max_length", &self.max_length),
            ("selectors.copy_button", &self.copy_button),
            ("selectors.download_button", &self.download_button),
            ("selectors.summary_text", &self.summary_text),
        ]
    }
}

/// Inner HTML of the copy button in each state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyLabels {
    pub idle_html: String,
    pub copied_html: String,
}

impl Default for CopyLabels {
    fn default() -> Self {
        Self {
            idle_html: r#"<i class="fas fa-copy"></i> Copy"#.to_string(),
            copied_html: r#"<i class="fas fa-check"></i> Copied!"#.to_string(),
        }
    }
}

/// File offered by the download button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadConfig {
    pub file_name: String,
    pub mime_type: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            file_name: "summary.txt".to_string(),
            mime_type: "text/plain".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    pub selectors: DomContract,
    /// Class toggled to hide the loader and option panels.
    pub hidden_class: String,
    pub copy_revert_ms: u32,
    pub copy_labels: CopyLabels,
    pub download: DownloadConfig,
    pub log_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            selectors: DomContract::default(),
            hidden_class: "hidden".to_string(),
            copy_revert_ms: DEFAULT_COPY_REVERT_MS,
            copy_labels: CopyLabels::default(),
            download: DownloadConfig::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl ControllerConfig {
    /// Parse and validate a JSON options document.
    ///
    /// Blank input and `null` both give the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let trimmed = json.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(trimmed)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, selector) in self.selectors.entries() {
            if selector.trim().is_empty() {
                return Err(invalid(field, "selector must not be empty"));
            }
        }
        if self.hidden_class.is_empty() || self.hidden_class.contains(char::is_whitespace) {
            return Err(invalid(
                "hidden_class",
                "must be a single non-empty class name",
            ));
        }
        if self.copy_revert_ms == 0 {
            return Err(invalid("copy_revert_ms", "must be greater than zero"));
        }
        if self.copy_labels.idle_html.is_empty() {
            return Err(invalid("copy_labels.idle_html", "must not be empty"));
        }
        if self.copy_labels.copied_html.is_empty() {
            return Err(invalid("copy_labels.copied_html", "must not be empty"));
        }
        let file_name = &self.download.file_name;
        if file_name.trim().is_empty() {
            return Err(invalid("download.file_name", "must not be empty"));
        }
        if file_name.contains(['/', '\\']) {
            return Err(invalid(
                "download.file_name",
                format!("`{file_name}` must not contain path separators"),
            ));
        }
        if self.download.mime_type.trim().is_empty() {
            return Err(invalid("download.mime_type", "must not be empty"));
        }
        if self.log_capacity == 0 {
            return Err(invalid("log_capacity", "must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_page_contract() {
        let config = ControllerConfig::default();
        assert_eq!(config.selectors.form, "form");
        assert_eq!(config.selectors.summary_text, ".summary-text p");
        assert_eq!(config.copy_revert_ms, 2000);
        assert_eq!(config.download.file_name, "summary.txt");
        assert_eq!(config.download.mime_type, "text/plain");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_and_null_give_defaults() {
        assert_eq!(
            ControllerConfig::from_json("").unwrap(),
            ControllerConfig::default()
        );
        assert_eq!(
            ControllerConfig::from_json(" null ").unwrap(),
            ControllerConfig::default()
        );
        assert_eq!(
            ControllerConfig::from_json("{}").unwrap(),
            ControllerConfig::default()
        );
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = ControllerConfig::from_json(
            r##"{"copy_revert_ms": 500, "selectors": {"copy_button": "#copy"}}"##,
        )
        .unwrap();
        assert_eq!(config.copy_revert_ms, 500);
        assert_eq!(config.selectors.copy_button, "#copy");
        assert_eq!(config.selectors.download_button, "#download-btn");
        assert_eq!(config.hidden_class, "hidden");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ControllerConfig::from_json(r#"{"copy_revert": 500}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn invalid_values_name_the_field() {
        let cases = [
            (r#"{"copy_revert_ms": 0}"#, "copy_revert_ms"),
            (r#"{"log_capacity": 0}"#, "log_capacity"),
            (r#"{"hidden_class": "is hidden"}"#, "hidden_class"),
            (r#"{"selectors": {"ratio": "  "}}"#, "selectors.ratio"),
            (
                r#"{"download": {"file_name": "../summary.txt"}}"#,
                "download.file_name",
            ),
            (r#"{"download": {"mime_type": ""}}"#, "download.mime_type"),
            (
                r#"{"copy_labels": {"copied_html": ""}}"#,
                "copy_labels.copied_html",
            ),
        ];
        for (json, expected) in cases {
            match ControllerConfig::from_json(json) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected, "{json}"),
                other => panic!("expected invalid {expected} for {json}, got {other:?}"),
            }
        }
    }

    #[test]
    fn error_messages_are_readable() {
        let err = ControllerConfig::from_json(r#"{"copy_revert_ms": 0}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid controller config field `copy_revert_ms`: must be greater than zero"
        );
    }
}
