#![forbid(unsafe_code)]

//! Pure form rules.
//!
//! Every function here maps the current field values to the values the form
//! should show next. DOM reads and writes happen in [`crate::controller`];
//! nothing in this module touches an element.

use serde::{Deserialize, Serialize};

/// Minimum separation enforced between the min-length and max-length fields.
pub const LENGTH_BUFFER: i64 = 10;

/// Method value that selects the extractive option panel.
pub const EXTRACTIVE_METHOD: &str = "extractive";

/// Prefix of the file-name label when a file is selected.
pub const SELECTED_FILE_PREFIX: &str = "Selected: ";

/// Largest magnitude the length fields accept (`Number.MAX_SAFE_INTEGER`).
///
/// Every clamp result stays exact in both `i64` and a browser `Number`.
pub const MAX_LENGTH_INPUT: i64 = (1 << 53) - 1;

/// Leading-integer parse used for the length fields.
///
/// Skips leading whitespace, accepts one optional sign, then a `0x`/`0X`
/// prefix for hex digits or plain decimal digits. Anything after the digits
/// is ignored, so `"42px"` reads as `42` and `"0x20"` as `32`. Returns `None`
/// when no digit follows, or when the magnitude exceeds [`MAX_LENGTH_INPUT`].
#[must_use]
pub fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        _ => (10, unsigned),
    };
    let end = digits
        .find(|ch: char| !ch.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = i64::from_str_radix(&digits[..end], radix)
        .ok()
        .filter(|magnitude| *magnitude <= MAX_LENGTH_INPUT)?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Current contents of the min-length / max-length pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LengthPair {
    pub min: i64,
    pub max: i64,
}

impl LengthPair {
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Parse both raw field values; `None` if either has no leading integer.
    #[must_use]
    pub fn parse(min: &str, max: &str) -> Option<Self> {
        Some(Self::new(parse_int(min)?, parse_int(max)?))
    }
}

/// Apply the rule for a committed change of the min-length field.
///
/// If `min >= max`, max moves up to `min + LENGTH_BUFFER`. The min side
/// is never touched. Exact for every pair [`parse_int`] can produce.
#[must_use]
pub fn clamp_after_min_change(pair: LengthPair) -> LengthPair {
    if pair.min >= pair.max {
        LengthPair {
            min: pair.min,
            max: pair.min.saturating_add(LENGTH_BUFFER),
        }
    } else {
        pair
    }
}

/// Apply the rule for a committed change of the max-length field.
///
/// If `max <= min`, min moves down to `max - LENGTH_BUFFER` but never below
/// the absolute floor `LENGTH_BUFFER`. The floor is not relative to max, so
/// a small max can leave `min > max`.
#[must_use]
pub fn clamp_after_max_change(pair: LengthPair) -> LengthPair {
    if pair.max <= pair.min {
        LengthPair {
            min: LENGTH_BUFFER.max(pair.max.saturating_sub(LENGTH_BUFFER)),
            max: pair.max,
        }
    } else {
        pair
    }
}

/// Slider value to whole percent, rounding halves toward positive infinity.
///
/// The fraction is compared against one half instead of adding `0.5`, which
/// would round values just below a half up.
#[must_use]
pub fn ratio_percent(value: f64) -> Option<i64> {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return None;
    }
    let whole = scaled.floor();
    let rounded = if scaled - whole >= 0.5 {
        whole + 1.0
    } else {
        whole
    };
    Some(rounded as i64)
}

/// Label text for a raw slider value, e.g. `"0.35"` → `"35%"`.
///
/// An empty value reads as zero. Unparseable or non-finite values give
/// `None` and the label is left alone.
#[must_use]
pub fn ratio_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let value = if trimmed.is_empty() {
        0.0
    } else {
        trimmed.parse::<f64>().ok()?
    };
    ratio_percent(value).map(|percent| format!("{percent}%"))
}

/// Visibility of the two method option panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodPanels {
    pub extractive_visible: bool,
    pub abstractive_visible: bool,
}

impl MethodPanels {
    /// Exactly one panel is visible for any method value.
    #[must_use]
    pub fn for_method(method: &str) -> Self {
        let extractive = method == EXTRACTIVE_METHOD;
        Self {
            extractive_visible: extractive,
            abstractive_visible: !extractive,
        }
    }
}

/// Text of the file-name label for the first selected file.
#[must_use]
pub fn file_name_label(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => format!("{SELECTED_FILE_PREFIX}{name}"),
        _ => String::new(),
    }
}

/// Values the summarizer page renders into a fresh form.
///
/// The controller never writes these; hosts that render the form use them
/// so that the first clamp and ratio sync start from consistent values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefaults {
    pub method: String,
    pub ratio: f64,
    pub min_length: i64,
    pub max_length: i64,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            method: "abstractive".to_string(),
            ratio: 0.3,
            min_length: 50,
            max_length: 150,
        }
    }
}
