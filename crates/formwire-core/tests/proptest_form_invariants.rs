//! Property-based invariant tests for the form rules.
//!
//! 1. Min change with min >= max sets max to min + 10
//! 2. Max change with max <= min sets min to max(10, max - 10)
//! 3. Clamps are idempotent
//! 4. Ratio label equals round(r * 100)% at init and after every input
//! 5. Exactly one method panel is visible
//! 6. Arbitrary event sequences never panic and keep one panel visible
//! 7. A committed min never leaves max short of min + 10, at any magnitude

use formwire_core::harness::{HostHarness, MemoryDom};
use formwire_core::rules::{
    LengthPair, MAX_LENGTH_INPUT, MethodPanels, clamp_after_max_change, clamp_after_min_change,
    parse_int, ratio_label, ratio_percent,
};
use formwire_core::{ControllerConfig, LENGTH_BUFFER};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn length() -> impl Strategy<Value = i64> {
    -1_000i64..100_000
}

#[derive(Debug, Clone)]
enum Op {
    Method(String),
    Ratio(u32),
    MinLength(i64),
    MaxLength(i64),
    Copy,
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop_oneof![Just("extractive".to_string()), "[a-z]{0,12}"].prop_map(Op::Method),
        (0u32..=100).prop_map(Op::Ratio),
        length().prop_map(Op::MinLength),
        length().prop_map(Op::MaxLength),
        Just(Op::Copy),
        (0u64..3000).prop_map(Op::Advance),
    ]
}

fn expected_label(hundredths: u32) -> String {
    format!("{hundredths}%")
}

/// Half-up rounding computed from the exact fraction.
fn round_half_up(scaled: f64) -> i64 {
    let whole = scaled.floor();
    let fraction = scaled - whole;
    (if fraction >= 0.5 { whole + 1.0 } else { whole }) as i64
}

// ═══════════════════════════════════════════════════════════════════════
// 1–3. Clamp rules
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn min_change_restores_buffer(min in length(), max in length()) {
        prop_assume!(min >= max);
        let out = clamp_after_min_change(LengthPair::new(min, max));
        prop_assert_eq!(out.min, min);
        prop_assert_eq!(out.max, min + LENGTH_BUFFER);
    }

    #[test]
    fn max_change_floors_min(min in length(), max in length()) {
        prop_assume!(max <= min);
        let out = clamp_after_max_change(LengthPair::new(min, max));
        prop_assert_eq!(out.max, max);
        prop_assert_eq!(out.min, LENGTH_BUFFER.max(max - LENGTH_BUFFER));
    }

    #[test]
    fn clamps_leave_ordered_pairs_alone(min in length(), gap in 1i64..10_000) {
        let pair = LengthPair::new(min, min + gap);
        prop_assert_eq!(clamp_after_min_change(pair), pair);
        prop_assert_eq!(clamp_after_max_change(pair), pair);
    }

    #[test]
    fn min_clamp_is_idempotent(min in length(), max in length()) {
        let once = clamp_after_min_change(LengthPair::new(min, max));
        prop_assert_eq!(clamp_after_min_change(once), once);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4–5. Ratio label and method panels
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ratio_label_matches_percent(hundredths in 0u32..=100) {
        let raw = format!("{}", f64::from(hundredths) / 100.0);
        prop_assert_eq!(ratio_label(&raw), Some(expected_label(hundredths)));
    }

    #[test]
    fn ratio_percent_rounds_any_slider_value(value in 0.0f64..=1.0) {
        let scaled = value * 100.0;
        prop_assert_eq!(ratio_percent(value), Some(round_half_up(scaled)));
        prop_assert_eq!(ratio_percent(value), Some(scaled.round() as i64));
    }

    #[test]
    fn ratio_label_synced_at_init(hundredths in 0u32..=100) {
        let mut dom = MemoryDom::summarizer_page();
        dom.element_mut("#ratio").unwrap().value = format!("{}", f64::from(hundredths) / 100.0);
        let harness = HostHarness::new(ControllerConfig::default(), dom);
        let expected = expected_label(hundredths);
        prop_assert_eq!(harness.dom().text_of("#ratio-value"), Some(expected.as_str()));
    }

    #[test]
    fn exactly_one_panel_visible(method in ".{0,16}") {
        let panels = MethodPanels::for_method(&method);
        prop_assert!(panels.extractive_visible != panels.abstractive_visible);
        prop_assert_eq!(panels.extractive_visible, method == "extractive");
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 6. Event sequences
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn event_sequences_keep_page_consistent(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut dom = MemoryDom::summarizer_page();
        dom.element_mut(".summary-text p").unwrap().text = "summary".to_string();
        let mut harness = HostHarness::new(ControllerConfig::default(), dom);
        let mut method_seen = false;

        for op in ops {
            match op {
                Op::Method(value) => {
                    harness.change_value("#method", &value);
                    method_seen = true;
                }
                Op::Ratio(hundredths) => {
                    harness.input_value("#ratio", &format!("{}", f64::from(hundredths) / 100.0));
                    let expected = expected_label(hundredths);
                    prop_assert_eq!(harness.dom().text_of("#ratio-value"), Some(expected.as_str()));
                }
                Op::MinLength(value) => {
                    let max_before: i64 = harness.dom().value_of("#max-length").unwrap().parse().unwrap();
                    harness.change_value("#min-length", &value.to_string());
                    let max_after: i64 = harness.dom().value_of("#max-length").unwrap().parse().unwrap();
                    if value >= max_before {
                        prop_assert_eq!(max_after, value + LENGTH_BUFFER);
                    } else {
                        prop_assert_eq!(max_after, max_before);
                    }
                }
                Op::MaxLength(value) => {
                    let min_before: i64 = harness.dom().value_of("#min-length").unwrap().parse().unwrap();
                    harness.change_value("#max-length", &value.to_string());
                    let min_after: i64 = harness.dom().value_of("#min-length").unwrap().parse().unwrap();
                    if value <= min_before {
                        prop_assert_eq!(min_after, LENGTH_BUFFER.max(value - LENGTH_BUFFER));
                    } else {
                        prop_assert_eq!(min_after, min_before);
                    }
                }
                Op::Copy => {
                    harness.click("#copy-btn");
                    prop_assert!(harness.pending_timers() <= 1);
                }
                Op::Advance(ms) => harness.advance_ms(ms),
            }

            if method_seen {
                let extractive_hidden = harness.dom().has_class(".extractive-options", "hidden");
                let abstractive_hidden = harness.dom().has_class(".abstractive-options", "hidden");
                prop_assert!(extractive_hidden != abstractive_hidden);
            }
            prop_assert_eq!(
                harness.controller().copy_state() == formwire_core::CopyButtonState::Idle,
                harness.pending_timers() == 0
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 7. Large length inputs
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn committed_min_keeps_buffer_at_any_magnitude(digits in "[1-9][0-9]{0,24}") {
        let mut harness = HostHarness::summarizer_page();
        harness.dom_mut().element_mut("#max-length").unwrap().value = "1".to_string();
        harness.change_value("#min-length", &digits);

        let max_after = harness.dom().value_of("#max-length").unwrap().to_string();
        match parse_int(&digits) {
            Some(min) => {
                prop_assert!(min <= MAX_LENGTH_INPUT);
                prop_assert_eq!(max_after, (min + LENGTH_BUFFER).to_string());
            }
            None => prop_assert_eq!(max_after.as_str(), "1"),
        }
    }
}
