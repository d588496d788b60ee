// =============================================================================
// Numeric coercion — one total conversion for loosely typed upstream numbers
// =============================================================================
//
// Upstream APIs send numbers as JSON numbers, as strings ("134.50"), as
// percentages ("4.56%") or not at all. Every conversion in the crate goes
// through `coerce_f64` / `parse_loose_f64`, which never fail: anything that
// cannot be read as a finite number becomes 0.0.
// =============================================================================

use serde_json::Value;

/// Convert any JSON value to `f64`. Unparseable input yields `0.0`.
pub fn coerce_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_loose_f64(s),
        _ => 0.0,
    }
}

/// Parse text such as `"1.25"`, `" 4.56% "` or `"5,678,900"` into `f64`.
/// Unparseable input yields `0.0`.
pub fn parse_loose_f64(text: &str) -> f64 {
    let cleaned: String = text
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
}

/// Like [`parse_loose_f64`] but distinguishes "no number here".
pub fn try_parse_f64(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Render a JSON value as display text: numeric strings keep their upstream
/// text, numbers use their shortest form, everything else becomes `"0"`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => numeric_text(s),
        Value::Number(_) => format_number(coerce_f64(value)),
        _ => "0".to_string(),
    }
}

/// Trimmed `text` when it reads as a number (`"134.50"`, `"5,678,900"`),
/// otherwise `"0"`.
pub fn numeric_text(text: &str) -> String {
    match try_parse_f64(text) {
        Some(_) => text.trim().to_string(),
        None => "0".to_string(),
    }
}

/// Shortest decimal rendering (`91200`, `0.5`, `-2.34`).
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

/// Fixed two-decimal rendering used for derived prices.
pub fn format_2dp(value: f64) -> String {
    format!("{value:.2}")
}

pub fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_numbers_strings_and_garbage() {
        assert_eq!(coerce_f64(&json!(12)), 12.0);
        assert_eq!(coerce_f64(&json!(-3)), -3.0);
        assert_eq!(coerce_f64(&json!(1.5)), 1.5);
        assert_eq!(coerce_f64(&json!("2600")), 2600.0);
        assert_eq!(coerce_f64(&json!(" 4.56% ")), 4.56);
        assert_eq!(coerce_f64(&json!("5,678,900")), 5_678_900.0);
        assert_eq!(coerce_f64(&json!("n/a")), 0.0);
        assert_eq!(coerce_f64(&json!("")), 0.0);
        assert_eq!(coerce_f64(&json!(null)), 0.0);
        assert_eq!(coerce_f64(&json!(true)), 0.0);
        assert_eq!(coerce_f64(&json!({"a": 1})), 0.0);
        assert_eq!(coerce_f64(&json!([1, 2])), 0.0);
    }

    #[test]
    fn non_finite_text_is_zero() {
        assert_eq!(parse_loose_f64("NaN"), 0.0);
        assert_eq!(parse_loose_f64("inf"), 0.0);
    }

    #[test]
    fn try_parse_distinguishes_missing() {
        assert_eq!(try_parse_f64("<nil>"), None);
        assert_eq!(try_parse_f64("  "), None);
        assert_eq!(try_parse_f64("0"), Some(0.0));
        assert_eq!(try_parse_f64("-0.54%"), Some(-0.54));
    }

    #[test]
    fn display_keeps_strings_and_shortens_numbers() {
        assert_eq!(display_value(&json!("134.50")), "134.50");
        assert_eq!(display_value(&json!(91200)), "91200");
        assert_eq!(display_value(&json!(91200.0)), "91200");
        assert_eq!(display_value(&json!(-0.5)), "-0.5");
        assert_eq!(display_value(&json!(null)), "0");
    }

    #[test]
    fn malformed_text_displays_as_zero() {
        assert_eq!(display_value(&json!("n/a")), "0");
        assert_eq!(display_value(&json!("")), "0");
        assert_eq!(display_value(&json!("NaN")), "0");
        assert_eq!(numeric_text(" 5,678,900 "), "5,678,900");
        assert_eq!(numeric_text("<nil>"), "0");
    }

    #[test]
    fn two_decimal_helpers() {
        assert_eq!(format_2dp(199.5), "199.50");
        assert_eq!(round_2dp(1.23456), 1.23);
        assert_eq!(round_2dp(0.005), 0.01);
    }
}
