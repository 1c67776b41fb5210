//! Quantity grammars, tried in order against the start of a normalized line:
//! mixed number, range, simple fraction, then decimal/integer.

use crate::model::Quantity;
use regex::Regex;
use std::sync::LazyLock;

static MIXED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(\d+)\s*/\s*(\d+)").unwrap());

static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?(?:/\d+)?)(?:\s*[-–]\s*|\s+to\s+)(\d+(?:\.\d+)?(?:/\d+)?)")
        .unwrap()
});

static FRACTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\s*/\s*(\d+)").unwrap());

// A comma decimal ("1,5") takes at most two digits so "1,000" stays a thousand
// separator and only the leading "1" matches.
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+|,\d{1,2}\b)?").unwrap());

/// Extract a leading quantity. Returns the quantity (if any) and the rest of
/// the text with the matched prefix and following whitespace removed. When
/// nothing parses, the input is returned untouched.
pub fn extract_quantity(text: &str) -> (Option<Quantity>, &str) {
    match match_quantity(text) {
        Some((quantity, end)) => (Some(quantity), text[end..].trim_start()),
        None => (None, text),
    }
}

/// Parse a string that must consist of a quantity and nothing else.
pub fn parse_quantity(text: &str) -> Option<Quantity> {
    match extract_quantity(text.trim()) {
        (Some(quantity), rest) if rest.is_empty() => Some(quantity),
        _ => None,
    }
}

// The first grammar that matches decides the outcome; a zero denominator makes
// the whole line quantity-less rather than falling through to a shorter match.
fn match_quantity(text: &str) -> Option<(Quantity, usize)> {
    if let Some(caps) = MIXED_NUMBER.captures(text) {
        let whole: f64 = caps[1].parse().ok()?;
        let fraction = divide(&caps[2], &caps[3])?;
        return Some((Quantity::Value(whole + fraction), caps[0].len()));
    }

    if let Some(caps) = RANGE.captures(text) {
        let (low, high) = (&caps[1], &caps[2]);
        number_value(low)?;
        number_value(high)?;
        return Some((Quantity::Range(format!("{}-{}", low, high)), caps[0].len()));
    }

    if let Some(caps) = FRACTION.captures(text) {
        let value = divide(&caps[1], &caps[2])?;
        return Some((Quantity::Value(value), caps[0].len()));
    }

    let m = DECIMAL.find(text)?;
    if text[m.end()..].starts_with('/') {
        return None;
    }
    let value: f64 = m.as_str().replace(',', ".").parse().ok()?;
    Some((Quantity::Value(value), m.end()))
}

fn divide(numerator: &str, denominator: &str) -> Option<f64> {
    let numerator: f64 = numerator.parse().ok()?;
    let denominator: f64 = denominator.parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

fn number_value(text: &str) -> Option<f64> {
    match text.split_once('/') {
        Some((numerator, denominator)) => divide(numerator, denominator),
        None => text.parse().ok(),
    }
}
