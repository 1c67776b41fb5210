//! Validation and coercion of the model's JSON answer.

use crate::cleaner::BOILERPLATE_PHRASES;
use crate::error::ParserError;
use crate::model::Quantity;
use crate::quantity::parse_quantity;
use crate::resolver::lookup_key;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").unwrap());

const DROPPED_MODIFIER_PREFIXES: &[&str] = &["or ", "about "];

/// The model's answer after validation, before knowledge-base resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ModelIngredient {
    pub ingredient: String,
    pub quantity: Option<Quantity>,
    pub unit: Option<String>,
    pub modifiers: Vec<String>,
}

/// Decode a raw model answer. It must be a JSON object (optionally wrapped in
/// a Markdown code fence) with a string `ingredient`; every other field is
/// coerced leniently.
pub fn validate_response(raw: &str) -> Result<ModelIngredient, ParserError> {
    let trimmed = raw.trim();
    let body = CODE_FENCE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str());

    let value: Value = serde_json::from_str(body).map_err(|e| {
        ParserError::ProviderMalformedResponse(format!("model output is not JSON: {}", e))
    })?;

    let object = value.as_object().ok_or_else(|| {
        ParserError::ProviderMalformedResponse("model output is not a JSON object".to_string())
    })?;

    let ingredient = object
        .get("ingredient")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ParserError::ProviderMalformedResponse(
                "model output has no string \"ingredient\" field".to_string(),
            )
        })?;

    let unit = object
        .get("unit")
        .and_then(Value::as_str)
        .map(lookup_key)
        .filter(|unit| !unit.is_empty());

    Ok(ModelIngredient {
        ingredient: lookup_key(ingredient),
        quantity: object.get("quantity").and_then(coerce_quantity),
        unit,
        modifiers: filter_modifiers(object.get("modifiers")),
    })
}

/// Numbers stay numbers; strings with a dash or " to " are ranges kept as
/// written; other strings are parsed as numbers, fractions or mixed numbers.
pub fn coerce_quantity(value: &Value) -> Option<Quantity> {
    match value {
        Value::Number(number) => number.as_f64().map(Quantity::Value),
        Value::String(text) => {
            let text = text.trim();
            if text.contains('-') || text.contains('–') || text.contains(" to ") {
                return Some(Quantity::Range(text.to_string()));
            }
            match text.parse::<f64>() {
                Ok(number) if number.is_finite() => Some(Quantity::Value(number)),
                _ => parse_quantity(text),
            }
        }
        _ => None,
    }
}

/// Keep non-empty string modifiers that describe the ingredient, dropping
/// serving notes and alternatives.
pub fn filter_modifiers(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_str)
        .map(lookup_key)
        .filter(|modifier| !modifier.is_empty())
        .filter(|modifier| !BOILERPLATE_PHRASES.contains(&modifier.as_str()))
        .filter(|modifier| {
            !DROPPED_MODIFIER_PREFIXES
                .iter()
                .any(|prefix| modifier.starts_with(prefix))
        })
        .collect()
}
