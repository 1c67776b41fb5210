mod llm;
mod response;
mod rules;

pub use llm::LlmParser;
pub use response::{coerce_quantity, filter_modifiers, validate_response, ModelIngredient};
pub use rules::{parse_line, RuleBasedParser};

use crate::model::ParsedIngredient;
use async_trait::async_trait;
use serde::Deserialize;

/// Common contract of both parsing strategies.
///
/// `parse` never fails: anything that cannot be understood degrades to a
/// lower-confidence result instead.
#[async_trait]
pub trait IngredientParser: Send + Sync {
    async fn parse(&self, text: &str) -> ParsedIngredient;

    /// `"rules"` or `"llm"`
    fn parser_type(&self) -> &'static str;
}

/// Parsing strategy selected in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    #[default]
    Rules,
    Llm,
}

impl ParserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserKind::Rules => "rules",
            ParserKind::Llm => "llm",
        }
    }
}
