pub mod builder;
pub mod cleaner;
pub mod confidence;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod model;
pub mod modifiers;
pub mod normalize;
pub mod parsers;
pub mod providers;
pub mod quantity;
pub mod resolver;
pub mod units;

// Re-export commonly used types
pub use builder::{Parser, ParserBuilder};
pub use config::{ParserConfig, ProviderKind};
pub use error::ParserError;
pub use knowledge::{InMemoryKnowledgeBase, KnowledgeBase, KnowledgeIndex};
pub use model::{
    Category, KnownIngredient, KnownModifier, KnownUnit, ModifierType, ParsedIngredient,
    Quantity, UnitType,
};
pub use parsers::{IngredientParser, LlmParser, ParserKind, RuleBasedParser};

use knowledge::Snapshot;
use log::warn;
use std::sync::LazyLock;

static BUNDLED_SNAPSHOT: LazyLock<Snapshot> =
    LazyLock::new(|| match InMemoryKnowledgeBase::bundled() {
        Ok(knowledge_base) => knowledge_base.snapshot(),
        Err(e) => {
            warn!("Bundled knowledge base is unreadable: {}", e);
            Snapshot::default()
        }
    });

/// Parse one line with the rule-based parser and the bundled knowledge base.
///
/// # Example
/// ```
/// use ingredient_parser::{parse_ingredient, Quantity};
///
/// let parsed = parse_ingredient("1/4 cup diced onion");
/// assert_eq!(parsed.quantity, Some(Quantity::Value(0.25)));
/// assert_eq!(parsed.unit_name(), Some("cup"));
/// assert_eq!(parsed.ingredient_text, "onion");
/// ```
pub fn parse_ingredient(text: &str) -> ParsedIngredient {
    parsers::parse_line(&BUNDLED_SNAPSHOT, text)
}
