use crate::cleaner::clean_ingredient_text;
use crate::confidence::RULES_WEIGHTS;
use crate::knowledge::{KnowledgeIndex, Snapshot};
use crate::model::ParsedIngredient;
use crate::normalize::normalize;
use crate::parsers::IngredientParser;
use crate::quantity::extract_quantity;
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

/// Deterministic grammar-and-lookup parser
pub struct RuleBasedParser {
    index: Arc<KnowledgeIndex>,
}

impl RuleBasedParser {
    pub fn new(index: Arc<KnowledgeIndex>) -> Self {
        RuleBasedParser { index }
    }
}

#[async_trait]
impl IngredientParser for RuleBasedParser {
    async fn parse(&self, text: &str) -> ParsedIngredient {
        let snapshot = self.index.snapshot().await;
        parse_line(&snapshot, text)
    }

    fn parser_type(&self) -> &'static str {
        "rules"
    }
}

/// Run the rule pipeline against one snapshot of the knowledge base:
/// normalize, quantity, unit, modifiers, clean, resolve, score.
pub fn parse_line(snapshot: &Snapshot, text: &str) -> ParsedIngredient {
    let normalized = normalize(text);
    let (quantity, rest) = extract_quantity(&normalized);

    let (unit, unit_text, rest) = match snapshot.unit_matcher.match_unit(rest) {
        Some(found) => (Some(found.unit), Some(found.text), found.remainder),
        None => (None, None, rest.to_string()),
    };

    let extraction = snapshot.modifier_extractor.extract(&rest);
    let ingredient_text = clean_ingredient_text(&extraction.remaining);
    let ingredient = snapshot.ingredients.resolve(&ingredient_text).cloned();

    let confidence =
        RULES_WEIGHTS.score(quantity.is_some(), unit.is_some(), ingredient.is_some());

    debug!(
        "Parsed '{}' -> ingredient '{}' (confidence {:.2})",
        text, ingredient_text, confidence
    );

    ParsedIngredient {
        quantity,
        unit,
        unit_text,
        ingredient,
        ingredient_text,
        modifiers: extraction.modifiers,
        modifier_texts: extraction.texts,
        original_text: text.to_string(),
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::InMemoryKnowledgeBase;
    use crate::model::Quantity;

    async fn bundled_parser() -> RuleBasedParser {
        let kb = InMemoryKnowledgeBase::bundled().unwrap();
        RuleBasedParser::new(Arc::new(KnowledgeIndex::new(Arc::new(kb))))
    }

    #[tokio::test]
    async fn test_parser_type() {
        assert_eq!(bundled_parser().await.parser_type(), "rules");
    }

    #[tokio::test]
    async fn test_quantity_unit_ingredient() {
        let parsed = bundled_parser().await.parse("2 cups chicken broth").await;

        assert_eq!(parsed.quantity, Some(Quantity::Value(2.0)));
        assert_eq!(parsed.unit_name(), Some("cup"));
        assert_eq!(parsed.unit_text.as_deref(), Some("cups"));
        assert_eq!(parsed.ingredient_text, "chicken broth");
        assert_eq!(parsed.ingredient_name(), Some("chicken broth"));
        assert!(parsed.modifiers.is_empty());
        assert_eq!(parsed.confidence, 1.0);
        assert_eq!(parsed.original_text, "2 cups chicken broth");
    }

    #[tokio::test]
    async fn test_unicode_fraction_and_bullet() {
        let parsed = bundled_parser().await.parse("• ½ tsp salt").await;

        assert_eq!(parsed.quantity, Some(Quantity::Value(0.5)));
        assert_eq!(parsed.unit_name(), Some("teaspoon"));
        assert_eq!(parsed.ingredient_name(), Some("salt"));
    }

    #[test]
    fn test_empty_snapshot_degrades() {
        let parsed = parse_line(&Snapshot::default(), "2 cups chicken broth");

        assert_eq!(parsed.quantity, Some(Quantity::Value(2.0)));
        assert!(parsed.unit.is_none());
        assert!(parsed.ingredient.is_none());
        assert_eq!(parsed.ingredient_text, "cups chicken broth");
        assert!((parsed.confidence - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_blank_line() {
        let parsed = parse_line(&Snapshot::default(), "   ");

        assert!(parsed.quantity.is_none());
        assert!(parsed.ingredient.is_none());
        assert_eq!(parsed.ingredient_text, "");
        assert_eq!(parsed.confidence, 0.0);
    }
}
