use super::{KnowledgeBase, Snapshot};
use crate::error::ParserError;
use crate::model::{KnownIngredient, KnownModifier, KnownUnit};
use crate::resolver::lookup_key;
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// Starter data compiled into the crate
const BUNDLED_KNOWLEDGE_BASE: &str = include_str!("../../data/knowledge_base.json");

/// Knowledge base held entirely in memory, loadable from JSON.
///
/// ```json
/// {
///   "ingredients": [{"id": 1, "name": "garlic", "category": "produce", "aliases": []}],
///   "units": [{"id": 1, "name": "cup", "abbreviation": "c", "aliases": ["cups"], "type": "volume"}],
///   "modifiers": [{"id": 1, "name": "minced", "type": "preparation", "aliases": []}]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InMemoryKnowledgeBase {
    #[serde(default)]
    ingredients: Vec<KnownIngredient>,
    #[serde(default)]
    units: Vec<KnownUnit>,
    #[serde(default)]
    modifiers: Vec<KnownModifier>,
}

impl InMemoryKnowledgeBase {
    pub fn new(
        ingredients: Vec<KnownIngredient>,
        units: Vec<KnownUnit>,
        modifiers: Vec<KnownModifier>,
    ) -> Self {
        InMemoryKnowledgeBase {
            ingredients,
            units,
            modifiers,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ParserError> {
        let knowledge_base: InMemoryKnowledgeBase = serde_json::from_str(json)?;
        debug!(
            "Loaded knowledge base: {} ingredients, {} units, {} modifiers",
            knowledge_base.ingredients.len(),
            knowledge_base.units.len(),
            knowledge_base.modifiers.len()
        );
        Ok(knowledge_base)
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ParserError> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&json)
    }

    /// The starter knowledge base shipped with the crate.
    pub fn bundled() -> Result<Self, ParserError> {
        Self::from_json(BUNDLED_KNOWLEDGE_BASE)
    }

    /// Build lookup tables directly, without going through a [`super::KnowledgeIndex`].
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::build(
            self.ingredients.clone(),
            self.units.clone(),
            self.modifiers.clone(),
        )
    }
}

#[async_trait]
impl KnowledgeBase for InMemoryKnowledgeBase {
    async fn list_ingredients(&self) -> Result<Vec<KnownIngredient>, ParserError> {
        Ok(self.ingredients.clone())
    }

    async fn list_units(&self) -> Result<Vec<KnownUnit>, ParserError> {
        Ok(self.units.clone())
    }

    async fn list_modifiers(&self) -> Result<Vec<KnownModifier>, ParserError> {
        Ok(self.modifiers.clone())
    }

    async fn find_ingredient_by_name(
        &self,
        name: &str,
    ) -> Result<Option<KnownIngredient>, ParserError> {
        let key = lookup_key(name);
        Ok(self
            .ingredients
            .iter()
            .find(|i| lookup_key(&i.name) == key)
            .cloned())
    }
}
