//! Knowledge-base access for the parsers.
//!
//! The knowledge base itself is owned by an external curation process; this
//! crate only reads it. [`KnowledgeIndex`] keeps an immutable in-memory
//! snapshot that is rebuilt on an interval or after [`KnowledgeIndex::invalidate`],
//! so parsing never rescans the store on every call.

mod index;
mod memory;

pub use index::{KnowledgeIndex, Snapshot, DEFAULT_REFRESH_INTERVAL};
pub use memory::InMemoryKnowledgeBase;

use crate::error::ParserError;
use crate::model::{KnownIngredient, KnownModifier, KnownUnit};
use crate::resolver::lookup_key;
use async_trait::async_trait;

/// Read-only access to known ingredients, units and modifiers.
///
/// Only the `list_*` methods are required; the `find_*_by_name` lookups scan
/// them case-insensitively unless the store has something faster.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn list_ingredients(&self) -> Result<Vec<KnownIngredient>, ParserError>;

    async fn list_units(&self) -> Result<Vec<KnownUnit>, ParserError>;

    async fn list_modifiers(&self) -> Result<Vec<KnownModifier>, ParserError>;

    async fn find_ingredient_by_name(
        &self,
        name: &str,
    ) -> Result<Option<KnownIngredient>, ParserError> {
        let key = lookup_key(name);
        Ok(self
            .list_ingredients()
            .await?
            .into_iter()
            .find(|i| lookup_key(&i.name) == key))
    }

    async fn find_unit_by_name(&self, name: &str) -> Result<Option<KnownUnit>, ParserError> {
        let key = lookup_key(name);
        Ok(self
            .list_units()
            .await?
            .into_iter()
            .find(|u| lookup_key(&u.name) == key))
    }

    async fn find_modifier_by_name(
        &self,
        name: &str,
    ) -> Result<Option<KnownModifier>, ParserError> {
        let key = lookup_key(name);
        Ok(self
            .list_modifiers()
            .await?
            .into_iter()
            .find(|m| lookup_key(&m.name) == key))
    }
}
