//! Tiered fuzzy lookup of free text against knowledge-base entities:
//! exact name, then exact alias, then substring in either direction.

use crate::model::{KnownIngredient, KnownModifier, KnownUnit};
use std::collections::HashMap;

/// Anything that can be looked up by canonical name or alias.
pub trait Entity {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    /// Alternate spellings, in the order they should be tried.
    fn aliases(&self) -> Vec<&str>;
}

impl Entity for KnownIngredient {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> Vec<&str> {
        self.aliases.iter().map(String::as_str).collect()
    }
}

impl Entity for KnownUnit {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    // The abbreviation is just another way to write the unit
    fn aliases(&self) -> Vec<&str> {
        self.abbreviation
            .iter()
            .chain(self.aliases.iter())
            .map(String::as_str)
            .collect()
    }
}

impl Entity for KnownModifier {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> Vec<&str> {
        self.aliases.iter().map(String::as_str).collect()
    }
}

/// Entities of one kind with lowercase name and alias maps.
///
/// Built once per knowledge-base snapshot; lookups never rescan the source.
#[derive(Debug, Clone)]
pub struct EntityIndex<T> {
    entities: Vec<T>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl<T: Entity> EntityIndex<T> {
    pub fn new(entities: Vec<T>) -> Self {
        let mut by_name = HashMap::new();
        let mut by_alias = HashMap::new();

        for (position, entity) in entities.iter().enumerate() {
            by_name
                .entry(lookup_key(entity.name()))
                .or_insert(position);
            for alias in entity.aliases() {
                let key = lookup_key(alias);
                if !key.is_empty() {
                    by_alias.entry(key).or_insert(position);
                }
            }
        }

        EntityIndex {
            entities,
            by_name,
            by_alias,
        }
    }

    pub fn entities(&self) -> &[T] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&T> {
        self.by_name
            .get(&lookup_key(name))
            .map(|&position| &self.entities[position])
    }

    pub fn find_by_alias(&self, alias: &str) -> Option<&T> {
        self.by_alias
            .get(&lookup_key(alias))
            .map(|&position| &self.entities[position])
    }

    /// Resolve free text to an entity. Blank input resolves to nothing.
    pub fn resolve(&self, candidate: &str) -> Option<&T> {
        let key = lookup_key(candidate);
        if key.is_empty() {
            return None;
        }

        self.find_by_name(&key)
            .or_else(|| self.find_by_alias(&key))
            .or_else(|| self.find_by_substring(&key))
    }

    // Entities are scanned in knowledge-base order, name before aliases, so
    // the same input always lands on the same entity.
    fn find_by_substring(&self, key: &str) -> Option<&T> {
        self.entities.iter().find(|entity| {
            std::iter::once(entity.name())
                .chain(entity.aliases())
                .map(lookup_key)
                .any(|known| !known.is_empty() && (key.contains(&known) || known.contains(key)))
        })
    }
}

impl<T: Entity> Default for EntityIndex<T> {
    fn default() -> Self {
        EntityIndex::new(Vec::new())
    }
}

/// Case-folded, whitespace-collapsed form used for every comparison.
pub fn lookup_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn ingredient(id: i64, name: &str, aliases: &[&str]) -> KnownIngredient {
        KnownIngredient {
            id,
            name: name.to_string(),
            category: Category::Other,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            default_unit: None,
        }
    }

    fn index() -> EntityIndex<KnownIngredient> {
        EntityIndex::new(vec![
            ingredient(1, "chicken broth", &["stock", "chicken stock"]),
            ingredient(2, "garlic", &[]),
            ingredient(3, "olive", &["olives"]),
            ingredient(4, "lemon juice", &[]),
            ingredient(5, "lemon", &[]),
        ])
    }

    #[test]
    fn test_exact_name_is_case_insensitive() {
        let index = index();
        assert_eq!(index.resolve("Chicken Broth").map(|i| i.id), Some(1));
        assert_eq!(index.resolve("  GARLIC ").map(|i| i.id), Some(2));
    }

    #[test]
    fn test_alias_resolves_to_same_entity() {
        let index = index();
        let by_name = index.resolve("Chicken Broth").unwrap();
        let by_alias = index.resolve("stock").unwrap();
        assert_eq!(by_name, by_alias);
    }

    #[test]
    fn test_exact_match_beats_substring() {
        let index = index();
        // "lemon juice" contains "lemon", but the exact entry wins
        assert_eq!(index.resolve("lemon juice").map(|i| i.id), Some(4));
        assert_eq!(index.resolve("lemon").map(|i| i.id), Some(5));
    }

    #[test]
    fn test_substring_either_direction() {
        let index = index();
        assert_eq!(index.resolve("kalamata olives").map(|i| i.id), Some(3));
        assert_eq!(index.resolve("garl").map(|i| i.id), Some(2));
    }

    #[test]
    fn test_substring_scan_is_in_knowledge_base_order() {
        let index = index();
        // Both "lemon juice" and "lemon" contain "lemo"; the first one listed wins
        assert_eq!(index.resolve("lemo").map(|i| i.id), Some(4));
    }

    #[test]
    fn test_blank_input_resolves_to_nothing() {
        let index = index();
        assert!(index.resolve("").is_none());
        assert!(index.resolve("   ").is_none());
    }

    #[test]
    fn test_no_match() {
        assert!(index().resolve("saffron").is_none());
        assert!(EntityIndex::<KnownIngredient>::default()
            .resolve("garlic")
            .is_none());
    }

    #[test]
    fn test_unit_abbreviation_is_an_alias() {
        let units = EntityIndex::new(vec![KnownUnit {
            id: 1,
            name: "tablespoon".to_string(),
            abbreviation: Some("tbsp".to_string()),
            aliases: vec!["tablespoons".to_string()],
            unit_type: Default::default(),
            base_unit: None,
            conversion_factor: None,
        }]);
        assert_eq!(units.resolve("TBSP").map(|u| u.id), Some(1));
        assert_eq!(units.resolve("tablespoons").map(|u| u.id), Some(1));
    }
}
