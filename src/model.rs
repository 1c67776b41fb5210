use serde::{Deserialize, Serialize};
use std::fmt;

/// Ingredient category in the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Protein,
    Produce,
    Dairy,
    Pantry,
    Spices,
    Grains,
    Condiments,
    Baking,
    Frozen,
    Beverages,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Volume,
    Weight,
    Count,
    Length,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModifierType {
    Preparation,
    State,
    Quality,
    Size,
    Cooking,
    #[default]
    Other,
}

/// A curated ingredient with its canonical name and aliases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownIngredient {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub default_unit: Option<String>,
}

/// A measurement unit. `base_unit` and `conversion_factor` are carried for
/// aggregation consumers and ignored by parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownUnit {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, rename = "type")]
    pub unit_type: UnitType,
    #[serde(default)]
    pub base_unit: Option<String>,
    #[serde(default)]
    pub conversion_factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownModifier {
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "type")]
    pub modifier_type: ModifierType,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Amount of an ingredient. Ranges keep their `"low-high"` text and are
/// never collapsed into a single number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Value(f64),
    Range(String),
}

impl Quantity {
    pub fn as_value(&self) -> Option<f64> {
        match self {
            Quantity::Value(v) => Some(*v),
            Quantity::Range(_) => None,
        }
    }

    pub fn as_range(&self) -> Option<&str> {
        match self {
            Quantity::Value(_) => None,
            Quantity::Range(r) => Some(r),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Value(v) => write!(f, "{}", v),
            Quantity::Range(r) => f.write_str(r),
        }
    }
}

/// Structured result of parsing one ingredient line.
///
/// Both parsing strategies produce this shape. The `*_text` fields are filled
/// even when the matching entity could not be resolved, so unresolved lines can
/// be reviewed and fixed by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedIngredient {
    pub quantity: Option<Quantity>,
    pub unit: Option<KnownUnit>,
    pub unit_text: Option<String>,
    pub ingredient: Option<KnownIngredient>,
    pub ingredient_text: String,
    pub modifiers: Vec<KnownModifier>,
    pub modifier_texts: Vec<String>,
    pub original_text: String,
    pub confidence: f64,
}

impl ParsedIngredient {
    /// The zero-confidence result returned when nothing could be extracted.
    pub fn empty(original_text: &str) -> Self {
        ParsedIngredient {
            quantity: None,
            unit: None,
            unit_text: None,
            ingredient: None,
            ingredient_text: original_text.to_string(),
            modifiers: Vec::new(),
            modifier_texts: Vec::new(),
            original_text: original_text.to_string(),
            confidence: 0.0,
        }
    }

    pub fn unit_name(&self) -> Option<&str> {
        self.unit.as_ref().map(|u| u.name.as_str())
    }

    pub fn ingredient_name(&self) -> Option<&str> {
        self.ingredient.as_ref().map(|i| i.name.as_str())
    }

    pub fn modifier_names(&self) -> Vec<&str> {
        self.modifiers.iter().map(|m| m.name.as_str()).collect()
    }
}
