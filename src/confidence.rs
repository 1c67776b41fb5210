//! Presence-weighted confidence scores. Each strategy keeps its own weight
//! table; review thresholds downstream depend on both scales.

/// Weights added for each structurally resolved part of a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceWeights {
    pub base: f64,
    pub quantity: f64,
    pub unit: f64,
    pub ingredient: f64,
}

pub const RULES_WEIGHTS: ConfidenceWeights = ConfidenceWeights {
    base: 0.0,
    quantity: 0.2,
    unit: 0.3,
    ingredient: 0.5,
};

pub const LLM_WEIGHTS: ConfidenceWeights = ConfidenceWeights {
    base: 0.1,
    quantity: 0.2,
    unit: 0.3,
    ingredient: 0.4,
};

impl ConfidenceWeights {
    pub fn score(&self, has_quantity: bool, has_unit: bool, has_ingredient: bool) -> f64 {
        let mut score = self.base;
        if has_quantity {
            score += self.quantity;
        }
        if has_unit {
            score += self.unit;
        }
        if has_ingredient {
            score += self.ingredient;
        }
        score.min(1.0)
    }
}
