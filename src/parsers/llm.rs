use crate::confidence::LLM_WEIGHTS;
use crate::error::ParserError;
use crate::knowledge::KnowledgeIndex;
use crate::model::{KnownModifier, ParsedIngredient};
use crate::normalize::normalize;
use crate::parsers::{validate_response, IngredientParser, ModelIngredient};
use crate::providers::{build_ingredient_prompt, complete_with_retry, LlmProvider, RetryPolicy};
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

/// Parser that asks an LLM for the structure and resolves its answer against
/// the knowledge base.
///
/// Provider failures never reach the caller: after a timeout, a malformed
/// answer or exhausted rate-limit retries, `parse` returns
/// [`ParsedIngredient::empty`] and logs the cause.
pub struct LlmParser {
    provider: Box<dyn LlmProvider>,
    index: Arc<KnowledgeIndex>,
    policy: RetryPolicy,
}

impl LlmParser {
    pub fn new(provider: Box<dyn LlmProvider>, index: Arc<KnowledgeIndex>) -> Self {
        LlmParser {
            provider,
            index,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn request(&self, line: &str) -> Result<ModelIngredient, ParserError> {
        let prompt = build_ingredient_prompt(line);
        let raw = complete_with_retry(self.provider.as_ref(), &prompt, &self.policy).await?;
        debug!("{} answered: {}", self.provider.provider_name(), raw);
        validate_response(&raw)
    }

    async fn resolve(&self, text: &str, answer: ModelIngredient) -> ParsedIngredient {
        let snapshot = self.index.snapshot().await;

        let ingredient = snapshot.ingredients.resolve(&answer.ingredient).cloned();
        let unit = answer
            .unit
            .as_deref()
            .and_then(|unit| snapshot.units.resolve(unit))
            .cloned();

        let mut modifiers: Vec<KnownModifier> = Vec::new();
        for phrase in &answer.modifiers {
            if let Some(modifier) = snapshot.modifiers.resolve(phrase) {
                if !modifiers.iter().any(|m| m.id == modifier.id) {
                    modifiers.push(modifier.clone());
                }
            }
        }

        let confidence = LLM_WEIGHTS.score(
            answer.quantity.is_some(),
            unit.is_some(),
            ingredient.is_some(),
        );

        ParsedIngredient {
            quantity: answer.quantity,
            unit,
            unit_text: answer.unit,
            ingredient,
            ingredient_text: answer.ingredient,
            modifiers,
            modifier_texts: answer.modifiers,
            original_text: text.to_string(),
            confidence,
        }
    }
}

#[async_trait]
impl IngredientParser for LlmParser {
    async fn parse(&self, text: &str) -> ParsedIngredient {
        let line = normalize(text);
        if line.is_empty() {
            return ParsedIngredient::empty(text);
        }

        match self.request(&line).await {
            Ok(answer) => self.resolve(text, answer).await,
            Err(e) => {
                warn!(
                    "{} could not parse '{}': {}",
                    self.provider.provider_name(),
                    text,
                    e
                );
                ParsedIngredient::empty(text)
            }
        }
    }

    fn parser_type(&self) -> &'static str {
        "llm"
    }
}
