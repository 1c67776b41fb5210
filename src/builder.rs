use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::config::{ParserConfig, ProviderKind};
use crate::knowledge::{InMemoryKnowledgeBase, KnowledgeBase, KnowledgeIndex};
use crate::parsers::{IngredientParser, LlmParser, ParserKind, RuleBasedParser};
use crate::providers::{LlmProvider, ProviderFactory, RetryPolicy};
use crate::ParserError;

/// Builder for configuring an ingredient parser
#[derive(Default)]
pub struct ParserBuilder {
    strategy: Option<ParserKind>,
    knowledge_base: Option<Arc<dyn KnowledgeBase>>,
    refresh_interval: Option<Duration>,
    provider: Option<ProviderKind>,
    custom_provider: Option<Box<dyn LlmProvider>>,
    timeout: Option<Duration>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    max_retries: Option<u32>,
    config: Option<ParserConfig>,
}

impl ParserBuilder {
    /// Use the deterministic rule-based parser
    ///
    /// # Example
    /// ```
    /// use ingredient_parser::Parser;
    ///
    /// let builder = Parser::builder().rules();
    /// ```
    pub fn rules(mut self) -> Self {
        self.strategy = Some(ParserKind::Rules);
        self
    }

    /// Use the LLM-assisted parser
    ///
    /// # Example
    /// ```
    /// use ingredient_parser::{Parser, ProviderKind};
    ///
    /// let builder = Parser::builder()
    ///     .llm()
    ///     .provider(ProviderKind::Anthropic);
    /// ```
    pub fn llm(mut self) -> Self {
        self.strategy = Some(ParserKind::Llm);
        self
    }

    pub fn strategy(mut self, strategy: ParserKind) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Look entities up in this knowledge base instead of the configured or
    /// bundled one.
    pub fn knowledge_base(mut self, knowledge_base: Arc<dyn KnowledgeBase>) -> Self {
        self.knowledge_base = Some(knowledge_base);
        self
    }

    /// How long a knowledge-base snapshot is served before it is rebuilt
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    /// Select one of the built-in LLM backends
    pub fn provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use an already constructed provider. Implies the LLM strategy unless
    /// another strategy was chosen explicitly.
    pub fn with_provider(mut self, provider: Box<dyn LlmProvider>) -> Self {
        self.custom_provider = Some(provider);
        self
    }

    /// Deadline for each provider call
    ///
    /// # Example
    /// ```
    /// use ingredient_parser::Parser;
    /// use std::time::Duration;
    ///
    /// let builder = Parser::builder()
    ///     .llm()
    ///     .timeout(Duration::from_secs(10));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the API key for the LLM provider
    ///
    /// This allows passing the API key directly instead of relying on
    /// environment variables or config files.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name for the LLM provider
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Send provider requests to a custom or proxy endpoint
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Retries after a rate-limit response
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Start from a loaded configuration; builder settings take precedence.
    pub fn config(mut self, config: ParserConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the configured parser
    ///
    /// # Errors
    /// Returns `ParserError` if:
    /// - The configured knowledge-base file cannot be read or decoded
    /// - The selected provider has no API key
    /// - A custom provider is combined with the rules strategy
    ///
    /// # Example
    /// ```no_run
    /// # use ingredient_parser::{IngredientParser, Parser};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let parser = Parser::builder().rules().build().await?;
    /// let parsed = parser.parse("2 cups chicken broth").await;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<Box<dyn IngredientParser>, ParserError> {
        let config = self.config.unwrap_or_default();

        let strategy = self
            .strategy
            .or(self.custom_provider.as_ref().map(|_| ParserKind::Llm))
            .unwrap_or(config.strategy);

        if strategy == ParserKind::Rules && self.custom_provider.is_some() {
            return Err(ParserError::BuilderError(
                "Cannot use with_provider() with the rules strategy".to_string(),
            ));
        }

        let knowledge_base: Arc<dyn KnowledgeBase> = match self.knowledge_base {
            Some(knowledge_base) => knowledge_base,
            None => match &config.knowledge_base.path {
                Some(path) => Arc::new(InMemoryKnowledgeBase::from_path(path).await?),
                None => Arc::new(InMemoryKnowledgeBase::bundled()?),
            },
        };

        let refresh_interval = self
            .refresh_interval
            .unwrap_or(Duration::from_secs(config.knowledge_base.refresh_secs));
        let index =
            Arc::new(KnowledgeIndex::new(knowledge_base).with_refresh_interval(refresh_interval));

        match strategy {
            ParserKind::Rules => Ok(Box::new(RuleBasedParser::new(index))),
            ParserKind::Llm => {
                let timeout = self
                    .timeout
                    .unwrap_or(Duration::from_secs(config.llm.timeout));
                let policy = RetryPolicy {
                    max_retries: self.max_retries.unwrap_or(config.llm.max_retries),
                    timeout,
                };

                let provider = match self.custom_provider {
                    Some(provider) => provider,
                    None => {
                        let kind = self.provider.unwrap_or(config.llm.provider);
                        let mut provider_config = config.llm.provider_config(kind);
                        if self.api_key.is_some() {
                            provider_config.api_key = self.api_key;
                        }
                        if self.model.is_some() {
                            provider_config.model = self.model;
                        }
                        if self.base_url.is_some() {
                            provider_config.base_url = self.base_url;
                        }
                        ProviderFactory::create(kind, &provider_config, timeout)?
                    }
                };

                info!(
                    "Parsing ingredients with {} ({})",
                    provider.provider_name(),
                    provider.model()
                );

                Ok(Box::new(
                    LlmParser::new(provider, index).with_retry_policy(policy),
                ))
            }
        }
    }
}

/// Main entry point for the builder API
pub struct Parser;

impl Parser {
    /// Creates a new builder for ingredient parsers
    ///
    /// # Example
    /// ```
    /// use ingredient_parser::Parser;
    ///
    /// let builder = Parser::builder();
    /// ```
    pub fn builder() -> ParserBuilder {
        ParserBuilder::default()
    }
}
