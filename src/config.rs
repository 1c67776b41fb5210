use crate::parsers::ParserKind;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Main parser configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ParserConfig {
    /// Parsing strategy used when the caller does not pick one
    #[serde(default)]
    pub strategy: ParserKind,
    /// Where the knowledge base comes from and how often it is re-read
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
    /// LLM-assisted parsing configuration
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KnowledgeBaseConfig {
    /// JSON file with ingredients, units and modifiers; bundled data when unset
    pub path: Option<String>,
    /// Seconds before the in-memory index is rebuilt
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            refresh_secs: default_refresh_secs(),
        }
    }
}

/// Supported LLM backends. Unknown names are rejected when the configuration
/// is deserialized, not when a request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAI,
    Anthropic,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::OpenAI, ProviderKind::Anthropic];

    /// Name used in configuration files and provider lookups
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    /// Environment variable consulted when no key is configured
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-3-5-haiku-latest",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "https://api.openai.com",
            ProviderKind::Anthropic => "https://api.anthropic.com",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LLM-assisted parser configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Backend used for every request
    #[serde(default)]
    pub provider: ProviderKind,
    /// Per-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Retries after a rate-limit response (delays 2s, 4s, 8s, ...)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            providers: HashMap::new(),
        }
    }
}

impl LlmConfig {
    /// Configuration block for `kind`, or defaults when none was given
    pub fn provider_config(&self, kind: ProviderKind) -> ProviderConfig {
        self.providers
            .get(kind.as_str())
            .cloned()
            .unwrap_or_default()
    }
}

/// Configuration for a specific LLM provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Model identifier (e.g., "gpt-4o-mini", "claude-3-5-haiku-latest")
    pub model: Option<String>,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: None,
            api_key: None,
            base_url: None,
            max_tokens: default_max_tokens(),
        }
    }
}

// Default value functions
fn default_refresh_secs() -> u64 {
    300
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_max_tokens() -> u32 {
    512
}

impl ParserConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with INGREDIENT_PARSER__ prefix
    /// 2. ingredient-parser.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: INGREDIENT_PARSER__LLM__PROVIDERS__OPENAI__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

pub fn load_config() -> Result<ParserConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("ingredient-parser").required(false))
        // Use double underscore for nested: INGREDIENT_PARSER__LLM__PROVIDER
        .add_source(
            Environment::with_prefix("INGREDIENT_PARSER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
