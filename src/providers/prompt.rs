use log::warn;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

/// The system prompt used for parsing a single ingredient line.
///
/// The template is loaded from `prompt.txt` at compile time using the
/// `include_str!` macro. Its `{{EXAMPLES}}` placeholder is filled with the
/// few-shot examples from `prompt_examples.json`, so either file can be
/// edited without touching Rust code.
pub const INGREDIENT_PROMPT_TEMPLATE: &str = include_str!("prompt.txt");

const PROMPT_EXAMPLES_JSON: &str = include_str!("prompt_examples.json");

const EXAMPLES_PLACEHOLDER: &str = "{{EXAMPLES}}";

static SYSTEM_PROMPT: LazyLock<String> = LazyLock::new(render_system_prompt);

/// A system and user message pair sent to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// One worked example shown to the model
#[derive(Debug, Clone, Deserialize)]
pub struct PromptExample {
    pub input: String,
    pub output: Value,
}

/// The bundled few-shot examples
pub fn prompt_examples() -> Result<Vec<PromptExample>, serde_json::Error> {
    serde_json::from_str(PROMPT_EXAMPLES_JSON)
}

/// Build the prompt for one already-normalized ingredient line.
pub fn build_ingredient_prompt(line: &str) -> Prompt {
    Prompt {
        system: SYSTEM_PROMPT.clone(),
        user: line.to_string(),
    }
}

fn render_system_prompt() -> String {
    let examples = match prompt_examples() {
        Ok(examples) => examples,
        Err(e) => {
            warn!("Ignoring unreadable prompt examples: {}", e);
            Vec::new()
        }
    };

    let rendered = examples
        .iter()
        .map(|example| format!("Input: {}\nOutput: {}", example.input, example.output))
        .collect::<Vec<_>>()
        .join("\n\n");

    INGREDIENT_PROMPT_TEMPLATE.replace(EXAMPLES_PLACEHOLDER, &rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_embedded() {
        assert!(INGREDIENT_PROMPT_TEMPLATE.contains("JSON"));
        assert!(INGREDIENT_PROMPT_TEMPLATE.contains("\"ingredient\""));
        assert!(INGREDIENT_PROMPT_TEMPLATE.contains(EXAMPLES_PLACEHOLDER));
    }

    #[test]
    fn test_examples_parse() {
        let examples = prompt_examples().unwrap();
        assert!(examples.len() >= 5);
        assert!(examples.iter().all(|e| !e.input.is_empty()));
        assert!(examples.iter().all(|e| e.output.is_object()));
    }

    #[test]
    fn test_build_prompt_renders_examples() {
        let prompt = build_ingredient_prompt("1 tsp salt");

        assert_eq!(prompt.user, "1 tsp salt");
        assert!(!prompt.system.contains(EXAMPLES_PLACEHOLDER));
        assert!(prompt.system.contains("Input: 2-3 garlic cloves, minced"));
        assert!(prompt.system.contains("\"lemon juice\""));
    }

    #[test]
    fn test_compound_name_rules_present() {
        let prompt = build_ingredient_prompt("x");
        assert!(prompt.system.contains("\"lemon juice\" is not \"lemon\""));
        assert!(prompt.system.contains("brown sugar"));
        assert!(prompt.system.contains("black pepper"));
    }
}
