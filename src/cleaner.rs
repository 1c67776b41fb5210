//! Reduces the text left after quantity, unit and modifier extraction to an
//! ingredient name candidate.

use crate::normalize::collapse_whitespace;
use regex::Regex;
use std::sync::LazyLock;

/// Serving instructions that say nothing about the ingredient itself.
pub const BOILERPLATE_PHRASES: &[&str] = &[
    "to taste",
    "as needed",
    "optional",
    "for garnish",
    "for serving",
    "approximately",
    "or more",
];

static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)?").unwrap());

const EDGE_PUNCTUATION: &[char] = &[',', ';', ':', '.', '-', '*', '/'];

const LEADING_WORDS: &[&str] = &["of ", "a ", "an ", "the "];

/// Produce the canonical ingredient text: comma clause dropped, asides
/// removed, trailing boilerplate removed, lowercased.
///
/// Punctuation glued to the start of the text (",5 milk" once the unit is
/// gone) is not a clause break.
pub fn clean_ingredient_text(text: &str) -> String {
    let text =
        text.trim_start_matches(|c: char| EDGE_PUNCTUATION.contains(&c) || c.is_whitespace());
    let head = text.split(',').next().unwrap_or_default();
    let without_asides = PARENTHETICAL.replace_all(head, " ");
    let mut cleaned = collapse_whitespace(&without_asides).to_lowercase();

    loop {
        let trimmed =
            cleaned.trim_matches(|c: char| EDGE_PUNCTUATION.contains(&c) || c.is_whitespace());
        let stripped = strip_trailing_boilerplate(trimmed);
        let stripped = strip_leading_word(stripped);
        if stripped == cleaned {
            break;
        }
        cleaned = stripped.to_string();
    }

    cleaned
}

fn strip_leading_word(text: &str) -> &str {
    LEADING_WORDS
        .iter()
        .find_map(|word| text.strip_prefix(word))
        .unwrap_or(text)
}

fn strip_trailing_boilerplate(text: &str) -> &str {
    for phrase in BOILERPLATE_PHRASES {
        if let Some(head) = text.strip_suffix(phrase) {
            if head.ends_with(' ') {
                return head.trim_end();
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_comma_clause() {
        assert_eq!(clean_ingredient_text("garlic, minced"), "garlic");
        assert_eq!(clean_ingredient_text("chickpeas, drained and rinsed"), "chickpeas");
    }

    #[test]
    fn test_strips_parentheticals() {
        assert_eq!(clean_ingredient_text("butter (softened)"), "butter");
        assert_eq!(clean_ingredient_text("flour (about 2 cups) sifted"), "flour sifted");
        assert_eq!(clean_ingredient_text("tomatoes (14 oz"), "tomatoes");
    }

    #[test]
    fn test_strips_trailing_boilerplate() {
        assert_eq!(clean_ingredient_text("salt to taste"), "salt");
        assert_eq!(clean_ingredient_text("salt and pepper to taste"), "salt and pepper");
        assert_eq!(clean_ingredient_text("Parsley for garnish"), "parsley");
        assert_eq!(clean_ingredient_text("optional"), "optional");
    }

    #[test]
    fn test_strips_leading_of() {
        assert_eq!(clean_ingredient_text("of flour"), "flour");
        assert_eq!(clean_ingredient_text("offal"), "offal");
    }

    #[test]
    fn test_strips_leading_article() {
        assert_eq!(clean_ingredient_text("a of salt"), "salt");
        assert_eq!(clean_ingredient_text("A handful basil"), "handful basil");
        assert_eq!(clean_ingredient_text("an apple"), "apple");
        assert_eq!(clean_ingredient_text("anchovies"), "anchovies");
        assert_eq!(clean_ingredient_text("theme"), "theme");
    }

    #[test]
    fn test_leading_comma_is_not_a_clause_break() {
        assert_eq!(clean_ingredient_text(",5 milk"), "5 milk");
        assert_eq!(clean_ingredient_text(", milk, warmed"), "milk");
    }

    #[test]
    fn test_lowercases_and_collapses() {
        assert_eq!(clean_ingredient_text("  Chicken   Broth "), "chicken broth");
        assert_eq!(clean_ingredient_text(""), "");
    }
}
