//! Greedy multi-token unit matching.

use crate::model::KnownUnit;
use crate::resolver::lookup_key;
use std::collections::HashMap;

/// Longest unit phrase tried at each token position ("fl oz" before "fl").
const MAX_WINDOW: usize = 2;

const TOKEN_PUNCTUATION: &[char] = &[',', ';', ':', '.', '(', ')'];

/// A unit found in the text
#[derive(Debug, Clone, PartialEq)]
pub struct UnitMatch {
    pub unit: KnownUnit,
    /// The tokens that produced the match, punctuation trimmed
    pub text: String,
    /// Input with the matched tokens removed
    pub remainder: String,
}

/// Case-insensitive lookup from every unit name, abbreviation and alias.
#[derive(Debug, Clone, Default)]
pub struct UnitMatcher {
    units: Vec<KnownUnit>,
    lookup: HashMap<String, usize>,
}

impl UnitMatcher {
    pub fn new(units: &[KnownUnit]) -> Self {
        let mut lookup = HashMap::new();

        for (position, unit) in units.iter().enumerate() {
            let keys = std::iter::once(&unit.name)
                .chain(unit.abbreviation.iter())
                .chain(unit.aliases.iter());
            for key in keys {
                let key = token_key(key);
                if !key.is_empty() {
                    lookup.entry(key).or_insert(position);
                }
            }
        }

        UnitMatcher {
            units: units.to_vec(),
            lookup,
        }
    }

    /// Find the first unit in `text`, scanning positions left to right and
    /// trying the widest window first at each position.
    ///
    /// Only the head clause is scanned: tokens after the first comma and
    /// tokens inside parentheses ("(14 oz) can") are never unit candidates.
    pub fn match_unit(&self, text: &str) -> Option<UnitMatch> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let candidates = candidate_tokens(&tokens);

        for start in 0..candidates.len() {
            for width in (1..=MAX_WINDOW).rev() {
                let end = start + width;
                if end > candidates.len() || !candidates[start..end].iter().all(|&c| c) {
                    continue;
                }

                let window = &tokens[start..end];
                let key = token_key(&window.join(" "));
                let Some(&position) = self.lookup.get(&key) else {
                    continue;
                };

                let matched = window
                    .iter()
                    .map(|t| t.trim_matches(TOKEN_PUNCTUATION))
                    .collect::<Vec<_>>()
                    .join(" ");

                return Some(UnitMatch {
                    unit: self.units[position].clone(),
                    text: matched,
                    remainder: remove_tokens(&tokens, start, end),
                });
            }
        }

        None
    }
}

// One flag per scannable token; the list ends with the token closing the
// head clause.
fn candidate_tokens(tokens: &[&str]) -> Vec<bool> {
    let mut candidates = Vec::with_capacity(tokens.len());
    let mut depth: usize = 0;

    for token in tokens {
        let opens = token.matches('(').count();
        let closes = token.matches(')').count();
        candidates.push(depth == 0 && opens == 0 && closes == 0);
        depth = (depth + opens).saturating_sub(closes);

        if depth == 0 && token.ends_with(',') {
            break;
        }
    }

    candidates
}

// Per-token punctuation is ignored so "tbsp." and "cloves," still match.
fn token_key(text: &str) -> String {
    let trimmed = text
        .split_whitespace()
        .map(|t| t.trim_matches(TOKEN_PUNCTUATION))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    lookup_key(&trimmed)
}

// A trailing comma on the removed unit is moved onto the previous token so the
// comma clause ("garlic cloves, minced") survives for the cleaner. An "of"
// directly after the unit goes with it ("pinch of salt").
fn remove_tokens(tokens: &[&str], start: usize, end: usize) -> String {
    let mut kept: Vec<String> = tokens[..start].iter().map(|t| t.to_string()).collect();
    let mut rest = &tokens[end..];

    if tokens[end - 1].ends_with(',') {
        if let Some(previous) = kept.last_mut() {
            if !previous.ends_with(',') {
                previous.push(',');
            }
        }
    } else if rest.first().is_some_and(|t| t.eq_ignore_ascii_case("of")) {
        rest = &rest[1..];
    }

    kept.extend(rest.iter().map(|t| t.to_string()));
    kept.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: i64, name: &str, abbreviation: Option<&str>, aliases: &[&str]) -> KnownUnit {
        KnownUnit {
            id,
            name: name.to_string(),
            abbreviation: abbreviation.map(str::to_string),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            unit_type: Default::default(),
            base_unit: None,
            conversion_factor: None,
        }
    }

    fn matcher() -> UnitMatcher {
        UnitMatcher::new(&[
            unit(1, "cup", Some("c"), &["cups"]),
            unit(2, "fl", None, &[]),
            unit(3, "fluid ounce", Some("fl oz"), &["fluid ounces"]),
            unit(4, "clove", None, &["cloves"]),
            unit(5, "tablespoon", Some("tbsp"), &["tablespoons", "tbs"]),
        ])
    }

    #[test]
    fn test_matches_name_abbreviation_and_alias() {
        let matcher = matcher();
        assert_eq!(matcher.match_unit("cup flour").unwrap().unit.id, 1);
        assert_eq!(matcher.match_unit("Cups flour").unwrap().unit.id, 1);
        assert_eq!(matcher.match_unit("TBSP oil").unwrap().unit.id, 5);
    }

    #[test]
    fn test_two_token_window_wins() {
        let found = matcher().match_unit("fl oz cream").unwrap();
        assert_eq!(found.unit.id, 3);
        assert_eq!(found.text, "fl oz");
        assert_eq!(found.remainder, "cream");
    }

    #[test]
    fn test_multi_word_unit_name() {
        let found = matcher().match_unit("fluid ounces milk").unwrap();
        assert_eq!(found.unit.name, "fluid ounce");
        assert_eq!(found.remainder, "milk");
    }

    #[test]
    fn test_unit_after_ingredient_word_keeps_comma_clause() {
        let found = matcher().match_unit("garlic cloves, minced").unwrap();
        assert_eq!(found.unit.name, "clove");
        assert_eq!(found.text, "cloves");
        assert_eq!(found.remainder, "garlic, minced");
    }

    #[test]
    fn test_trailing_period_on_abbreviation() {
        let found = matcher().match_unit("tbsp. butter").unwrap();
        assert_eq!(found.unit.id, 5);
        assert_eq!(found.text, "tbsp");
        assert_eq!(found.remainder, "butter");
    }

    #[test]
    fn test_of_after_unit_is_removed() {
        let matcher = UnitMatcher::new(&[unit(1, "pinch", None, &["pinches"])]);
        assert_eq!(matcher.match_unit("a pinch of salt").unwrap().remainder, "a salt");
        assert_eq!(matcher.match_unit("pinch Of salt").unwrap().remainder, "salt");
        assert_eq!(matcher.match_unit("pinch offal").unwrap().remainder, "offal");
    }

    #[test]
    fn test_comma_clause_is_not_scanned() {
        let matcher = UnitMatcher::new(&[unit(1, "inch", None, &["inches"])]);
        assert!(matcher.match_unit("onion, cut into 1 inch pieces").is_none());
    }

    #[test]
    fn test_parenthetical_is_not_scanned() {
        let matcher = UnitMatcher::new(&[
            unit(1, "ounce", Some("oz"), &[]),
            unit(2, "can", None, &["cans"]),
        ]);
        let found = matcher.match_unit("(14 oz) can tomatoes").unwrap();
        assert_eq!(found.unit.name, "can");
        assert_eq!(found.remainder, "(14 oz) tomatoes");
    }

    #[test]
    fn test_no_match_leaves_text() {
        assert!(matcher().match_unit("salt to taste").is_none());
        assert!(matcher().match_unit("").is_none());
        assert!(UnitMatcher::default().match_unit("cup flour").is_none());
    }
}
