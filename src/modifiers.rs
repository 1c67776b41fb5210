//! Longest-phrase-first modifier stripping.

use crate::model::KnownModifier;
use crate::normalize::collapse_whitespace;
use crate::resolver::lookup_key;
use log::warn;
use regex::Regex;
use std::collections::HashMap;

/// Modifiers found in a line, in the order their phrases were tried
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierExtraction {
    pub modifiers: Vec<KnownModifier>,
    pub texts: Vec<String>,
    pub remaining: String,
}

#[derive(Debug, Clone)]
struct ModifierPattern {
    pattern: Regex,
    position: usize,
}

/// Strips known modifier phrases out of a line.
///
/// Keys are every modifier name and alias, tried longest first so that
/// "extra virgin" is consumed before "virgin" gets a chance.
#[derive(Debug, Clone, Default)]
pub struct ModifierExtractor {
    modifiers: Vec<KnownModifier>,
    patterns: Vec<ModifierPattern>,
}

impl ModifierExtractor {
    pub fn new(modifiers: &[KnownModifier]) -> Self {
        let mut lookup: HashMap<String, usize> = HashMap::new();
        for (position, modifier) in modifiers.iter().enumerate() {
            for key in std::iter::once(&modifier.name).chain(modifier.aliases.iter()) {
                let key = lookup_key(key);
                if !key.is_empty() {
                    lookup.entry(key).or_insert(position);
                }
            }
        }

        let mut keys: Vec<(String, usize)> = lookup.into_iter().collect();
        keys.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let patterns = keys
            .into_iter()
            .filter_map(|(key, position)| {
                let source = format!(r"(?i)\b{}\b", whole_word_pattern(&key));
                match Regex::new(&source) {
                    Ok(pattern) => Some(ModifierPattern { pattern, position }),
                    Err(e) => {
                        warn!("Skipping modifier phrase '{}': {}", key, e);
                        None
                    }
                }
            })
            .collect();

        ModifierExtractor {
            modifiers: modifiers.to_vec(),
            patterns,
        }
    }

    pub fn extract(&self, text: &str) -> ModifierExtraction {
        let mut working = text.to_string();
        let mut found: Vec<KnownModifier> = Vec::new();
        let mut texts = Vec::new();

        for ModifierPattern { pattern, position } in &self.patterns {
            let Some(hit) = pattern.find(&working) else {
                continue;
            };

            let modifier = &self.modifiers[*position];
            if !found.iter().any(|m| m.id == modifier.id) {
                found.push(modifier.clone());
                texts.push(hit.as_str().to_string());
            }

            working = pattern.replace_all(&working, " ").into_owned();
        }

        ModifierExtraction {
            modifiers: found,
            texts,
            remaining: collapse_whitespace(&working),
        }
    }
}

// Multi-word keys tolerate any run of whitespace between words.
fn whole_word_pattern(key: &str) -> String {
    key.split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}
