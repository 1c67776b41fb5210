//! Line normalization shared by both parsing strategies.
//!
//! Unicode vulgar fractions become ASCII `n/d` before bullets are stripped,
//! so a fraction glyph is never mistaken for a list marker.

use regex::Regex;
use std::sync::LazyLock;

const VULGAR_FRACTIONS: &[(char, &str)] = &[
    ('½', "1/2"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅕', "1/5"),
    ('⅖', "2/5"),
    ('⅗', "3/5"),
    ('⅘', "4/5"),
    ('⅙', "1/6"),
    ('⅚', "5/6"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

const FRACTION_SLASH: char = '\u{2044}';

const BULLETS: &[char] = &[
    '•', '●', '○', '◦', '▪', '▫', '■', '□', '-', '–', '—', '*', '#', '✓', '✔', '☐', '☑', '·',
    '>',
];

// "1. Flour" / "2) eggs" but never "1 cup" or "1.5 cups"
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\d+[.)]\s+(\p{L}.*)$").unwrap());

/// Normalize a raw ingredient line. Never fails; returns the trimmed input
/// when there is nothing to rewrite.
pub fn normalize(text: &str) -> String {
    let replaced = replace_unicode_fractions(text);
    let unbulleted = strip_bullets(&replaced);
    let unmarked = strip_list_marker(unbulleted);
    collapse_whitespace(unmarked)
}

/// Replace vulgar fraction glyphs with `n/d`. A glyph glued to a whole number
/// (`1½`) is split off with a space so it reads as a mixed number.
pub fn replace_unicode_fractions(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;

    for ch in text.chars() {
        if let Some((_, ascii)) = VULGAR_FRACTIONS.iter().find(|(glyph, _)| *glyph == ch) {
            if prev.is_some_and(|p| p.is_ascii_digit()) {
                out.push(' ');
            }
            out.push_str(ascii);
        } else if ch == FRACTION_SLASH {
            out.push('/');
        } else {
            out.push(ch);
        }
        prev = Some(ch);
    }

    out
}

fn strip_bullets(text: &str) -> &str {
    text.trim_start()
        .trim_start_matches(|c: char| BULLETS.contains(&c) || c.is_whitespace())
}

fn strip_list_marker(text: &str) -> &str {
    match LIST_MARKER.captures(text).and_then(|caps| caps.get(1)) {
        Some(rest) => rest.as_str(),
        None => text,
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
