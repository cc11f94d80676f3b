//! Ingredient list extraction from label text.
//!
//! Input is free text as produced by an OCR step. The output is an ordered
//! list of lowercased candidate ingredient names.

use once_cell::sync::Lazy;
use regex::Regex;

/// Words that introduce the ingredient list, checked in order.
const INGREDIENT_MARKERS: &[&str] = &[
    "ingredients:",
    "ingredients",
    "składniki:",
    "składniki",
    "inci:",
    "inci",
    "zawiera:",
    "zawiera",
    "skład:",
    "skład",
    "contains:",
    "contains",
];

/// Text after any of these is not part of the list.
const SECTION_TERMINATORS: &[&str] = &[". ", " made in", " wyprodukowano w", " best before"];

/// Fragments that mark URLs or footnotes rather than ingredients.
const NOISE_FRAGMENTS: &[&str] = &["www.", ".com", "uwagi", "note:", "przyp"];

const MIN_INGREDIENT_LEN: usize = 3;

static PARENTHESISED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("static regex is valid"));

static BULLETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[•*+]").expect("static regex is valid"));

/// Extracts candidate ingredient names from label text.
///
/// Returns an empty list when no ingredients marker is present.
pub fn extract_ingredients(text: &str) -> Vec<String> {
    let normalized = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let Some(section) = INGREDIENT_MARKERS.iter().find_map(|marker| {
        normalized
            .split_once(marker)
            .map(|(_, rest)| rest.trim().to_string())
    }) else {
        return Vec::new();
    };

    let mut section = section.as_str();
    for terminator in SECTION_TERMINATORS {
        if let Some((head, _)) = section.split_once(terminator) {
            section = head;
        }
    }

    let section = BULLETS.replace_all(section, "");
    section
        .split(',')
        .map(|raw| {
            let cleaned = PARENTHESISED.replace_all(raw, "");
            cleaned
                .trim()
                .trim_start_matches('-')
                .trim_end_matches('.')
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|name| name.chars().count() >= MIN_INGREDIENT_LEN)
        .filter(|name| !NOISE_FRAGMENTS.iter().any(|noise| name.contains(noise)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_list_after_marker() {
        let text = "Hydrating Cream 50ml\nINGREDIENTS: Aqua, Glycerin, Cetearyl Alcohol (and) \
                    Ceteareth-20, Parfum, Linalool. Made in France";
        assert_eq!(
            extract_ingredients(text),
            vec!["aqua", "glycerin", "cetearyl alcohol ceteareth-20", "parfum", "linalool"]
        );
    }

    #[test]
    fn stops_at_sentence_end_and_strips_bullets() {
        let text = "Skład: • Aqua, * Glycerin, + Parfum. www.example.com";
        assert_eq!(extract_ingredients(text), vec!["aqua", "glycerin", "parfum"]);
    }

    #[test]
    fn polish_marker_and_terminator() {
        let text = "Składniki: Aqua, Urea, Panthenol wyprodukowano w Polsce";
        assert_eq!(extract_ingredients(text), vec!["aqua", "urea", "panthenol"]);
    }

    #[test]
    fn drops_short_and_noise_fragments() {
        let text = "Ingredients: Aqua, Zn, note: see pack, Niacinamide";
        assert_eq!(extract_ingredients(text), vec!["aqua", "niacinamide"]);
    }

    #[test]
    fn keeps_hyphenated_names() {
        let text = "Contains: PEG-100 Stearate, Ci 77491";
        assert_eq!(extract_ingredients(text), vec!["peg-100 stearate", "ci 77491"]);
    }

    #[test]
    fn no_marker_yields_nothing() {
        assert!(extract_ingredients("Shake well before use").is_empty());
    }
}
