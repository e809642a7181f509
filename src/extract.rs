//! Heuristic extraction of ingredient lists from OCRed label text.
//!
//! This is deliberately a best-effort filter tuned to common label phrasing
//! ("Ingredients:", "made of"), not a natural-language parser. It favors
//! recall over precision: tokens that merely look plausible are kept, and
//! prose following a trigger phrase may produce false positives. That's
//! accepted behavior for a label scanner whose output a human reads.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a paragraph that introduces an ingredient list. The leading `.*`
/// is greedy, so stripping the match removes everything up to and including
/// the *last* trigger phrase on a line.
static TRIGGER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i).*(ingredients|made\s+of)").expect("failed to compile regex")
});

/// Delimiters separating ingredients, with any surrounding whitespace.
static DELIMITER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*[.,:;()]\s*").expect("failed to compile regex")
});

/// A standalone function word ("a", "and", "the", "or", "by"), bounded by
/// non-letters.
#[allow(dead_code)]
static FUNCTION_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|[^a-z])(a|and|the|or|by)($|[^a-z])")
        .expect("failed to compile regex")
});

/// How many whitespace-separated words does this text contain?
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Could this token plausibly name an ingredient?
///
/// True iff the token contains at least one letter and is at most 4 words
/// long. This happily accepts things like "best before" — recall over
/// precision.
pub fn is_possible_ingredient(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_alphabetic()) && word_count(token) <= 4
}

/// Is this text entirely lowercase or entirely uppercase?
///
/// Available as an extra filter for callers that want to reject
/// mixed-case prose. Not applied by [`extract_ingredients`].
#[allow(dead_code)]
pub fn is_consistent_case(text: &str) -> bool {
    text == text.to_lowercase() || text == text.to_uppercase()
}

/// Does this token contain a standalone function word like "and" or "the"?
///
/// Ingredient names rarely do, so this can be used to reject sentence
/// fragments. Not applied by [`extract_ingredients`].
#[allow(dead_code)]
pub fn has_function_word(token: &str) -> bool {
    FUNCTION_WORD_REGEX.is_match(token)
}

/// Extract ingredient candidates from a single paragraph.
///
/// Paragraphs without a trigger phrase contribute nothing. Otherwise we
/// strip everything through the trigger, split the remainder on delimiter
/// runs, keep the plausible tokens, and lowercase them.
fn extract_ingredients_from_text(text: &str) -> Vec<String> {
    let Some(matched) = TRIGGER_REGEX.find(text) else {
        return vec![];
    };
    let ingredient_list = &text[matched.end()..];
    DELIMITER_REGEX
        .split(ingredient_list)
        .filter(|token| is_possible_ingredient(token))
        .map(|token| token.to_lowercase())
        .collect()
}

/// Extract ingredient candidates from flattened paragraph text.
///
/// Each paragraph is tested independently, so a document may seed several
/// ingredient sub-lists; they're merged into one flat sequence in paragraph
/// order then token order. Pure function: same input, same output.
pub fn extract_ingredients(paragraphs: &[String]) -> Vec<String> {
    paragraphs
        .iter()
        .flat_map(|paragraph| extract_ingredients_from_text(paragraph))
        .collect()
}
