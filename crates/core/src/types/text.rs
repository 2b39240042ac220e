//! Text folding shared by ingestion and query parsing.
//!
//! Every string the ranking pipeline compares goes through [`normalize`] so
//! that `"Crêperie"`, `"creperie"` and `"CRÊPERIE !"` end up identical.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercases, folds French accents and ligatures, and collapses every run of
/// non-alphanumeric characters (punctuation, apostrophes, emoji) into a single
/// space. The result has no leading or trailing space.
pub fn normalize(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut pending_space = false;
    for ch in input.nfd().flat_map(char::to_lowercase) {
        if is_combining_mark(ch) {
            continue;
        }
        if !ch.is_alphanumeric() {
            pending_space = true;
            continue;
        }
        if pending_space && !output.is_empty() {
            output.push(' ');
        }
        pending_space = false;
        match ch {
            'œ' => output.push_str("oe"),
            'æ' => output.push_str("ae"),
            _ => output.push(ch),
        }
    }
    output
}

/// Strips a trailing plural mark (`s` or `x`) from words longer than three
/// characters.
pub fn stem(word: &str) -> &str {
    if word.chars().count() <= 3 {
        return word;
    }
    word.strip_suffix('s')
        .or_else(|| word.strip_suffix('x'))
        .unwrap_or(word)
}

/// Two words are related when they are equal, or when both are at least four
/// characters long and one is a prefix of the other.
pub fn words_related(left: &str, right: &str) -> bool {
    if left == right {
        return true;
    }
    if left.len() < 4 || right.len() < 4 {
        return false;
    }
    left.starts_with(right) || right.starts_with(left)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_accents_and_case() {
        assert_eq!(normalize("Crêperie Bretonne"), "creperie bretonne");
        assert_eq!(normalize("ŒUF À LA COQUE"), "oeuf a la coque");
        // already decomposed input folds the same way
        assert_eq!(normalize("Cre\u{0302}perie"), "creperie");
    }

    #[test]
    fn normalize_collapses_punctuation_and_emoji() {
        assert_eq!(normalize("  🍕 Pizza,  d'été !! "), "pizza d ete");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn stem_strips_plural_marks() {
        assert_eq!(stem("pizzas"), "pizza");
        assert_eq!(stem("jeux"), "jeu");
        assert_eq!(stem("bus"), "bus");
        assert_eq!(stem("bar"), "bar");
    }

    #[test]
    fn related_words_need_four_chars_for_prefixes() {
        assert!(words_related("kart", "karting"));
        assert!(words_related("pizzeria", "pizza"));
        assert!(words_related("bar", "bar"));
        assert!(!words_related("bar", "barbecue"));
    }
}
