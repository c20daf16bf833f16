//! Lexical matching between a guess and a hidden word.

use crate::normalize::normalize;

/// Inflectional suffixes accepted as variants of the same word.
const SUFFIXES: &[&str] = &["s", "es", "x"];

/// Words shorter than this (in chars) only match exactly.
const MIN_SUFFIX_STEM: usize = 3;

/// Check whether a guess reveals a target word.
///
/// Matches when both normalize to the same key, or when one key is the
/// other plus a plural-style suffix ("chat"/"chats", "bijou"/"bijoux",
/// "box"/"boxes"). Symmetric in its arguments.
pub fn words_match(guess: &str, target: &str) -> bool {
    keys_match(&normalize(guess), &normalize(target))
}

/// [`words_match`] for inputs that are already normalized.
pub fn keys_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    if a.is_empty() || b.is_empty() {
        return false;
    }

    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.chars().count() < MIN_SUFFIX_STEM {
        return false;
    }

    SUFFIXES
        .iter()
        .any(|suffix| long.strip_suffix(suffix) == Some(short))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_after_normalization() {
        assert!(words_match("Chat", "chat"));
        assert!(words_match("élève", "Eleve"));
        assert!(words_match("cœur", "coeur"));
        assert!(words_match("aelfred", "Ǣlfred"));
    }

    #[test]
    fn plural_suffixes() {
        assert!(words_match("chats", "chat"));
        assert!(words_match("chat", "chats"));
        assert!(words_match("bijoux", "bijou"));
        assert!(words_match("boxes", "box"));
        assert!(words_match("Chevaux", "chevau"));
    }

    #[test]
    fn accented_plural() {
        assert!(words_match("Élèves", "eleve"));
    }

    #[test]
    fn unrelated_words() {
        assert!(!words_match("chat", "chien"));
        assert!(!words_match("chat", "chatte"));
        assert!(!words_match("cat", "cats!"));
        assert!(!words_match("", "a"));
    }

    #[test]
    fn short_stems_only_match_exactly() {
        assert!(!words_match("os", "o"));
        assert!(!words_match("les", "le"));
        assert!(!words_match("ex", "e"));
        assert!(words_match("os", "OS"));
        assert!(!words_match("bus", "bu"));
        assert!(!words_match("ans", "an"));
    }

    #[test]
    fn three_char_stem_accepted() {
        assert!(words_match("rois", "roi"));
        assert!(words_match("feux", "feu"));
    }

    #[test]
    fn symmetric_on_samples() {
        let words = [
            "chat", "chats", "bijou", "bijoux", "box", "boxes", "os", "o", "le", "les", "Élève",
            "eleves", "roi", "rois", "", "xx", "x",
        ];
        for a in words {
            for b in words {
                assert_eq!(words_match(a, b), words_match(b, a), "{a:?} vs {b:?}");
            }
        }
    }
}
