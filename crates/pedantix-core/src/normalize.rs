//! Comparison keys for words.
//!
//! Two surface forms that differ only by case, surrounding whitespace,
//! diacritics or typographic ligatures share one key: "Élève", "eleve" and
//! " ÉLÈVE " all normalize to `"eleve"`, and "cœur" to `"coeur"`.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// General category Mn. Spacing marks (Mc) stay.
static NONSPACING_MARK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Mn}+").unwrap());

/// Canonicalize a word into its comparison key.
///
/// Lower-cases, decomposes (NFD), drops nonspacing marks, folds
/// ligatures, then trims surrounding whitespace. Total and idempotent.
///
/// Folding runs after decomposition so that precomposed forms such as
/// "ǣ" reach the table as "æ".
pub fn normalize(word: &str) -> String {
    let decomposed: String = word.to_lowercase().nfd().collect();
    let stripped = NONSPACING_MARK_RE.replace_all(&decomposed, "");
    fold_ligatures(&stripped).trim().to_string()
}

/// Expand ligatures that NFD leaves intact.
pub fn fold_ligatures(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        match c {
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("Oe"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("Ae"),
            '\u{FB00}' => out.push_str("ff"),
            '\u{FB01}' => out.push_str("fi"),
            '\u{FB02}' => out.push_str("fl"),
            '\u{FB03}' => out.push_str("ffi"),
            '\u{FB04}' => out.push_str("ffl"),
            '\u{FB05}' | '\u{FB06}' => out.push_str("st"),
            other => out.push(other),
        }
    }
    out
}

/// Whether `key` is a non-empty run of ASCII digits.
pub fn is_numeric(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}
