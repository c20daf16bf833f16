//! Splitting article text into positioned, normalized tokens.
//!
//! Offsets are **char** positions, not byte positions, so a renderer can
//! splice masked and revealed spans back into the original text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::embed::Embedder;
use crate::normalize::{fold_ligatures, is_numeric, normalize};

/// Maximal runs of letters, marks and decimal digits. The underscore is
/// included so that `scan` can drop identifiers like `foo_bar` whole.
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{M}\p{Nd}_]+").unwrap());

/// A word occurrence located in the source text, before embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub surface: String,
    /// Char offset of the first character.
    pub start: usize,
    /// Char offset one past the last character.
    pub end: usize,
}

/// A guessable word of the hidden article.
#[derive(Debug, Clone, Serialize)]
pub struct Token {
    /// The word exactly as written in the source.
    pub surface: String,
    /// Comparison key, shared by every occurrence of the same word.
    pub key: String,
    pub start: usize,
    pub end: usize,
    /// Word vector; `None` for numbers and when the embedder failed.
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
    best_guess: Option<String>,
    best_similarity: f32,
}

impl Token {
    /// Build a token with no guess history.
    pub fn new(span: Span, embedding: Option<Vec<f32>>) -> Self {
        let key = normalize(&span.surface);
        Self {
            surface: span.surface,
            key,
            start: span.start,
            end: span.end,
            embedding,
            best_guess: None,
            best_similarity: 0.0,
        }
    }

    /// Whether this token is a plain number (ASCII digits only).
    pub fn is_numeric(&self) -> bool {
        is_numeric(&self.surface)
    }

    /// The token's value when it is a number.
    pub fn numeric_value(&self) -> Option<f64> {
        if self.is_numeric() {
            self.surface.parse().ok()
        } else {
            None
        }
    }

    /// The closest guess submitted so far, if any cleared the threshold.
    pub fn best_guess(&self) -> Option<&str> {
        self.best_guess.as_deref()
    }

    /// Similarity of [`best_guess`](Self::best_guess); 1.0 once revealed.
    pub fn best_similarity(&self) -> f32 {
        self.best_similarity
    }

    /// Length of the surface form in chars.
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }

    /// Record `guess` as the best guess if `similarity` strictly beats the
    /// current one. Returns whether it did.
    pub(crate) fn raise(&mut self, guess: &str, similarity: f32) -> bool {
        if similarity > self.best_similarity {
            self.best_similarity = similarity;
            self.best_guess = Some(guess.to_string());
            true
        } else {
            false
        }
    }

    /// An exact match dominates any similarity.
    pub(crate) fn pin_exact(&mut self) {
        self.best_similarity = self.best_similarity.max(1.0);
    }
}

/// Locate every guessable word in `text`.
///
/// Words containing an underscore are dropped, as are single-character
/// words unless the character is alphabetic ("a" and "l" stay, "5" goes).
pub fn scan(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut byte_cursor = 0;
    let mut char_cursor = 0;

    for m in WORD_RE.find_iter(text) {
        let word = m.as_str();
        if word.contains('_') {
            continue;
        }
        let mut chars = word.chars();
        let first = chars.next();
        if chars.next().is_none() && !first.is_some_and(char::is_alphabetic) {
            continue;
        }

        char_cursor += text[byte_cursor..m.start()].chars().count();
        let len = word.chars().count();
        spans.push(Span {
            surface: word.to_string(),
            start: char_cursor,
            end: char_cursor + len,
        });
        char_cursor += len;
        byte_cursor = m.end();
    }

    spans
}

/// Scan `text` and embed every lexical word with one batched call.
///
/// Numbers are not sent to the embedder; they are scored numerically. If
/// the batch fails, tokens are still returned without embeddings.
pub fn tokenize(text: &str, embedder: &dyn Embedder) -> Vec<Token> {
    let spans = scan(text);

    let words: Vec<String> = spans
        .iter()
        .filter(|s| !is_numeric(&s.surface))
        .map(|s| fold_ligatures(&s.surface))
        .collect();

    let mut vectors = if words.is_empty() {
        None
    } else {
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        match embedder.embed_batch(&refs) {
            Ok(v) if v.len() == refs.len() => Some(v.into_iter()),
            Ok(v) => {
                warn!(
                    expected = refs.len(),
                    got = v.len(),
                    "embedding batch length mismatch, tokens left without vectors"
                );
                None
            }
            Err(e) => {
                warn!(error = %e, "embedding batch failed, tokens left without vectors");
                None
            }
        }
    };

    spans
        .into_iter()
        .map(|span| {
            let embedding = if is_numeric(&span.surface) {
                None
            } else {
                vectors.as_mut().and_then(Iterator::next)
            };
            Token::new(span, embedding)
        })
        .collect()
}

/// Substring of `text` between two char offsets.
pub fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    let byte_at = |n: usize| {
        text.char_indices()
            .nth(n)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    };
    let from = byte_at(start);
    let to = if end <= start { from } else { byte_at(end) };
    &text[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmbedError;
    use std::sync::Mutex;

    /// Records every batch it receives; vectors encode the word length.
    struct Recorder {
        batches: Mutex<Vec<Vec<String>>>,
        fail: bool,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
                fail: false,
            }
        }
    }

    impl Embedder for Recorder {
        fn dimension(&self) -> usize {
            1
        }

        fn embed(&self, token: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(vec![token.chars().count() as f32])
        }

        fn embed_batch(&self, tokens: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
            self.batches
                .lock()
                .unwrap()
                .push(tokens.iter().map(|t| t.to_string()).collect());
            if self.fail {
                return Err(EmbedError::Backend("offline".into()));
            }
            tokens.iter().map(|t| self.embed(t)).collect()
        }
    }

    fn surfaces(spans: &[Span]) -> Vec<&str> {
        spans.iter().map(|s| s.surface.as_str()).collect()
    }

    #[test]
    fn scan_splits_on_punctuation() {
        let spans = scan("Le chat noir dort.");
        assert_eq!(surfaces(&spans), vec!["Le", "chat", "noir", "dort"]);
        assert_eq!((spans[1].start, spans[1].end), (3, 7));
    }

    #[test]
    fn scan_drops_underscored_and_lone_digits() {
        let spans = scan("foo_bar a 5 l'homme 42 x");
        assert_eq!(surfaces(&spans), vec!["a", "l", "homme", "42", "x"]);
    }

    #[test]
    fn offsets_are_char_positions() {
        let text = "Éléphant été à Zürich";
        let spans = scan(text);
        assert_eq!(surfaces(&spans), vec!["Éléphant", "été", "à", "Zürich"]);
        for span in &spans {
            assert_eq!(slice_chars(text, span.start, span.end), span.surface);
        }
        assert_eq!(spans[3].start, 15);
    }

    #[test]
    fn scan_splits_on_other_connectors() {
        assert_eq!(surfaces(&scan("foo‿bar")), ["foo", "bar"]);
        assert_eq!(surfaces(&scan("a⁀b x\u{200D}y")), ["a", "b", "x", "y"]);
    }

    #[test]
    fn scan_handles_non_latin_letters() {
        let spans = scan("Москва — столица");
        assert_eq!(surfaces(&spans), vec!["Москва", "столица"]);
    }

    #[test]
    fn tokenize_batches_once_and_skips_numbers() {
        let embedder = Recorder::new();
        let tokens = tokenize("Waterloo 1815 cœur", &embedder);

        let batches = embedder.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], vec!["Waterloo", "coeur"]);

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].embedding, Some(vec![8.0]));
        assert!(tokens[1].is_numeric());
        assert!(tokens[1].embedding.is_none());
        assert_eq!(tokens[1].numeric_value(), Some(1815.0));
        assert_eq!(tokens[2].key, "coeur");
        assert_eq!(tokens[2].surface, "cœur");
        assert_eq!(tokens[2].embedding, Some(vec![5.0]));
    }

    #[test]
    fn tokenize_survives_embedder_failure() {
        let mut embedder = Recorder::new();
        embedder.fail = true;
        let tokens = tokenize("Le chat", &embedder);
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| t.embedding.is_none()));
        assert_eq!(tokens[1].key, "chat");
    }

    #[test]
    fn tokenize_numbers_only_skips_embedder() {
        let embedder = Recorder::new();
        let tokens = tokenize("1914 1918", &embedder);
        assert_eq!(tokens.len(), 2);
        assert!(embedder.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn repeated_words_share_a_key() {
        let embedder = Recorder::new();
        let tokens = tokenize("Chat, chat et CHAT", &embedder);
        let keys: Vec<&str> = tokens.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["chat", "chat", "et", "chat"]);
    }

    #[test]
    fn raise_is_strict() {
        let mut token = Token::new(scan("noir").remove(0), None);
        assert!(token.raise("sombre", 0.6));
        assert!(!token.raise("obscur", 0.6));
        assert_eq!(token.best_guess(), Some("sombre"));
        assert!(!token.raise("gris", 0.5));
        assert_eq!(token.best_similarity(), 0.6);
        token.pin_exact();
        assert_eq!(token.best_similarity(), 1.0);
    }

    #[test]
    fn slice_chars_clamps() {
        assert_eq!(slice_chars("abc", 1, 10), "bc");
        assert_eq!(slice_chars("abc", 5, 9), "");
        assert_eq!(slice_chars("abc", 2, 1), "");
    }
}
