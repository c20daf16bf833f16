//! "Did you mean" suggestions for misspelled guesses.

use std::collections::HashSet;
use std::io;
use std::path::Path;

/// A word list used to correct guesses.
///
/// Words keep file order, which breaks ties between equally close
/// suggestions.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashSet<String>,
}

impl Vocabulary {
    /// Load from a file with one word per line.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_str(&content))
    }

    /// Parse one word per line. Blank lines and lines starting with `#` are
    /// ignored; words are lower-cased and deduplicated.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Self {
        let mut vocabulary = Self::default();
        for line in content.lines() {
            let word = line.trim();
            if word.is_empty() || word.starts_with('#') {
                continue;
            }
            let word = word.to_lowercase();
            if vocabulary.index.insert(word.clone()) {
                vocabulary.words.push(word);
            }
        }
        vocabulary
    }

    /// Case-insensitive membership.
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(&word.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The closest word to `guess` with a similarity ratio of at least
    /// `cutoff`.
    ///
    /// Known words get no suggestion: a real word is never corrected into
    /// another one.
    pub fn suggest(&self, guess: &str, cutoff: f64) -> Option<&str> {
        let guess = guess.trim().to_lowercase();
        if guess.is_empty() || self.index.contains(&guess) {
            return None;
        }

        let mut best: Option<(&str, f64)> = None;
        for word in &self.words {
            let score = rapidfuzz::fuzz::ratio(guess.chars(), word.chars());
            if score >= cutoff && best.is_none_or(|(_, b)| score > b) {
                best = Some((word, score));
            }
        }
        best.map(|(word, _)| word)
    }
}
