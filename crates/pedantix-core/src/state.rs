//! Per-game reveal state.

use std::collections::HashSet;

use serde::Serialize;

use crate::normalize::normalize;
use crate::tokenize::{Token, scan};

/// How much of the article body has been found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Distinct body words revealed.
    pub revealed: usize,
    /// Distinct body words.
    pub total: usize,
}

impl Progress {
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.revealed as f64 / self.total as f64
        }
    }
}

/// Everything one game knows: the hidden tokens, which keys the player has
/// found, and every guess submitted.
///
/// Owned by a single session. Mutated only through the guess evaluator.
#[derive(Debug, Clone)]
pub struct RevealState {
    tokens: Vec<Token>,
    title_tokens: Vec<Token>,
    title_key: String,
    all_keys: HashSet<String>,
    revealed_keys: HashSet<String>,
    revealed_at_end: HashSet<String>,
    guess_history: Vec<String>,
    won: bool,
}

impl RevealState {
    pub fn new(tokens: Vec<Token>, title_tokens: Vec<Token>) -> Self {
        let title_key = title_tokens
            .iter()
            .map(|t| t.key.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let all_keys = tokens
            .iter()
            .chain(&title_tokens)
            .map(|t| t.key.clone())
            .collect();
        let mut state = Self {
            tokens,
            title_tokens,
            title_key,
            all_keys,
            revealed_keys: HashSet::new(),
            revealed_at_end: HashSet::new(),
            guess_history: Vec::new(),
            won: false,
        };
        state.recompute_won();
        state
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn title_tokens(&self) -> &[Token] {
        &self.title_tokens
    }

    /// Normalized title words joined by single spaces.
    pub fn title_key(&self) -> &str {
        &self.title_key
    }

    pub fn revealed_keys(&self) -> &HashSet<String> {
        &self.revealed_keys
    }

    /// Keys shown only because the game ended.
    pub fn revealed_at_end(&self) -> &HashSet<String> {
        &self.revealed_at_end
    }

    /// Normalized guesses in submission order, repeats included.
    pub fn guess_history(&self) -> &[String] {
        &self.guess_history
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_revealed(&self, key: &str) -> bool {
        self.revealed_keys.contains(key)
    }

    /// Whether a renderer should print the token's surface form.
    pub fn is_visible(&self, token: &Token) -> bool {
        self.revealed_keys.contains(&token.key) || self.revealed_at_end.contains(&token.key)
    }

    /// How many times `key` was guessed.
    pub fn guess_count(&self, key: &str) -> usize {
        self.guess_history.iter().filter(|g| *g == key).count()
    }

    pub fn progress(&self) -> Progress {
        let total: HashSet<&str> = self.tokens.iter().map(|t| t.key.as_str()).collect();
        let revealed = total
            .iter()
            .filter(|k| self.revealed_keys.contains(**k))
            .count();
        Progress {
            revealed,
            total: total.len(),
        }
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    pub(crate) fn title_tokens_mut(&mut self) -> &mut [Token] {
        &mut self.title_tokens
    }

    pub(crate) fn record_guess(&mut self, key: &str) {
        self.guess_history.push(key.to_string());
    }

    /// Reveal `key`. Keys that no token carries are refused. Returns whether
    /// the key was newly revealed.
    pub(crate) fn reveal(&mut self, key: &str) -> bool {
        if !self.all_keys.contains(key) {
            return false;
        }
        self.revealed_keys.insert(key.to_string())
    }

    /// Re-derive `won` from the revealed keys.
    pub(crate) fn recompute_won(&mut self) -> bool {
        self.won = !self.title_tokens.is_empty()
            && self
                .title_tokens
                .iter()
                .all(|t| self.revealed_keys.contains(&t.key));
        self.won
    }

    /// Mark every key the player did not find for display.
    pub(crate) fn reveal_rest_at_end(&mut self) {
        for key in &self.all_keys {
            if !self.revealed_keys.contains(key) {
                self.revealed_at_end.insert(key.clone());
            }
        }
    }
}

/// Words of `text` normalized and joined by single spaces.
///
/// Punctuation and spacing are ignored, so "Le Petit-Prince" and
/// "le petit prince" give the same key.
pub fn phrase_key(text: &str) -> String {
    scan(text)
        .iter()
        .map(|span| normalize(&span.surface))
        .collect::<Vec<_>>()
        .join(" ")
}
