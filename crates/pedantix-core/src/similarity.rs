//! Closeness between a guess and the words still hidden.
//!
//! Words are compared by cosine similarity of their embeddings. Numbers are
//! compared by a Gaussian kernel on their distance, so "1812" is close to
//! "1815" even though their vectors are unrelated.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::tokenize::Token;

/// Similarity of one hidden token to the current guess.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scored {
    /// Position of the token in the scored slice.
    pub index: usize,
    pub similarity: f32,
}

/// Scores a guess against hidden tokens, keeping only close ones.
///
/// Pure: callers decide what to do with the results.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityScorer {
    threshold: f32,
    sigma: f64,
}

impl SimilarityScorer {
    /// `threshold`: minimum similarity (exclusive) worth reporting.
    /// `sigma`: width of the numeric kernel.
    pub fn new(threshold: f32, sigma: f64) -> Self {
        Self { threshold, sigma }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Cosine similarity of `guess` against every hidden lexical token.
    pub fn score_lexical(
        &self,
        guess: &[f32],
        tokens: &[Token],
        revealed: &HashSet<String>,
    ) -> Vec<Scored> {
        if norm(guess) == 0.0 {
            warn!("zero guess vector, no similarity computed");
            return Vec::new();
        }

        let mut degenerate = 0usize;
        let scored: Vec<Scored> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !revealed.contains(&t.key))
            .map(|(index, token)| {
                let similarity = match &token.embedding {
                    Some(v) if norm(v) > 0.0 => cosine_similarity(guess, v),
                    _ => {
                        if !token.is_numeric() {
                            degenerate += 1;
                        }
                        0.0
                    }
                };
                Scored { index, similarity }
            })
            .collect();

        if degenerate > 0 {
            warn!(degenerate, "hidden tokens without usable vectors scored as 0");
        }
        self.keep_close(scored)
    }

    /// Numeric closeness of `guess` against every hidden number.
    pub fn score_numeric(
        &self,
        guess: f64,
        tokens: &[Token],
        revealed: &HashSet<String>,
    ) -> Vec<Scored> {
        let scored: Vec<Scored> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !revealed.contains(&t.key))
            .filter_map(|(index, token)| {
                let value = token.numeric_value()?;
                Some(Scored {
                    index,
                    similarity: numeric_similarity(guess, value, self.sigma) as f32,
                })
            })
            .collect();
        self.keep_close(scored)
    }

    /// Drop everything at or below the threshold, best first. Ties keep
    /// text order.
    fn keep_close(&self, scored: Vec<Scored>) -> Vec<Scored> {
        let mut close: Vec<Scored> = scored
            .into_iter()
            .filter(|s| s.similarity > self.threshold)
            .collect();
        close.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        close
    }
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity; 0 for empty, mismatched or zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = norm(a);
    let norm_b = norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let sim = dot / (norm_a * norm_b);
    if sim.is_finite() { sim } else { 0.0 }
}

/// Gaussian kernel `exp(-(a-b)² / 2σ²)`: 1 for equal numbers, decaying
/// with distance.
pub fn numeric_similarity(a: f64, b: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return if a == b { 1.0 } else { 0.0 };
    }
    let d = a - b;
    let s = (-(d * d) / (2.0 * sigma * sigma)).exp();
    if s.is_finite() { s } else { 0.0 }
}
