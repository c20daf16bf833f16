//! Word vector capability.
//!
//! The engine only needs to turn words into vectors. Any model (fastText,
//! a keyed-vector table, a remote service) plugs in by implementing
//! [`Embedder`]. Implementations are shared read-only between sessions, so
//! they must be `Send + Sync`.

use crate::EmbedError;

/// Trait for word embedding backends.
pub trait Embedder: Send + Sync {
    /// Length of every vector this backend returns.
    fn dimension(&self) -> usize;

    /// Embed a single word.
    ///
    /// Out-of-vocabulary words should embed to a zero vector rather than
    /// fail; errors are for backend outages.
    fn embed(&self, token: &str) -> Result<Vec<f32>, EmbedError>;

    /// Embed many words in one call, same length and order as `tokens`.
    ///
    /// Backends with per-call overhead should override this.
    fn embed_batch(&self, tokens: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        tokens.iter().map(|t| self.embed(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    impl Embedder for Counting {
        fn dimension(&self) -> usize {
            2
        }

        fn embed(&self, token: &str) -> Result<Vec<f32>, EmbedError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if token == "boom" {
                return Err(EmbedError::Backend("boom".into()));
            }
            Ok(vec![token.len() as f32, 1.0])
        }
    }

    #[test]
    fn default_batch_preserves_order() {
        let e = Counting {
            calls: AtomicUsize::new(0),
        };
        let out = e.embed_batch(&["a", "abc", "ab"]).unwrap();
        assert_eq!(out, vec![vec![1.0, 1.0], vec![3.0, 1.0], vec![2.0, 1.0]]);
        assert_eq!(e.calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn default_batch_propagates_failure() {
        let e = Counting {
            calls: AtomicUsize::new(0),
        };
        assert!(e.embed_batch(&["a", "boom", "b"]).is_err());
    }
}
