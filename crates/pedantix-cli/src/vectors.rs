//! Word vectors loaded from a fastText/word2vec text file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, bail};
use pedantix_core::{EmbedError, Embedder};

/// An in-memory table of word vectors.
///
/// Lookups try the word as given, then lower-cased. Unknown words embed to
/// the zero vector, which the scorer treats as "no similarity".
pub struct KeyedVectors {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl KeyedVectors {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file =
            File::open(path).with_context(|| format!("cannot open vectors {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot read vectors {}", path.display()))
    }

    /// Parse `word v1 .. vD` lines, with an optional `count dimension`
    /// header line.
    pub fn from_reader(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut dimension = None;
        let mut vectors = HashMap::new();
        let mut skipped = 0usize;

        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let rest: Vec<&str> = fields.collect();

            if n == 0 && rest.len() == 1 && word.parse::<usize>().is_ok() {
                if let Ok(d) = rest[0].parse::<usize>() {
                    dimension = Some(d);
                    continue;
                }
            }

            let values = rest
                .iter()
                .map(|v| v.parse::<f32>())
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("line {}: invalid number", n + 1))?;

            if values.is_empty() {
                skipped += 1;
                continue;
            }
            let expected = *dimension.get_or_insert(values.len());
            if values.len() != expected {
                skipped += 1;
                continue;
            }
            vectors.entry(word.to_string()).or_insert(values);
        }

        if skipped > 0 {
            tracing::warn!(skipped, "vector lines with the wrong dimension ignored");
        }
        let Some(dimension) = dimension.filter(|d| *d > 0) else {
            bail!("no vectors found");
        };
        tracing::info!(words = vectors.len(), dimension, "word vectors loaded");
        Ok(Self { dimension, vectors })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.vectors
            .get(word)
            .or_else(|| self.vectors.get(&word.to_lowercase()))
            .map(Vec::as_slice)
    }
}

impl Embedder for KeyedVectors {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, token: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(self
            .get(token)
            .map(<[f32]>::to_vec)
            .unwrap_or_else(|| vec![0.0; self.dimension]))
    }
}
