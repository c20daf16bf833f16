//! Guess evaluation engine for a hidden-article word guessing game.
//!
//! A game picks a popular article, hides every word of its title and text,
//! and lets the player reveal words by guessing them. Guesses that are not
//! in the text still give feedback: the closest hidden words (by embedding
//! similarity, or numeric distance for numbers) display the guess on top
//! of their mask.
//!
//! The engine performs no I/O of its own. Article retrieval, text
//! extraction and word vectors come in through the [`ArticleSource`],
//! [`TextExtractor`] and [`Embedder`] traits.

pub mod config;
pub mod embed;
pub mod game;
pub mod load;
pub mod matching;
pub mod normalize;
pub mod select;
pub mod similarity;
pub mod source;
pub mod state;
pub mod suggest;
pub mod tokenize;

pub use config::{GameConfig, Language, LanguageProfile, WinPolicy};
pub use embed::Embedder;
pub use game::{FeedbackSummary, GuessEvaluator, Phase, Session, Verdict};
pub use load::{LoadProgress, LoadedGame, load_article, prepare_game};
pub use matching::{keys_match, words_match};
pub use normalize::normalize;
pub use select::{Candidate, CandidateSelector};
pub use similarity::{Scored, SimilarityScorer, cosine_similarity, numeric_similarity};
pub use source::{Article, ArticleSource, Document, TextExtractor};
pub use state::{Progress, RevealState, phrase_key};
pub use suggest::Vocabulary;
pub use tokenize::{Span, Token, scan, tokenize};

/// Failure of a single collaborator fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("page not found: {0}")]
    NotFound(String),
    #[error("rate limited")]
    RateLimited,
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Failure of the embedding backend.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("embedding backend failed: {0}")]
    Backend(String),
    #[error("embedding batch returned {got} vectors for {expected} tokens")]
    BatchLength { expected: usize, got: usize },
}

/// Article selection failed outright.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("no candidate article survived ({attempted} fetches attempted)")]
    NoCandidates { attempted: usize },
}

/// Loading a playable article failed.
///
/// `TooShort` and `EmptyArticle` mean the chosen article is unusable, not
/// that the network is down; callers typically retry with a new selection.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Selection(#[from] SelectError),
    #[error("failed to fetch article {title:?}: {source}")]
    Fetch {
        title: String,
        #[source]
        source: FetchError,
    },
    #[error("article {title:?} has no text after extraction")]
    EmptyArticle { title: String },
    #[error("article {title:?} is too short: {words} words, need {min}")]
    TooShort {
        title: String,
        words: usize,
        min: usize,
    },
    #[error("article title {title:?} contains no guessable word")]
    UntitledArticle { title: String },
    #[error("tokenizer task failed: {0}")]
    Worker(String),
}

impl LoadError {
    /// Whether a fresh selection might succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LoadError::Worker(_))
    }
}

/// Invalid or unreadable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
