//! Guess evaluation and the game session state machine.
//!
//! A session moves through `SelectingLanguage -> LoadingArticle -> Playing
//! -> Won`. A failed load goes back to `SelectingLanguage`; `Won` is final
//! until the session is reset.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::LoadError;
use crate::config::{GameConfig, Language, WinPolicy};
use crate::embed::Embedder;
use crate::load::{LoadProgress, LoadedGame, load_article};
use crate::matching::keys_match;
use crate::normalize::{is_numeric, normalize};
use crate::similarity::{Scored, SimilarityScorer};
use crate::source::{Article, ArticleSource, TextExtractor};
use crate::state::{RevealState, phrase_key};
use crate::suggest::Vocabulary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    SelectingLanguage,
    LoadingArticle,
    Playing,
    Won,
}

/// Overall outcome of one guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// The guess is in the article.
    Found,
    /// Not in the article, but the closest guess so far for some word.
    Close,
    Miss,
}

/// What one guess did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackSummary {
    /// The normalized guess.
    pub guess: String,
    /// Body tokens matching the guess, whether revealed now or earlier.
    pub exact_matches: usize,
    /// Body tokens whose best guess is this one.
    pub closest: usize,
    /// Keys this guess revealed for the first time.
    pub newly_revealed: usize,
    /// The same guess was submitted before.
    pub repeated: bool,
    pub won: bool,
}

impl FeedbackSummary {
    pub fn verdict(&self) -> Verdict {
        if self.exact_matches > 0 {
            Verdict::Found
        } else if self.closest > 0 {
            Verdict::Close
        } else {
            Verdict::Miss
        }
    }
}

/// Applies one guess to a [`RevealState`].
///
/// Exact matches are committed before any similarity is computed, so an
/// embedder failure only loses the similarity feedback for that guess.
pub struct GuessEvaluator<'a> {
    embedder: &'a dyn Embedder,
    scorer: SimilarityScorer,
    policy: WinPolicy,
}

impl<'a> GuessEvaluator<'a> {
    pub fn new(embedder: &'a dyn Embedder, scorer: SimilarityScorer, policy: WinPolicy) -> Self {
        Self {
            embedder,
            scorer,
            policy,
        }
    }

    /// Evaluate `raw` against `state`. Blank input is ignored and returns
    /// `None` without touching the state.
    pub fn evaluate(&self, state: &mut RevealState, raw: &str) -> Option<FeedbackSummary> {
        let guess = normalize(raw);
        if guess.is_empty() {
            return None;
        }

        state.record_guess(&guess);
        let repeated = state.guess_count(&guess) > 1;

        let mut matched: Vec<String> = Vec::new();
        let mut exact_matches = 0;
        for token in state.tokens_mut() {
            if keys_match(&guess, &token.key) {
                token.pin_exact();
                exact_matches += 1;
                matched.push(token.key.clone());
            }
        }
        for token in state.title_tokens_mut() {
            if keys_match(&guess, &token.key) {
                token.pin_exact();
                matched.push(token.key.clone());
            }
        }

        if self.policy == WinPolicy::TitleWordsOrFullTitle
            && phrase_key(&guess) == state.title_key()
        {
            debug!(%guess, "full title guessed");
            for token in state.title_tokens_mut() {
                token.pin_exact();
                matched.push(token.key.clone());
            }
        }

        let newly_revealed = matched.iter().filter(|key| state.reveal(key)).count();

        let scored = self.score(state, &guess);
        for Scored { index, similarity } in scored {
            state.tokens_mut()[index].raise(&guess, similarity);
        }

        let won = state.recompute_won();
        let closest = state
            .tokens()
            .iter()
            .filter(|t| t.best_guess() == Some(guess.as_str()))
            .count();

        Some(FeedbackSummary {
            guess,
            exact_matches,
            closest,
            newly_revealed,
            repeated,
            won,
        })
    }

    /// Close hidden tokens for `guess`, numbers by value and words by
    /// embedding.
    fn score(&self, state: &RevealState, guess: &str) -> Vec<Scored> {
        if is_numeric(guess) {
            return match guess.parse::<f64>() {
                Ok(value) => {
                    self.scorer
                        .score_numeric(value, state.tokens(), state.revealed_keys())
                }
                Err(_) => Vec::new(),
            };
        }

        match self.embedder.embed(guess) {
            Ok(vector) => {
                self.scorer
                    .score_lexical(&vector, state.tokens(), state.revealed_keys())
            }
            Err(e) => {
                warn!(%guess, error = %e, "could not embed guess, no similarity feedback");
                Vec::new()
            }
        }
    }
}

/// One player's game: the phase machine around a [`RevealState`].
pub struct Session {
    config: GameConfig,
    embedder: Arc<dyn Embedder>,
    phase: Phase,
    language: Option<Language>,
    article: Option<Article>,
    state: Option<RevealState>,
}

impl Session {
    pub fn new(config: GameConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            config,
            embedder,
            phase: Phase::SelectingLanguage,
            language: None,
            article: None,
            state: None,
        }
    }

    /// Load a new article in `language` and start playing it.
    ///
    /// On failure the session is back in `SelectingLanguage`.
    pub async fn start(
        &mut self,
        language: Language,
        source: Arc<dyn ArticleSource>,
        extractor: &dyn TextExtractor,
        progress: impl FnMut(LoadProgress),
    ) -> Result<(), LoadError> {
        self.reset();
        self.phase = Phase::LoadingArticle;
        self.language = Some(language);

        let loaded = load_article(
            language,
            source,
            extractor,
            Arc::clone(&self.embedder),
            &self.config,
            progress,
        )
        .await;

        match loaded {
            Ok(game) => {
                self.begin(language, game);
                Ok(())
            }
            Err(e) => {
                warn!(%language, error = %e, "article load failed");
                self.reset();
                Err(e)
            }
        }
    }

    /// Start playing an article loaded elsewhere.
    pub fn begin(&mut self, language: Language, game: LoadedGame) {
        info!(title = %game.article.title, %language, "game started");
        self.language = Some(language);
        self.article = Some(game.article);
        self.state = Some(game.state);
        self.phase = Phase::Playing;
    }

    /// Evaluate a guess. `None` for blank input or when no game is in
    /// progress.
    pub fn guess(&mut self, raw: &str) -> Option<FeedbackSummary> {
        if self.phase != Phase::Playing {
            return None;
        }
        let language = self.language?;
        let state = self.state.as_mut()?;

        let evaluator = GuessEvaluator::new(
            self.embedder.as_ref(),
            self.config.scorer(language),
            self.config.win_policy,
        );
        let summary = evaluator.evaluate(state, raw)?;

        if summary.won {
            state.reveal_rest_at_end();
            self.phase = Phase::Won;
            info!(guesses = state.guess_history().len(), "game won");
        }
        Some(summary)
    }

    /// "Did you mean" for a guess, using the configured cutoff.
    pub fn suggest<'v>(&self, raw: &str, vocabulary: &'v Vocabulary) -> Option<&'v str> {
        vocabulary.suggest(raw, self.config.suggestion_cutoff)
    }

    /// Drop the current game and go back to language selection.
    pub fn reset(&mut self) {
        self.phase = Phase::SelectingLanguage;
        self.language = None;
        self.article = None;
        self.state = None;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn language(&self) -> Option<Language> {
        self.language
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    pub fn state(&self) -> Option<&RevealState> {
        self.state.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
