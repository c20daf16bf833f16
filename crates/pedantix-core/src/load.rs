//! Turning a selected article into a playable game.

use std::sync::Arc;

use tracing::{debug, info};

use crate::LoadError;
use crate::config::{GameConfig, Language};
use crate::embed::Embedder;
use crate::select::CandidateSelector;
use crate::source::{Article, ArticleSource, Document, TextExtractor};
use crate::state::RevealState;
use crate::tokenize::{scan, tokenize};

/// Steps of [`load_article`], reported as they start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadProgress {
    SelectingArticle { candidates: usize },
    FetchingArticle { title: String },
    PreparingTokens { words: usize },
    Ready { title: String },
}

/// A prepared article and its fresh reveal state.
#[derive(Debug)]
pub struct LoadedGame {
    pub article: Article,
    pub state: RevealState,
}

/// Select, fetch, extract and tokenize an article for `language`.
///
/// Articles that turn out empty or shorter than `config.min_words` fail with
/// [`LoadError::EmptyArticle`] or [`LoadError::TooShort`]; a new call
/// selects again.
pub async fn load_article(
    language: Language,
    source: Arc<dyn ArticleSource>,
    extractor: &dyn TextExtractor,
    embedder: Arc<dyn Embedder>,
    config: &GameConfig,
    mut progress: impl FnMut(LoadProgress),
) -> Result<LoadedGame, LoadError> {
    progress(LoadProgress::SelectingArticle {
        candidates: config.candidate_count,
    });
    let candidate = CandidateSelector::from_config(Arc::clone(&source), config)
        .select(language)
        .await?;
    info!(
        title = %candidate.title,
        views = candidate.popularity,
        %language,
        "selected article"
    );

    progress(LoadProgress::FetchingArticle {
        title: candidate.title.clone(),
    });
    let document = source
        .fetch_document(&candidate.title, language)
        .await
        .map_err(|source| LoadError::Fetch {
            title: candidate.title.clone(),
            source,
        })?;

    prepare_game(document, extractor, embedder, config.min_words, progress).await
}

/// Extract and tokenize an already fetched document.
pub async fn prepare_game(
    document: Document,
    extractor: &dyn TextExtractor,
    embedder: Arc<dyn Embedder>,
    min_words: usize,
    mut progress: impl FnMut(LoadProgress),
) -> Result<LoadedGame, LoadError> {
    let Document {
        title,
        raw_markup,
        url,
    } = document;

    let text = extractor.extract(&raw_markup);
    if text.trim().is_empty() {
        return Err(LoadError::EmptyArticle { title });
    }

    let words = scan(&text).len();
    if words < min_words {
        debug!(%title, words, min_words, "article rejected as too short");
        return Err(LoadError::TooShort {
            title,
            words,
            min: min_words,
        });
    }

    progress(LoadProgress::PreparingTokens { words });
    let body = text.clone();
    let heading = title.clone();
    let (tokens, title_tokens) = tokio::task::spawn_blocking(move || {
        let tokens = tokenize(&body, embedder.as_ref());
        let title_tokens = tokenize(&heading, embedder.as_ref());
        (tokens, title_tokens)
    })
    .await
    .map_err(|e| LoadError::Worker(e.to_string()))?;

    if title_tokens.is_empty() {
        return Err(LoadError::UntitledArticle { title });
    }

    info!(%title, words, %url, "article ready");
    progress(LoadProgress::Ready {
        title: title.clone(),
    });

    Ok(LoadedGame {
        article: Article { title, text, url },
        state: RevealState::new(tokens, title_tokens),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmbedError;

    struct Flat;

    impl Embedder for Flat {
        fn dimension(&self) -> usize {
            2
        }

        fn embed(&self, _token: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(vec![1.0, 0.0])
        }
    }

    /// Markup is already plain text.
    struct Verbatim;

    impl TextExtractor for Verbatim {
        fn extract(&self, raw_markup: &str) -> String {
            raw_markup.trim().to_string()
        }
    }

    fn document(title: &str, text: &str) -> Document {
        Document {
            title: title.to_string(),
            raw_markup: text.to_string(),
            url: format!("https://fr.wikipedia.org/wiki/{title}"),
        }
    }

    #[tokio::test]
    async fn prepares_tokens_and_state() {
        let mut events = Vec::new();
        let game = prepare_game(
            document("Chat", "Le chat noir dort."),
            &Verbatim,
            Arc::new(Flat),
            3,
            |e| events.push(e),
        )
        .await
        .unwrap();

        assert_eq!(game.article.text, "Le chat noir dort.");
        assert_eq!(game.state.tokens().len(), 4);
        assert_eq!(game.state.title_tokens().len(), 1);
        assert!(game.state.tokens()[1].embedding.is_some());
        assert_eq!(
            events,
            vec![
                LoadProgress::PreparingTokens { words: 4 },
                LoadProgress::Ready {
                    title: "Chat".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn empty_text_is_its_own_failure() {
        let err = prepare_game(document("Vide", "   "), &Verbatim, Arc::new(Flat), 0, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::EmptyArticle { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn short_text_is_rejected() {
        let err = prepare_game(
            document("Court", "Trois mots seulement"),
            &Verbatim,
            Arc::new(Flat),
            250,
            |_| {},
        )
        .await
        .unwrap_err();
        match err {
            LoadError::TooShort { words, min, .. } => {
                assert_eq!(words, 3);
                assert_eq!(min, 250);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn title_without_words_is_rejected() {
        let err = prepare_game(
            document("1 + 2", "Une addition tout à fait ordinaire."),
            &Verbatim,
            Arc::new(Flat),
            1,
            |_| {},
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LoadError::UntitledArticle { .. }));
    }
}
