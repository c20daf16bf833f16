//! Collaborators that supply articles.
//!
//! An [`ArticleSource`] picks random titles, rates their popularity and
//! downloads their markup; a [`TextExtractor`] turns that markup into
//! prose. Both are implemented outside the engine (see `pedantix-wiki`).

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::FetchError;
use crate::config::Language;

/// Boxed future returned by [`ArticleSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A fetched article, markup not yet cleaned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub raw_markup: String,
    pub url: String,
}

/// An article reduced to the prose the game hides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Remote catalogue of articles.
pub trait ArticleSource: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Title of a random article.
    fn fetch_random_title<'a>(
        &'a self,
        language: Language,
    ) -> SourceFuture<'a, Result<String, FetchError>>;

    /// Views of `title` over the last `window_days` days.
    ///
    /// Never fails: any error reads as zero views.
    fn fetch_popularity<'a>(
        &'a self,
        language: Language,
        title: &'a str,
        window_days: u32,
    ) -> SourceFuture<'a, u64>;

    /// Full markup of `title`. Missing pages are [`FetchError::NotFound`].
    fn fetch_document<'a>(
        &'a self,
        title: &'a str,
        language: Language,
    ) -> SourceFuture<'a, Result<Document, FetchError>>;
}

/// Turns article markup into clean prose.
pub trait TextExtractor: Send + Sync {
    /// Returns an empty string when nothing usable remains.
    fn extract(&self, raw_markup: &str) -> String;
}
