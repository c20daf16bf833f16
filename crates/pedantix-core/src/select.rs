//! Picking the article to play.
//!
//! Random articles are mostly obscure stubs, so a game samples many random
//! titles at once, rates each by recent page views, and plays the most
//! viewed one. Samples are independent: one failing fetch only removes
//! that sample from the ranking.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::SelectError;
use crate::config::{GameConfig, Language};
use crate::source::ArticleSource;

/// How many of the best candidates to log after ranking.
const LOGGED_CANDIDATES: usize = 5;

/// A sampled article and its popularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub title: String,
    pub popularity: u64,
}

/// Samples random articles concurrently and ranks them by popularity.
pub struct CandidateSelector {
    source: Arc<dyn ArticleSource>,
    count: usize,
    window_days: u32,
    max_in_flight: usize,
}

impl CandidateSelector {
    /// Sample `count` articles, all in flight at once, over a 30-day window.
    pub fn new(source: Arc<dyn ArticleSource>, count: usize) -> Self {
        Self {
            source,
            count,
            window_days: 30,
            max_in_flight: count.max(1),
        }
    }

    pub fn from_config(source: Arc<dyn ArticleSource>, config: &GameConfig) -> Self {
        Self::new(source, config.candidate_count)
            .with_window_days(config.popularity_window_days)
            .with_max_in_flight(config.max_concurrent_fetches)
    }

    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max.max(1);
        self
    }

    /// The most popular sampled article.
    ///
    /// Fails only when every sample failed. Equal popularity keeps sampling
    /// order.
    pub async fn select(&self, language: Language) -> Result<Candidate, SelectError> {
        let ranked = self.rank(language).await?;
        ranked
            .into_iter()
            .next()
            .ok_or(SelectError::NoCandidates {
                attempted: self.count,
            })
    }

    /// Every surviving sample, most popular first.
    ///
    /// Waits for all samples; slow ones are not cancelled.
    pub async fn rank(&self, language: Language) -> Result<Vec<Candidate>, SelectError> {
        let permits = Arc::new(Semaphore::new(self.max_in_flight));

        let handles: Vec<_> = (0..self.count)
            .map(|slot| {
                let source = Arc::clone(&self.source);
                let permits = Arc::clone(&permits);
                let window_days = self.window_days;
                tokio::spawn(async move {
                    let _permit = permits.acquire_owned().await.ok()?;
                    sample(source.as_ref(), language, window_days, slot).await
                })
            })
            .collect();

        let mut candidates = Vec::with_capacity(self.count);
        for (slot, joined) in join_all(handles).await.into_iter().enumerate() {
            match joined {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => {}
                Err(e) => warn!(slot, error = %e, "candidate task aborted"),
            }
        }

        if candidates.is_empty() {
            warn!(
                source = self.source.name(),
                attempted = self.count,
                "every candidate fetch failed"
            );
            return Err(SelectError::NoCandidates {
                attempted: self.count,
            });
        }

        // Stable: ties stay in sampling order.
        candidates.sort_by(|a, b| b.popularity.cmp(&a.popularity));

        info!(
            survived = candidates.len(),
            attempted = self.count,
            "ranked candidate articles"
        );
        for c in candidates.iter().take(LOGGED_CANDIDATES) {
            info!(title = %c.title, views = c.popularity, "candidate");
        }

        Ok(candidates)
    }
}

/// Fetch one random title and its popularity.
async fn sample(
    source: &dyn ArticleSource,
    language: Language,
    window_days: u32,
    slot: usize,
) -> Option<Candidate> {
    let title = match source.fetch_random_title(language).await {
        Ok(title) if !title.trim().is_empty() => title,
        Ok(_) => {
            debug!(slot, "random title was empty");
            return None;
        }
        Err(e) => {
            debug!(slot, error = %e, "random title fetch failed");
            return None;
        }
    };
    let popularity = source
        .fetch_popularity(language, &title, window_days)
        .await;
    debug!(slot, %title, popularity, "sampled candidate");
    Some(Candidate { title, popularity })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchError;
    use crate::source::{Document, SourceFuture};
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Hands out scripted titles in call order; popularity from a table.
    struct Scripted {
        titles: Mutex<VecDeque<Result<String, FetchError>>>,
        views: HashMap<String, u64>,
        delay: HashMap<String, Duration>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Scripted {
        fn new(titles: Vec<Result<&str, FetchError>>, views: &[(&str, u64)]) -> Self {
            Self {
                titles: Mutex::new(
                    titles
                        .into_iter()
                        .map(|t| t.map(str::to_string))
                        .collect(),
                ),
                views: views.iter().map(|(t, v)| (t.to_string(), *v)).collect(),
                delay: HashMap::new(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, title: &str, delay: Duration) -> Self {
            self.delay.insert(title.to_string(), delay);
            self
        }
    }

    impl ArticleSource for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn fetch_random_title<'a>(
            &'a self,
            _language: Language,
        ) -> SourceFuture<'a, Result<String, FetchError>> {
            let next = self
                .titles
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Network("exhausted".into())));
            Box::pin(async move { next })
        }

        fn fetch_popularity<'a>(
            &'a self,
            _language: Language,
            title: &'a str,
            _window_days: u32,
        ) -> SourceFuture<'a, u64> {
            Box::pin(async move {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                let delay = self
                    .delay
                    .get(title)
                    .copied()
                    .unwrap_or(Duration::from_millis(10));
                tokio::time::sleep(delay).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                self.views.get(title).copied().unwrap_or(0)
            })
        }

        fn fetch_document<'a>(
            &'a self,
            title: &'a str,
            _language: Language,
        ) -> SourceFuture<'a, Result<Document, FetchError>> {
            Box::pin(async move { Err(FetchError::NotFound(title.to_string())) })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn picks_most_popular() {
        let source = Scripted::new(
            vec![Ok("Obscure"), Ok("Paris"), Ok("Stub")],
            &[("Obscure", 3), ("Paris", 90_000), ("Stub", 12)],
        );
        let selector = CandidateSelector::new(Arc::new(source), 3);
        let best = selector.select(Language::Fr).await.unwrap();
        assert_eq!(best.title, "Paris");
        assert_eq!(best.popularity, 90_000);
    }

    #[tokio::test(start_paused = true)]
    async fn partial_failures_are_ignored() {
        let source = Scripted::new(
            vec![
                Err(FetchError::Network("reset".into())),
                Ok("Lyon"),
                Err(FetchError::Status(503)),
                Ok(""),
            ],
            &[("Lyon", 40)],
        );
        let selector = CandidateSelector::new(Arc::new(source), 4);
        let ranked = selector.rank(Language::Fr).await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].title, "Lyon");
    }

    #[tokio::test(start_paused = true)]
    async fn total_failure_is_an_error() {
        let source = Scripted::new(
            vec![
                Err(FetchError::Network("down".into())),
                Err(FetchError::RateLimited),
            ],
            &[],
        );
        let selector = CandidateSelector::new(Arc::new(source), 2);
        let err = selector.select(Language::En).await.unwrap_err();
        assert!(matches!(err, SelectError::NoCandidates { attempted: 2 }));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_popularity_still_counts() {
        let source = Scripted::new(vec![Ok("Unviewed")], &[]);
        let selector = CandidateSelector::new(Arc::new(source), 1);
        let best = selector.select(Language::En).await.unwrap();
        assert_eq!(best.popularity, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn ties_keep_sampling_order() {
        let source = Scripted::new(
            vec![Ok("First"), Ok("Second"), Ok("Third")],
            &[("First", 7), ("Second", 9), ("Third", 9)],
        );
        let selector = CandidateSelector::new(Arc::new(source), 3);
        let ranked = selector.rank(Language::En).await.unwrap();
        let titles: Vec<&str> = ranked.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "Third", "First"]);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_slow_stragglers() {
        let source = Scripted::new(
            vec![Ok("Quick"), Ok("Slow")],
            &[("Quick", 10), ("Slow", 1_000)],
        )
        .with_delay("Slow", Duration::from_secs(60));
        let selector = CandidateSelector::new(Arc::new(source), 2);
        let best = selector.select(Language::En).await.unwrap();
        assert_eq!(best.title, "Slow");
    }

    #[tokio::test(start_paused = true)]
    async fn bounds_in_flight_fetches() {
        let titles: Vec<Result<&str, FetchError>> = (0..12).map(|_| Ok("Same")).collect();
        let source = Arc::new(Scripted::new(titles, &[("Same", 1)]));
        let selector = CandidateSelector::new(source.clone(), 12).with_max_in_flight(3);
        let ranked = selector.rank(Language::Fr).await.unwrap();
        assert_eq!(ranked.len(), 12);
        assert!(source.peak.load(Ordering::SeqCst) <= 3);
    }
}
