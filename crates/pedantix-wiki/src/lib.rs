//! Wikipedia as an article source.
//!
//! [`WikipediaClient`] implements [`ArticleSource`] over the public REST and
//! action APIs; [`WikiExtractor`] reduces the rendered HTML to the prose the
//! game hides.

pub mod api;
pub mod backoff;
pub mod extract;

use std::time::Duration;

use pedantix_core::source::SourceFuture;
use pedantix_core::{ArticleSource, Document, FetchError, Language};
use serde_json::Value;

pub use extract::WikiExtractor;

/// HTTP settings for [`WikipediaClient`].
#[derive(Debug, Clone)]
pub struct WikiConfig {
    /// Wikimedia asks API clients to identify themselves.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "pedantix/{} (https://github.com/pedantix/pedantix)",
                env!("CARGO_PKG_VERSION")
            ),
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct WikipediaClient {
    client: reqwest::Client,
    config: WikiConfig,
}

impl WikipediaClient {
    pub fn new(config: WikiConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// GET `url` as JSON, retrying on 429.
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let client = &self.client;
        let timeout = self.config.timeout;
        backoff::with_backoff(url, move || async move {
            let resp = client
                .get(url)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            backoff::check_status(resp.status())?;
            resp.json::<Value>()
                .await
                .map_err(|e| FetchError::Malformed(e.to_string()))
        })
        .await
    }
}

impl ArticleSource for WikipediaClient {
    fn name(&self) -> &str {
        "Wikipedia"
    }

    fn fetch_random_title<'a>(
        &'a self,
        language: Language,
    ) -> SourceFuture<'a, Result<String, FetchError>> {
        Box::pin(async move {
            let data = self.get_json(&api::random_summary_url(language)).await?;
            api::random_title(&data)
        })
    }

    fn fetch_popularity<'a>(
        &'a self,
        language: Language,
        title: &'a str,
        window_days: u32,
    ) -> SourceFuture<'a, u64> {
        Box::pin(async move {
            let today = chrono::Local::now().date_naive();
            let url = api::pageviews_url(language, title, today, window_days);
            match self.get_json(&url).await {
                Ok(data) => api::total_views(&data),
                Err(e) => {
                    tracing::debug!(%title, error = %e, "no page views, counting 0");
                    0
                }
            }
        })
    }

    fn fetch_document<'a>(
        &'a self,
        title: &'a str,
        language: Language,
    ) -> SourceFuture<'a, Result<Document, FetchError>> {
        Box::pin(async move {
            let data = self.get_json(&api::parse_url(language, title)).await?;
            api::parsed_document(language, title, &data)
        })
    }
}
