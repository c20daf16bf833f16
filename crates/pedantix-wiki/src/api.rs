//! Wikipedia and Wikimedia REST endpoints, and parsing of their responses.
//!
//! Everything here is pure so it can be tested without a network.

use chrono::{Days, NaiveDate};
use pedantix_core::{Document, FetchError, Language};
use serde_json::Value;

/// A random article, summary only.
pub fn random_summary_url(language: Language) -> String {
    format!(
        "https://{}.wikipedia.org/api/rest_v1/page/random/summary",
        language.code()
    )
}

/// Daily views of `title` over the `window_days` days ending on `end`.
pub fn pageviews_url(language: Language, title: &str, end: NaiveDate, window_days: u32) -> String {
    let start = end
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(end);
    format!(
        "https://wikimedia.org/api/rest_v1/metrics/pageviews/per-article/{}.wikipedia/all-access/all-agents/{}/daily/{}/{}",
        language.code(),
        urlencoding::encode(title),
        start.format("%Y%m%d"),
        end.format("%Y%m%d"),
    )
}

/// Rendered HTML of `title`, following redirects.
pub fn parse_url(language: Language, title: &str) -> String {
    format!(
        "https://{}.wikipedia.org/w/api.php?action=parse&format=json&page={}&prop=text&redirects=1",
        language.code(),
        urlencoding::encode(title)
    )
}

/// Public page of `title`.
pub fn article_url(language: Language, title: &str) -> String {
    format!(
        "https://{}.wikipedia.org/wiki/{}",
        language.code(),
        urlencoding::encode(title)
    )
}

pub fn random_title(data: &Value) -> Result<String, FetchError> {
    data["title"]
        .as_str()
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| FetchError::Malformed("random summary has no title".into()))
}

/// Total of `items[].views`; 0 when the payload has none.
pub fn total_views(data: &Value) -> u64 {
    data["items"]
        .as_array()
        .map(|items| items.iter().filter_map(|i| i["views"].as_u64()).sum())
        .unwrap_or(0)
}

/// Build a [`Document`] from an `action=parse` response.
///
/// The API answers missing pages with an `error` object and HTTP 200.
pub fn parsed_document(language: Language, requested: &str, data: &Value) -> Result<Document, FetchError> {
    if let Some(error) = data.get("error") {
        let info = error["info"].as_str().unwrap_or(requested);
        return Err(FetchError::NotFound(info.to_string()));
    }

    let parse = &data["parse"];
    let title = parse["title"].as_str().unwrap_or(requested).to_string();
    let raw_markup = parse["text"]["*"]
        .as_str()
        .ok_or_else(|| FetchError::Malformed(format!("no text for {requested:?}")))?
        .to_string();

    Ok(Document {
        url: article_url(language, &title),
        title,
        raw_markup,
    })
}
