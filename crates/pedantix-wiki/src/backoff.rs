//! Exponential backoff for 429 responses.

use std::future::Future;
use std::time::Duration;

use pedantix_core::FetchError;

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Run `request`, retrying with doubling delays (1s, 2s, 4s) while it
/// reports [`FetchError::RateLimited`].
///
/// Any other outcome is returned as is. After the last retry the rate limit
/// error itself is returned.
pub async fn with_backoff<T, F, Fut>(label: &str, mut request: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut backoff = INITIAL_BACKOFF;

    for attempt in 0..MAX_RETRIES {
        match request().await {
            Err(FetchError::RateLimited) => {
                tracing::warn!(
                    "{}: rate limited (429), retrying in {:?} (attempt {}/{})",
                    label,
                    backoff,
                    attempt + 1,
                    MAX_RETRIES
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            result => return result,
        }
    }

    request().await
}

/// Map an HTTP status to the error the rest of the client expects.
pub fn check_status(status: reqwest::StatusCode) -> Result<(), FetchError> {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        Err(FetchError::RateLimited)
    } else if !status.is_success() {
        Err(FetchError::Status(status.as_u16()))
    } else {
        Ok(())
    }
}
