use std::time::Duration;

use anyhow::Result;

use crate::source::{FetchedPage, PageSource};

/// Pacing for a sequence of requests plus retry policy on throttling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatePolicy {
    /// Pause before every request whose index is a multiple of this. 0 disables.
    pub batch_size: usize,
    pub batch_pause: Duration,
    pub backoff: BackoffPolicy,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_pause: Duration::from_secs(5),
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RatePolicy {
    /// No pacing, no retries. Mostly for tests and local mirrors.
    pub fn unthrottled() -> Self {
        Self {
            batch_size: 0,
            batch_pause: Duration::ZERO,
            backoff: BackoffPolicy::none(),
        }
    }

    /// Pause owed before the request at `index`, counting from 0.
    pub fn pause_before(&self, index: usize) -> Option<Duration> {
        if self.batch_size == 0 || self.batch_pause.is_zero() {
            return None;
        }
        (index % self.batch_size == 0).then_some(self.batch_pause)
    }
}

/// Exponential backoff applied to throttling responses (429, 503).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl BackoffPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (0-based): `initial * 2^attempt`, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Statuses that mean "slow down" rather than "this page is broken".
pub fn is_throttled(status: u16) -> bool {
    matches!(status, 429 | 503)
}

/// GET `url`, retrying throttled responses per `backoff`.
///
/// Honors `Retry-After` when the server sends one (still capped by
/// `max_delay`). Returns the last response once retries run out.
pub async fn get_with_backoff<S>(source: &S, url: &str, backoff: &BackoffPolicy) -> Result<FetchedPage>
where
    S: PageSource + ?Sized,
{
    let mut attempt = 0;
    loop {
        let page = source.get(url).await?;
        if !is_throttled(page.status) || attempt >= backoff.max_retries {
            return Ok(page);
        }

        let delay = page
            .retry_after
            .map(|d| d.min(backoff.max_delay))
            .unwrap_or_else(|| backoff.delay_for(attempt));
        tracing::warn!(
            url = %url,
            status = page.status,
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            "Throttled, backing off"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
