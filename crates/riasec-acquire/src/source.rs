use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

const USER_AGENT: &str = "riasec/0.1 (occupation interest harvester)";

/// A fetched page: status code plus body, whatever the status.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
    /// Server-requested wait from a `Retry-After` header, in seconds form.
    pub retry_after: Option<Duration>,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Where pages come from. The pipeline only issues plain GETs.
///
/// `Err` means the request itself failed (DNS, connect, timeout, body read);
/// HTTP error statuses come back as `Ok` with the status set.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchedPage>;
}

/// Live HTTP source backed by one shared reqwest client.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn get(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;

        tracing::debug!(url = %url, status = status.as_u16(), bytes = body.len(), "Fetched page");

        Ok(FetchedPage {
            status: status.as_u16(),
            body,
            retry_after,
        })
    }
}
