use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;

use super::parser::{parse_feed, RawArticle};

/// Errors that can occur while retrieving and parsing one feed document.
///
/// All of these are transient from the orchestrator's point of view: the
/// source is skipped for the cycle and retried on the next scheduled
/// refresh. There is no in-cycle retry.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Document could not be parsed as RSS or Atom
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Build the shared HTTP client used for all feed fetches.
///
/// The per-request deadline is enforced separately in [`fetch_articles`];
/// the client carries the connect timeout and identifies itself by crate
/// name and version.
pub fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Fetch one feed document and parse it into raw articles.
///
/// The whole request is bounded by `timeout`, and the response body by
/// `max_bytes`. Entries the parser drops (missing title or link) are
/// logged here; a failure of the document as a whole is returned as an
/// error for the orchestrator to log and skip.
pub async fn fetch_articles(
    client: &Client,
    feed_url: &str,
    timeout: Duration,
    max_bytes: usize,
) -> Result<Vec<RawArticle>, FetchError> {
    let response = tokio::time::timeout(timeout, client.get(feed_url).send())
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(FetchError::Network)?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let bytes = read_limited_bytes(response, max_bytes).await?;

    let parsed = parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;
    if parsed.skipped > 0 {
        tracing::debug!(
            feed = %feed_url,
            skipped = parsed.skipped,
            "Entries without title or link dropped"
        );
    }

    Ok(parsed.articles)
}

/// Read a response body, rejecting it once it exceeds `limit` bytes.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: trust Content-Length when the server sends one
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
