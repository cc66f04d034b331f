// src/source/client.rs
use crate::utils::error::FetchError;
use reqwest::header;

// Browser-like User-Agent; the source rejects the reqwest default.
const SOURCE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Creates a reqwest client configured for the source page.
/// No timeout beyond the client default; a stuck fetch is retried manually.
fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(SOURCE_USER_AGENT)
        .build()
}

/// Downloads the raw markup of the page at `url`.
pub async fn download_page(url: &str) -> Result<String, FetchError> {
    let client = build_client()?;

    tracing::info!("Downloading page from: {}", url);
    tracing::debug!("Using User-Agent: {}", SOURCE_USER_AGENT);

    let response = client.get(url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
        .send()
        .await?; // Propagates reqwest::Error as FetchError::Network

    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        return Err(classify_status(status, url));
    }

    let body = response.text().await?;
    tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);

    Ok(body)
}

/// Maps a non-success status to the matching fetch error.
fn classify_status(status: reqwest::StatusCode, url: &str) -> FetchError {
    match status {
        reqwest::StatusCode::FORBIDDEN | reqwest::StatusCode::TOO_MANY_REQUESTS => {
            tracing::warn!("Received {} - check User-Agent and request rate.", status);
            FetchError::Forbidden
        }
        reqwest::StatusCode::NOT_FOUND => {
            tracing::warn!("Received 404 Not Found for URL: {}", url);
            FetchError::PageNotFound(url.to_string())
        }
        other => FetchError::Http(other),
    }
}
