//! Fetching the hosted model and metadata files.
//!
use anyhow::{Context, Result};
use reqwest::Client;

use crate::nn::Metadata;

/// URLs of the two hosted artifacts the classifier needs.
#[derive(Debug, Clone)]
pub struct HostedUrls {
    pub model: String,
    pub metadata: String,
}

/// Probe a URL with a HEAD request.
///
/// Returns `false` on any network failure or non-success status, never an
/// error, so callers can gate on availability without handling failures.
pub async fn url_exists(client: &Client, url: &str) -> bool {
    log::info!("Testing url {url}");
    match client.head(url).send().await {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}

/// Fetch and decode the metadata document.
pub async fn fetch_metadata(client: &Client, url: &str) -> Result<Metadata> {
    log::info!("Loading metadata from {url}");
    let metadata = client
        .get(url)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .with_context(|| format!("requesting metadata from {url}"))?
        .json::<Metadata>()
        .await
        .context("metadata body is not in the expected format")?;
    log::info!("Done loading metadata.");

    Ok(metadata)
}

/// Fetch the serialized model into memory.
pub async fn fetch_model_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    log::info!("Loading pretrained model from {url}");
    let bytes = client
        .get(url)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .with_context(|| format!("requesting model from {url}"))?
        .bytes()
        .await
        .context("reading model body")?;
    log::info!("Done loading pretrained model ({} bytes).", bytes.len());

    Ok(bytes.to_vec())
}
