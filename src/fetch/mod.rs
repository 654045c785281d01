// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

pub mod municipalities;
pub mod page;

pub use municipalities::{list_municipalities, parse_municipalities, Municipality};
pub use page::PageFetcher;

/// GET `url` and return its body; network errors and non-success statuses are errors.
pub(crate) async fn get_text(client: &Client, url: &Url) -> Result<String> {
    debug!("Fetching text from {}", url);
    client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .await
        .with_context(|| format!("Reading text from {}", url))
}
