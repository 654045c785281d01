// src/fetch/page.rs

use anyhow::{Context, Result};
use reqwest::{Client, Proxy};
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use url::Url;

use super::get_text;
use crate::proxy::{ProxyEndpoint, ProxyManager};

/// Downloads municipality detail pages, optionally through a forward proxy.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    proxy: Option<ProxyEndpoint>,
}

impl PageFetcher {
    /// The proxy slot every fetch uses. The index is never advanced, so a run always
    /// goes through the same proxy even when several are loaded.
    pub const PROXY_SLOT: usize = 0;

    pub fn new(proxies: &ProxyManager, timeout: Duration) -> Result<Self> {
        let proxy = proxies.get(Self::PROXY_SLOT).cloned();
        let mut builder = Client::builder().timeout(timeout);
        if let Some(p) = &proxy {
            debug!(proxy = %p, "routing page fetches through proxy");
            builder = builder
                .proxy(Proxy::all(p.url()).with_context(|| format!("invalid proxy {}", p))?);
        }
        let client = builder.build().context("building page client")?;
        Ok(Self { client, proxy })
    }

    pub fn proxy(&self) -> Option<&ProxyEndpoint> {
        self.proxy.as_ref()
    }

    /// Fetch `url` and return its body, or `None` on any network error, timeout or
    /// non-success status. Failures are logged, never retried.
    #[instrument(level = "info", skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Option<String> {
        match get_text(&self.client, url).await {
            Ok(body) => {
                info!("fetched page");
                Some(body)
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "error fetching page");
                None
            }
        }
    }
}
