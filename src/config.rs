// src/config.rs

use anyhow::{Context, Result};
use std::{env, path::PathBuf, time::Duration};
use url::Url;

use crate::extract::{PageLayout, ALLECIJFERS_V1};

pub const DEFAULT_BASE_URL: &str = "https://allecijfers.nl/";
pub const DEFAULT_DIRECTORY_PATH: &str = "gebieden/";
pub const DEFAULT_PROXY_FILE: &str = "proxies.txt";
pub const DEFAULT_OUTPUT_DIR: &str = "./data/";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime settings for a scrape run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Site root; relative municipality links resolve against it.
    pub base_url: Url,
    /// Directory page path, relative to `base_url`.
    pub directory_path: String,
    pub proxy_file: PathBuf,
    pub output_dir: PathBuf,
    /// Per-request timeout for municipality pages. The directory listing has none.
    pub fetch_timeout: Duration,
    /// Anchor text prefix that marks a municipality link.
    pub municipality_prefix: String,
    pub overview_segment: String,
    pub detail_segment: String,
    pub layout: PageLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL should parse"),
            directory_path: DEFAULT_DIRECTORY_PATH.to_string(),
            proxy_file: PathBuf::from(DEFAULT_PROXY_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            municipality_prefix: "Gemeente ".to_string(),
            overview_segment: "/gemeente-overzicht/".to_string(),
            detail_segment: "/gemeente/".to_string(),
            layout: ALLECIJFERS_V1,
        }
    }
}

impl Config {
    /// Defaults, overridden by any `CIJFERS_*` variables present in the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(raw) = lookup("CIJFERS_BASE_URL") {
            cfg.base_url =
                Url::parse(&raw).with_context(|| format!("CIJFERS_BASE_URL={raw:?} is not a URL"))?;
        }
        if let Some(raw) = lookup("CIJFERS_DIRECTORY_PATH") {
            cfg.directory_path = raw;
        }
        if let Some(raw) = lookup("CIJFERS_PROXY_FILE") {
            cfg.proxy_file = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("CIJFERS_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("CIJFERS_FETCH_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("CIJFERS_FETCH_TIMEOUT_SECS={raw:?} is not a number"))?;
            cfg.fetch_timeout = Duration::from_secs(secs);
        }

        Ok(cfg)
    }

    /// Absolute URL of the municipality directory page.
    pub fn directory_url(&self) -> Result<Url> {
        self.base_url
            .join(&self.directory_path)
            .with_context(|| format!("joining {} onto {}", self.directory_path, self.base_url))
    }
}
