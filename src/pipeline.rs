// src/pipeline.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::fmt;
use tracing::{error, info, instrument, warn};
use url::Url;

use crate::{
    config::Config,
    export::SpreadsheetWriter,
    extract::{extract_tables, CompiledLayout, ExtractError},
    fetch::{list_municipalities, Municipality, PageFetcher},
    proxy::ProxyManager,
};

/// Resolve a directory link against the site root and point it at the detail page.
pub fn detail_url(base: &Url, href: &str, overview: &str, detail: &str) -> Result<Url> {
    let resolved = base
        .join(href)
        .with_context(|| format!("resolving {href:?} against {base}"))?;
    let swapped = resolved.as_str().replace(overview, detail);
    Url::parse(&swapped).with_context(|| format!("parsing detail URL {swapped:?}"))
}

/// What happened to one municipality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written,
    FetchFailed,
    LayoutNotFound,
    NoCategories,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub listed: usize,
    pub written: usize,
    pub fetch_failed: usize,
    pub layout_not_found: usize,
    pub no_categories: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Written => self.written += 1,
            Outcome::FetchFailed => self.fetch_failed += 1,
            Outcome::LayoutNotFound => self.layout_not_found += 1,
            Outcome::NoCategories => self.no_categories += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.fetch_failed + self.layout_not_found + self.no_categories
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listed, {} written, {} skipped ({} fetch failures, {} layout not found, {} without tables)",
            self.listed,
            self.written,
            self.skipped(),
            self.fetch_failed,
            self.layout_not_found,
            self.no_categories
        )
    }
}

/// List → fetch → extract → write, one municipality at a time.
pub struct Pipeline {
    config: Config,
    directory_client: Client,
    fetcher: PageFetcher,
    layout: CompiledLayout,
    writer: SpreadsheetWriter,
}

impl Pipeline {
    /// Loads the proxy list and prepares clients. A malformed proxy file is fatal.
    pub fn new(config: Config) -> Result<Self> {
        let proxies = ProxyManager::load(&config.proxy_file)
            .with_context(|| format!("loading proxies from {:?}", config.proxy_file))?;
        let fetcher = PageFetcher::new(&proxies, config.fetch_timeout)?;
        let layout = config.layout.compile()?;
        let writer = SpreadsheetWriter::new(&config.output_dir);

        Ok(Self {
            directory_client: Client::new(),
            fetcher,
            layout,
            writer,
            config,
        })
    }

    /// Process every listed municipality. Only a directory or write failure aborts;
    /// per-municipality fetch and extraction problems are logged and counted.
    pub async fn run(&self) -> Result<RunSummary> {
        let directory = self.config.directory_url()?;
        let municipalities = list_municipalities(
            &self.directory_client,
            &directory,
            &self.config.municipality_prefix,
        )
        .await?;

        let mut summary = RunSummary {
            listed: municipalities.len(),
            ..Default::default()
        };
        for municipality in &municipalities {
            let outcome = self.process(municipality).await?;
            summary.record(&outcome);
        }
        Ok(summary)
    }

    #[instrument(level = "info", skip(self, municipality), fields(municipality = %municipality.name))]
    pub async fn process(&self, municipality: &Municipality) -> Result<Outcome> {
        let url = match detail_url(
            &self.config.base_url,
            &municipality.href,
            &self.config.overview_segment,
            &self.config.detail_segment,
        ) {
            Ok(u) => u,
            Err(e) => {
                error!(href = %municipality.href, error = %format!("{e:#}"), "unusable link");
                return Ok(Outcome::FetchFailed);
            }
        };

        let Some(html) = self.fetcher.fetch(&url).await else {
            return Ok(Outcome::FetchFailed);
        };

        let dataset = match extract_tables(&html, &self.layout) {
            Ok(ds) => ds,
            Err(e @ ExtractError::StructureNotFound { .. }) => {
                error!(url = %url, error = %e, "category section not found");
                return Ok(Outcome::LayoutNotFound);
            }
        };
        if dataset.is_empty() {
            warn!(url = %url, "no category tables on page");
            return Ok(Outcome::NoCategories);
        }

        let path = self.writer.write(&municipality.name, &dataset)?;
        info!(categories = dataset.len(), path = %path.display(), "municipality done");
        Ok(Outcome::Written)
    }
}
