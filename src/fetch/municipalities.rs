// src/fetch/municipalities.rs

use anyhow::Result;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{info, instrument, trace, warn};
use url::Url;

use super::get_text;
use crate::extract::utils::element_text;

static ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("anchor selector should parse"));

/// A municipality as listed on the directory page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Municipality {
    pub name: String,
    /// The anchor's `href` as written, absolute or relative to the site.
    pub href: String,
}

/// Collect every anchor whose text starts with `prefix`, in document order.
/// Duplicates are kept.
pub fn parse_municipalities(html: &str, prefix: &str) -> Vec<Municipality> {
    let doc = Html::parse_document(html);
    let mut out = Vec::new();
    for a in doc.select(&ANCHORS) {
        let text = element_text(a);
        let Some(name) = text.strip_prefix(prefix) else {
            continue;
        };
        match a.value().attr("href") {
            Some(href) => {
                trace!(name, href, "found municipality");
                out.push(Municipality {
                    name: name.to_string(),
                    href: href.to_string(),
                });
            }
            None => warn!(name, "municipality anchor without href; skipping"),
        }
    }
    out
}

/// GET the directory page and list its municipalities. Any network error or
/// non-success status is returned to the caller.
#[instrument(level = "info", skip(client))]
pub async fn list_municipalities(
    client: &Client,
    directory_url: &Url,
    prefix: &str,
) -> Result<Vec<Municipality>> {
    let html = get_text(client, directory_url).await?;

    let municipalities = parse_municipalities(&html, prefix);
    info!(count = municipalities.len(), "found municipalities");
    Ok(municipalities)
}
