// src/extract/layout.rs

use anyhow::{anyhow, Result};
use scraper::Selector;

/// Where the category tables live on a municipality detail page.
///
/// The hierarchy is: one section (matched by `id`), one content container inside it,
/// any number of panes inside that, and at most one data table per pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    /// Identifies the layout in logs and errors, bumped whenever the site markup changes.
    pub version: &'static str,
    pub section_id: &'static str,
    pub content_class: &'static str,
    pub pane_class: &'static str,
    /// Every class the data table must carry.
    pub table_classes: &'static [&'static str],
}

/// Detail pages as served by allecijfers.nl.
pub const ALLECIJFERS_V1: PageLayout = PageLayout {
    version: "allecijfers-v1",
    section_id: "250-onderwerpen",
    content_class: "tab-content",
    pane_class: "tab-pane",
    table_classes: &["table", "table-bordered", "table-sm", "table-striped"],
};

/// A `PageLayout` with its CSS selectors parsed.
#[derive(Debug, Clone)]
pub struct CompiledLayout {
    pub version: &'static str,
    pub section: Selector,
    pub section_desc: String,
    pub content: Selector,
    pub content_desc: String,
    pub pane: Selector,
    pub table: Selector,
}

impl PageLayout {
    pub fn compile(&self) -> Result<CompiledLayout> {
        // ids may start with a digit, which `#id` syntax does not allow
        let section_desc = format!(r#"div[id="{}"]"#, self.section_id);
        let content_desc = format!("div.{}", self.content_class);
        let pane_desc = format!("div.{}", self.pane_class);
        let table_desc = std::iter::once("table".to_string())
            .chain(self.table_classes.iter().map(|c| format!(".{c}")))
            .collect::<String>();

        Ok(CompiledLayout {
            version: self.version,
            section: parse(&section_desc)?,
            section_desc,
            content: parse(&content_desc)?,
            content_desc,
            pane: parse(&pane_desc)?,
            table: parse(&table_desc)?,
        })
    }
}

fn parse(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e:?}"))
}
