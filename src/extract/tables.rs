// src/extract/tables.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

use super::layout::CompiledLayout;
use super::table::{CategoryTable, MunicipalityDataset};
use super::utils::element_text;

static HEADER_CELLS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead th").expect("header selector should parse"));
static BODY_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody tr").expect("row selector should parse"));
static DATA_CELLS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("cell selector should parse"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The page does not have the container hierarchy the layout describes.
    #[error("page structure not found for layout {layout}: missing {missing}")]
    StructureNotFound {
        layout: &'static str,
        missing: String,
    },
}

/// Extract every category table from a municipality detail page.
///
/// `Ok` with an empty dataset means the layout matched but no pane held a usable
/// table; `Err` means the layout itself was not found.
#[instrument(level = "debug", skip(html, layout), fields(html_len = html.len(), layout = layout.version))]
pub fn extract_tables(
    html: &str,
    layout: &CompiledLayout,
) -> Result<MunicipalityDataset, ExtractError> {
    let doc = Html::parse_document(html);

    let section = doc
        .select(&layout.section)
        .next()
        .ok_or_else(|| missing(layout, &layout.section_desc))?;
    let content = section
        .select(&layout.content)
        .next()
        .ok_or_else(|| missing(layout, &layout.content_desc))?;

    let mut dataset = MunicipalityDataset::new();
    for (i, pane) in content.select(&layout.pane).enumerate() {
        let Some(table) = pane.select(&layout.table).next() else {
            trace!(pane = i, "no data table in pane");
            continue;
        };
        let Some(category) = read_table(table) else {
            trace!(pane = i, "table without header cells");
            continue;
        };
        let name = category.name.clone();
        if dataset.insert(category).is_some() {
            warn!(category = %name, pane = i, "duplicate category name; keeping the later table");
        }
    }

    debug!(categories = dataset.len(), "extracted tables");
    Ok(dataset)
}

fn read_table(table: ElementRef<'_>) -> Option<CategoryTable> {
    let headers: Vec<String> = table.select(&HEADER_CELLS).map(element_text).collect();
    let rows: Vec<Vec<String>> = table
        .select(&BODY_ROWS)
        .map(|tr| tr.select(&DATA_CELLS).map(element_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();
    CategoryTable::new(headers, rows)
}

fn missing(layout: &CompiledLayout, what: &str) -> ExtractError {
    ExtractError::StructureNotFound {
        layout: layout.version,
        missing: what.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ALLECIJFERS_V1;

    const TABLE_CLASS: &str = "table table-bordered table-sm table-striped";

    fn pane(table_class: &str, headers: &[&str], rows: &[&[&str]]) -> String {
        let ths: String = headers.iter().map(|h| format!("<th>{h}</th>")).collect();
        let trs: String = rows
            .iter()
            .map(|r| {
                let tds: String = r.iter().map(|c| format!("<td>{c}</td>")).collect();
                format!("<tr>{tds}</tr>")
            })
            .collect();
        format!(
            r#"<div class="tab-pane fade"><table class="{table_class}">
                 <thead><tr>{ths}</tr></thead><tbody>{trs}</tbody>
               </table></div>"#
        )
    }

    fn page(panes: &[String]) -> String {
        format!(
            r#"<html><body>
                 <div id="100-kerncijfers"><div class="tab-content">{decoy}</div></div>
                 <div class="card" id="250-onderwerpen">
                   <ul class="nav nav-tabs"><li>Bevolking</li></ul>
                   <div class="tab-content">{}</div>
                 </div>
               </body></html>"#,
            panes.concat(),
            decoy = pane(TABLE_CLASS, &["Decoy", "X"], &[&["a", "b"]]),
        )
    }

    #[test]
    fn extracts_each_pane_with_a_marked_table() {
        let html = page(&[
            pane(
                TABLE_CLASS,
                &["Inwoners", "Aantal"],
                &[&["Inwoners", "361.000"], &["Mannen", "177.000"]],
            ),
            pane("table", &["Ignored", "X"], &[&["1", "2"]]),
            pane(
                TABLE_CLASS,
                &["Inkomen", "Bedrag", "Eenheid"],
                &[&["Gemiddeld", "€ 35.000", "per jaar"]],
            ),
        ]);
        let layout = ALLECIJFERS_V1.compile().unwrap();
        let ds = extract_tables(&html, &layout).unwrap();

        let names: Vec<_> = ds.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Inwoners", "Inkomen"]);

        let inwoners = ds.get("Inwoners").unwrap();
        assert_eq!(inwoners.headers, ["Inwoners", "Aantal"]);
        assert_eq!(inwoners.rows.len(), 2);
        assert_eq!(inwoners.rows[0], ["Inwoners", "361.000"]);

        for t in &ds {
            assert!(t.rows.iter().all(|r| r.len() == t.headers.len()));
        }
    }

    #[test]
    fn cell_text_is_plain_and_trimmed() {
        let html = page(&[pane(
            TABLE_CLASS,
            &["  Wonen <i class=\"fa\"></i>", "Waarde"],
            &[&["<a href=\"/x\">Koopwoningen</a>\n ", " 57 <small>%</small> "]],
        )]);
        let layout = ALLECIJFERS_V1.compile().unwrap();
        let ds = extract_tables(&html, &layout).unwrap();
        let t = ds.get("Wonen").unwrap();
        assert_eq!(t.rows[0], ["Koopwoningen", "57 %"]);
    }

    #[test]
    fn duplicate_category_keeps_last_table() {
        let html = page(&[
            pane(TABLE_CLASS, &["Wonen", "A"], &[&["first", "1"]]),
            pane(TABLE_CLASS, &["Wonen", "B"], &[&["second", "2"]]),
        ]);
        let layout = ALLECIJFERS_V1.compile().unwrap();
        let ds = extract_tables(&html, &layout).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get("Wonen").unwrap().rows[0][0], "second");
    }

    #[test]
    fn pane_without_header_is_skipped() {
        let html = page(&[pane(TABLE_CLASS, &[], &[&["1", "2"]])]);
        let layout = ALLECIJFERS_V1.compile().unwrap();
        assert!(extract_tables(&html, &layout).unwrap().is_empty());
    }

    #[test]
    fn missing_section_is_a_structure_error() {
        let layout = ALLECIJFERS_V1.compile().unwrap();
        let err = extract_tables("<html><body><p>Pagina niet gevonden</p></body></html>", &layout)
            .unwrap_err();
        assert_eq!(
            err,
            ExtractError::StructureNotFound {
                layout: "allecijfers-v1",
                missing: r#"div[id="250-onderwerpen"]"#.to_string(),
            }
        );
    }

    #[test]
    fn missing_content_container_is_a_structure_error() {
        let layout = ALLECIJFERS_V1.compile().unwrap();
        let html = r#"<div id="250-onderwerpen"><p>leeg</p></div>"#;
        match extract_tables(html, &layout) {
            Err(ExtractError::StructureNotFound { missing, .. }) => {
                assert_eq!(missing, "div.tab-content")
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
