// src/export/xlsx.rs

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::{collections::HashSet, fs, path::PathBuf};
use tracing::{info, instrument, warn};

use crate::extract::{CategoryTable, MunicipalityDataset};

/// Excel refuses sheet names longer than this.
pub const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Sheet label for a category: forbidden characters replaced, outer apostrophes
/// trimmed, cut to `MAX_SHEET_NAME_LEN` characters.
pub fn sheet_name(category: &str) -> String {
    let cleaned: String = category
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    cleaned
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect::<String>()
        .trim_end_matches('\'')
        .to_string()
}

/// Hands out unique sheet names within one workbook. Excel compares names
/// case-insensitively, so this does too.
#[derive(Debug, Default)]
pub struct SheetNames {
    taken: HashSet<String>,
}

impl SheetNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, category: &str) -> String {
        let mut base = sheet_name(category);
        if base.is_empty() {
            base = format!("Sheet{}", self.taken.len() + 1);
        }
        if self.taken.insert(base.to_lowercase()) {
            return base;
        }

        let mut n = 2;
        loop {
            let suffix = format!(" ({n})");
            let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
            let candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
            if self.taken.insert(candidate.to_lowercase()) {
                warn!(category, sheet = %candidate, "sheet name already used; renamed");
                return candidate;
            }
            n += 1;
        }
    }
}

/// Writes one workbook per municipality under `output_dir`.
#[derive(Debug, Clone)]
pub struct SpreadsheetWriter {
    output_dir: PathBuf,
}

impl SpreadsheetWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// `<output_dir>/<name>.xlsx`, with path separators in `name` replaced.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let file_stem: String = name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '-' } else { c })
            .collect();
        self.output_dir.join(format!("{file_stem}.xlsx"))
    }

    /// Write every category of `dataset` to its own sheet: header row, then data rows,
    /// all as text cells.
    #[instrument(level = "info", skip(self, dataset), fields(categories = dataset.len()))]
    pub fn write(&self, name: &str, dataset: &MunicipalityDataset) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating output directory {:?}", self.output_dir))?;
        let path = self.path_for(name);

        let mut workbook = Workbook::new();
        let mut names = SheetNames::new();
        for table in dataset {
            let sheet = names.assign(&table.name);
            write_sheet(&mut workbook, &sheet, table)
                .with_context(|| format!("writing sheet {sheet:?} for {name}"))?;
        }
        workbook
            .save(&path)
            .with_context(|| format!("saving workbook {:?}", path))?;

        info!(path = %path.display(), sheets = dataset.len(), "wrote workbook");
        Ok(path)
    }
}

fn write_sheet(workbook: &mut Workbook, sheet: &str, table: &CategoryTable) -> Result<()> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;

    let lines = std::iter::once(&table.headers).chain(table.rows.iter());
    for (r, cells) in lines.enumerate() {
        let row = u32::try_from(r).context("too many rows for a sheet")?;
        for (c, value) in cells.iter().enumerate() {
            // empty strings are left as blank cells
            if value.is_empty() {
                continue;
            }
            let col = u16::try_from(c).context("too many columns for a sheet")?;
            worksheet.write_string(row, col, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Reader, Xlsx};
    use std::path::Path;
    use tempfile::tempdir;

    fn table(headers: &[&str], rows: &[&[&str]]) -> CategoryTable {
        CategoryTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn read_sheet(path: &Path, sheet: &str) -> anyhow::Result<Vec<Vec<String>>> {
        let mut wb: Xlsx<_> = open_workbook(path)?;
        let range = wb.worksheet_range(sheet)?;
        Ok(range
            .rows()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect())
    }

    #[test]
    fn round_trips_header_and_rows_as_text() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let writer = SpreadsheetWriter::new(dir.path().join("data"));
        let mut ds = MunicipalityDataset::new();
        ds.insert(table(&["A", "B"], &[&["1", "2"], &["3", "4"]]));

        let path = writer.write("Utrecht", &ds)?;
        assert_eq!(path, dir.path().join("data").join("Utrecht.xlsx"));

        let rows = read_sheet(&path, "A")?;
        assert_eq!(rows, vec![vec!["A", "B"], vec!["1", "2"], vec!["3", "4"]]);
        Ok(())
    }

    #[test]
    fn one_sheet_per_category_in_order() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let writer = SpreadsheetWriter::new(dir.path());
        let mut ds = MunicipalityDataset::new();
        ds.insert(table(&["Bevolking", "Aantal"], &[&["Inwoners", "1000"]]));
        ds.insert(table(&["Inkomen", "Bedrag"], &[&["Gemiddeld", "€ 30.000"]]));

        let path = writer.write("Ameland", &ds)?;
        let wb: Xlsx<_> = open_workbook(&path)?;
        assert_eq!(wb.sheet_names(), ["Bevolking", "Inkomen"]);
        Ok(())
    }

    #[test]
    fn long_category_names_are_truncated() {
        let name = "Bevolkingsontwikkeling per jaar";
        let forty = format!("{name}123456789");
        assert_eq!(forty.chars().count(), 40);
        assert_eq!(sheet_name(&forty), name);
        assert_eq!(sheet_name(name), name);
    }

    #[test]
    fn forbidden_characters_are_replaced() {
        assert_eq!(sheet_name("Huur/koop [%]"), "Huur_koop _%_");
        assert_eq!(sheet_name("'s-Gravenhage'"), "s-Gravenhage");
    }

    #[test]
    fn colliding_sheet_names_get_a_suffix() {
        let mut names = SheetNames::new();
        let long = "Woningvoorraad naar eigendom en bouwjaar";
        assert_eq!(names.assign(long), "Woningvoorraad naar eigendom en");
        let second = names.assign(&format!("{long} (detail)"));
        assert_eq!(second, "Woningvoorraad naar eigendo (2)");
        assert_eq!(second.chars().count(), MAX_SHEET_NAME_LEN);
        assert_eq!(
            names.assign("wONINGVOORRAAD NAAR EIGENDOM EN"),
            "wONINGVOORRAAD NAAR EIGENDO (3)"
        );
        assert_eq!(names.assign(""), "Sheet4");
    }

    #[test]
    fn colliding_sheets_are_all_written() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let writer = SpreadsheetWriter::new(dir.path());
        let mut ds = MunicipalityDataset::new();
        ds.insert(table(&["Leeftijdsopbouw van de bevolking 2023", "X"], &[&["a", "1"]]));
        ds.insert(table(&["Leeftijdsopbouw van de bevolking 2024", "X"], &[&["b", "2"]]));

        let path = writer.write("Delft", &ds)?;
        let wb: Xlsx<_> = open_workbook(&path)?;
        assert_eq!(wb.sheet_names().len(), 2);
        Ok(())
    }

    #[test]
    fn path_separators_do_not_escape_the_output_dir() {
        let writer = SpreadsheetWriter::new("/out");
        assert_eq!(writer.path_for("Noord/Zuid"), PathBuf::from("/out/Noord-Zuid.xlsx"));
    }
}
