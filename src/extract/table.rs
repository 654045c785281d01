// src/extract/table.rs

use tracing::warn;

/// One category's statistics table, as displayed on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    /// Category label, taken from the first header cell.
    pub name: String,
    /// Column names in document order. Never empty.
    pub headers: Vec<String>,
    /// Each body row, one display string per column; always `headers.len()` long.
    pub rows: Vec<Vec<String>>,
}

impl CategoryTable {
    /// Build a table from raw header and row cells. Returns `None` when there are no
    /// headers. Ragged rows are padded or cut to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Option<Self> {
        let name = headers.first()?.clone();
        let width = headers.len();

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, mut row)| {
                if row.len() != width {
                    warn!(
                        category = %name,
                        row = i,
                        cells = row.len(),
                        columns = width,
                        "row width differs from header; normalising"
                    );
                    row.resize(width, String::new());
                }
                row
            })
            .collect();

        Some(Self {
            name,
            headers,
            rows,
        })
    }
}

/// All category tables of one municipality page, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MunicipalityDataset {
    tables: Vec<CategoryTable>,
}

impl MunicipalityDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `table`, replacing any earlier table with the same name in place.
    /// Returns the replaced table.
    pub fn insert(&mut self, table: CategoryTable) -> Option<CategoryTable> {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(slot) => Some(std::mem::replace(slot, table)),
            None => {
                self.tables.push(table);
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, name: &str) -> Option<&CategoryTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryTable> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl<'a> IntoIterator for &'a MunicipalityDataset {
    type Item = &'a CategoryTable;
    type IntoIter = std::slice::Iter<'a, CategoryTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}
