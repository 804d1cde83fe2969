use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Column names of a loaded table, shared by every row cut from it.
#[derive(Debug, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Header {
    pub fn new(names: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Self { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One input line: column name -> cell, where a cell is either present or absent.
///
/// Missing markers are folded into `None` by the loader, so downstream code
/// only ever asks [`RawRow::get`] and never compares against sentinels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    header: Arc<Header>,
    cells: Vec<Option<String>>,
}

impl RawRow {
    /// Builds a row; `cells` is padded with `None` up to the header width.
    pub fn new(header: Arc<Header>, mut cells: Vec<Option<String>>) -> Self {
        cells.resize(header.len(), None);
        Self { header, cells }
    }

    /// Convenience constructor, mostly for tests and fixtures.
    pub fn from_pairs(pairs: &[(&str, Option<&str>)]) -> Self {
        let header = Arc::new(Header::new(
            pairs.iter().map(|(name, _)| name.to_string()).collect(),
        ));
        let cells = pairs
            .iter()
            .map(|(_, value)| value.map(str::to_string))
            .collect();
        Self::new(header, cells)
    }

    /// Value of `column`, `None` when the cell is null or the column does not exist.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.header
            .position(column)
            .and_then(|i| self.cells[i].as_deref())
    }

    pub fn is_present(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Returns a copy with `column` replaced. Unknown columns are left untouched.
    pub fn with(&self, column: &str, value: Option<String>) -> Self {
        let mut row = self.clone();
        if let Some(i) = self.header.position(column) {
            row.cells[i] = value;
        }
        row
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }
}

/// Terminal, flat output record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NormalizedRecord {
    pub email: Option<String>,
    pub sent_date: Option<String>,
    pub clicked_date: Option<String>,
}

impl NormalizedRecord {
    pub const FIELDS: [&'static str; 3] = ["email", "sent_date", "clicked_date"];
}
