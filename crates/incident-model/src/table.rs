#![deny(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A data row whose field count differed from the header width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaggedRow {
    pub line: u64,
    pub fields: usize,
}

/// Parsed CSV contents.
///
/// Rows are padded or truncated to the header width so every access by
/// column index is in bounds. The name index is built once in [`RawTable::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// 1-based source line of each row.
    pub lines: Vec<u64>,
    pub delimiter: char,
    pub has_headers: bool,
    pub ragged: Vec<RaggedRow>,
    index: BTreeMap<String, usize>,
}

impl RawTable {
    pub fn new(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        lines: Vec<u64>,
        delimiter: char,
        has_headers: bool,
    ) -> Self {
        let mut index = BTreeMap::new();
        for (idx, name) in headers.iter().enumerate() {
            // First occurrence wins for duplicate header names.
            index.entry(name.clone()).or_insert(idx);
        }
        Self {
            headers,
            rows,
            lines,
            delimiter,
            has_headers,
            ragged: Vec::new(),
            index,
        }
    }

    pub fn with_ragged(mut self, ragged: Vec<RaggedRow>) -> Self {
        self.ragged = ragged;
        self
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Source line for the row at `row`, falling back to the positional line.
    pub fn line_of(&self, row: usize) -> u64 {
        self.lines.get(row).copied().unwrap_or_else(|| {
            let offset = if self.has_headers { 2 } else { 1 };
            row as u64 + offset
        })
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }

    /// Iterates the values of one column, top to bottom.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(column).map(String::as_str).unwrap_or(""))
    }
}
