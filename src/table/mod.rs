//! Tabular replacement over an in-memory row/column table.
//!
//! Two serializations share the same substitution semantics and differ
//! only in load/store: [`delimited`] (CSV) and [`transport`] (SAS XPORT).
//! Every cell is handled as its string representation; missing values are
//! normalized to the empty string so substitution is total and type-stable.

pub mod delimited;
pub mod transport;
mod xport;

use crate::substitution::ReplacementSpec;

/// An in-memory table: named columns in order, rows of string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Table-level metadata name (the transport member name). `None` for
    /// formats without one.
    pub name: Option<String>,
    /// Column names in serialization order.
    pub columns: Vec<String>,
    /// Rows of cells, one string per column.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            name: None,
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Apply the substitution to every cell, independent of the column the
    /// cell came from. Column names are never altered.
    pub fn replace_cells(&mut self, spec: &ReplacementSpec) {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                if spec.matches(cell) {
                    *cell = spec.apply(cell);
                }
            }
        }
    }
}
