//! Delimited-text (CSV) serialization of [`Table`].
//!
//! The header row is carried over verbatim; column order and row count are
//! preserved across a round-trip. Short rows are padded with empty cells on
//! load so substitution never sees a missing value; rows longer than the
//! header are truncated to the header's column count.

use std::path::{Path, PathBuf};

use crate::dispatch::modified_path;
use crate::error::Result;
use crate::substitution::ReplacementSpec;
use crate::table::Table;

/// Load a CSV file into a [`Table`], treating every cell as text.
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record?;
        let row = (0..table.columns.len())
            .map(|i| record.get(i).unwrap_or("").to_string())
            .collect();
        table.rows.push(row);
    }
    Ok(table)
}

/// Write a [`Table`] back out as CSV with the original header.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    if table.columns.is_empty() {
        // A headerless table has no serializable shape; emit an empty file
        std::fs::write(path, b"")?;
        return Ok(());
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Replace text in every cell of a CSV file, writing the result next to
/// the input as `<stem>_modified.csv`.
pub fn replace_in_delimited(path: &Path, spec: &ReplacementSpec) -> Result<PathBuf> {
    let mut table = read_table(path)?;
    table.replace_cells(spec);
    let output = modified_path(path);
    write_table(&output, &table)?;
    Ok(output)
}
