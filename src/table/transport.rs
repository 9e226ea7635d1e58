//! Statistical-transport (SAS XPORT) serialization of [`Table`].
//!
//! Substitution semantics are identical to the delimited variant; only
//! load/store differ. The member name recorded in the input is carried
//! over to the output (with a fixed default when absent), and the output
//! is always written in the pinned V5 record layout.

use std::path::{Path, PathBuf};

use crate::dispatch::modified_path;
use crate::error::Result;
use crate::substitution::ReplacementSpec;
use crate::table::{xport, Table};

/// Default member name used when the input carries none.
pub const DEFAULT_TABLE_NAME: &str = xport::DEFAULT_MEMBER_NAME;

/// Load a transport file into a [`Table`]. Numeric variables are decoded
/// and stringified; missing numeric values become empty strings.
pub fn read_table(path: &Path) -> Result<Table> {
    xport::read(path)
}

/// Write a [`Table`] as a transport file. Every variable is emitted as
/// character data, so numeric columns become text after a round-trip.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    xport::write(path, table)
}

/// Replace text in every cell of a transport file, writing the result next
/// to the input as `<stem>_modified.xpt`.
pub fn replace_in_transport(path: &Path, spec: &ReplacementSpec) -> Result<PathBuf> {
    let mut table = read_table(path)?;
    table.replace_cells(spec);
    let output = modified_path(path);
    write_table(&output, &table)?;
    Ok(output)
}
