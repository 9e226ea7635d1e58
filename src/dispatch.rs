//! Extension-based routing to the format replacers.
//!
//! Routing is pure: a file maps to at most one [`FileKind`] from its
//! extension (case-insensitive). An unrecognized extension is rejected as
//! [`Error::UnsupportedExtension`] before any processing attempt, which
//! keeps "unsupported" distinct from "processing failed".

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::substitution::ReplacementSpec;
use crate::{markup, pdf, table};

/// Extension of the supported container format.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// The supported single-file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Paginated document (`.pdf`)
    Pdf,
    /// Delimited-text table (`.csv`)
    Delimited,
    /// Markup tree (`.xml`)
    Markup,
    /// Statistical-transport table (`.xpt`)
    Transport,
}

impl FileKind {
    /// Determine the format of a file from its extension, case-insensitive.
    /// Returns `None` for unrecognized extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "csv" => Some(FileKind::Delimited),
            "xml" => Some(FileKind::Markup),
            "xpt" => Some(FileKind::Transport),
            _ => None,
        }
    }
}

/// Whether a path carries the container extension.
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
        .unwrap_or(false)
}

/// Result of one successful single-file operation. The output file
/// persists until the caller disposes of it; the core never deletes its
/// own output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    /// Path of the modified copy, written next to the input.
    pub output_path: PathBuf,
    /// Suggested download name, `modified_<input file name>`.
    pub display_name: String,
}

impl ProcessedFile {
    pub(crate) fn for_input(input: &Path, output_path: PathBuf) -> Self {
        let input_name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            output_path,
            display_name: format!("modified_{input_name}"),
        }
    }
}

/// Replace text in a single supported file, producing a modified copy
/// next to the input.
///
/// Fails with [`Error::UnsupportedExtension`] without touching the file
/// if its extension is not recognized; other failures mean an attempt was
/// made and the file could not be processed.
pub fn replace_in_file(path: &Path, spec: &ReplacementSpec) -> Result<ProcessedFile> {
    let kind = FileKind::from_path(path)
        .ok_or_else(|| Error::UnsupportedExtension(extension_label(path)))?;
    let output_path = match kind {
        FileKind::Pdf => pdf::replace_in_pdf(path, spec)?,
        FileKind::Delimited => table::delimited::replace_in_delimited(path, spec)?,
        FileKind::Markup => markup::replace_in_markup(path, spec)?,
        FileKind::Transport => table::transport::replace_in_transport(path, spec)?,
    };
    Ok(ProcessedFile::for_input(path, output_path))
}

/// Output path for a modified copy: `<stem>_modified.<ext>` beside the
/// input.
pub(crate) fn modified_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(extension) => format!("{stem}_modified.{}", extension.to_string_lossy()),
        None => format!("{stem}_modified"),
    };
    path.with_file_name(name)
}

fn extension_label(path: &Path) -> String {
    path.extension()
        .map(|extension| extension.to_string_lossy().into_owned())
        .unwrap_or_else(|| "<none>".to_string())
}
