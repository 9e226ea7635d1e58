#![warn(missing_docs)]

//! # textswap
//!
//! Literal text find-and-replace across heterogeneous document formats,
//! returning a modified copy without mutating the original.
//!
//! ## Supported formats
//!
//! - **PDF** — visual occurrences are erased per page and the substituted
//!   text is re-rendered at the same position with a best-effort matching
//!   size (font family is not preserved; Times-Roman is always used)
//! - **CSV** — cell-wise substitution preserving header, column order, and
//!   row count
//! - **XML** — substitution over element text, tail text, and attribute
//!   values, preserving the tree shape
//! - **SAS transport (XPT)** — cell-wise substitution preserving the table
//!   member name, written back in a pinned transport revision
//! - **ZIP** — batch pipeline over every supported member, with per-member
//!   failures logged and skipped
//!
//! Matching is exact, case-sensitive substring comparison; regular
//! expressions and fuzzy matching are out of scope.
//!
//! ## Quick start
//!
//! ```no_run
//! use textswap::{replace_in_file, ReplacementSpec};
//!
//! # fn main() -> textswap::Result<()> {
//! let spec = ReplacementSpec::new("ACME Corp", "Initech")?;
//! let processed = replace_in_file("contract.pdf".as_ref(), &spec)?;
//! println!("wrote {}", processed.output_path.display());
//! # Ok(())
//! # }
//! ```

// Error handling
pub mod error;

// The substitution primitive
pub mod substitution;

// Format replacers
pub mod markup;
pub mod pdf;
pub mod table;

// Routing and the batch pipeline
pub mod archive;
pub mod dispatch;

// Re-exports
pub use archive::replace_in_archive;
pub use dispatch::{is_archive, replace_in_file, FileKind, ProcessedFile};
pub use error::{Error, Result};
pub use substitution::ReplacementSpec;
pub use table::Table;

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
