//! Paginated-document (PDF) replacement.
//!
//! The engine works on page content streams in two phases: an immutable
//! scan that locates matching text-showing operators together with their
//! baseline position and display size, then a rebuild that erases the
//! matched operators, covers the erased regions, and re-renders the
//! substituted text in a fallback face at the inferred size. See
//! [`replacer`] for the algorithm.

pub mod replacer;

pub use replacer::{extract_page_texts, replace_in_pdf};
