//! The pure text substitution primitive shared by every format replacer.
//!
//! Matching is exact, case-sensitive substring comparison with no
//! normalization. Every replacer in this crate funnels its string values
//! through [`ReplacementSpec::apply`].

use crate::error::{Error, Result};

/// An immutable old-text/new-text pair describing one replacement operation.
///
/// The target text is guaranteed non-empty by construction; the replacement
/// text may be empty (which deletes occurrences).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementSpec {
    old_text: String,
    new_text: String,
}

impl ReplacementSpec {
    /// Create a new replacement spec.
    ///
    /// Returns [`Error::EmptyPattern`] if `old_text` is empty.
    pub fn new(old_text: impl Into<String>, new_text: impl Into<String>) -> Result<Self> {
        let old_text = old_text.into();
        if old_text.is_empty() {
            return Err(Error::EmptyPattern);
        }
        Ok(Self {
            old_text,
            new_text: new_text.into(),
        })
    }

    /// The text being searched for.
    pub fn old_text(&self) -> &str {
        &self.old_text
    }

    /// The text each occurrence is replaced with.
    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    /// Whether `value` contains at least one occurrence of the target text.
    pub fn matches(&self, value: &str) -> bool {
        value.contains(&self.old_text)
    }

    /// Replace every non-overlapping, left-to-right occurrence of the
    /// target text in `value`. Returns `value` unchanged if the target
    /// does not occur.
    pub fn apply(&self, value: &str) -> String {
        value.replace(&self.old_text, &self.new_text)
    }
}
