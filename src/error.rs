//! Error types for the replacement engine.
//!
//! Single-file failures propagate to the caller as one of these variants;
//! archive-member failures are caught by the batch pipeline and logged
//! instead of re-thrown.

/// Result type alias for replacement operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while replacing text in a file or archive.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File extension is not one of the supported kinds. No processing
    /// attempt was made, which distinguishes this from a parse failure.
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    /// The replacement target string was empty
    #[error("Replacement target text must not be empty")]
    EmptyPattern,

    /// PDF could not be opened, decoded, or re-serialized
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Delimited-text table could not be read or written
    #[error("Delimited table error: {0}")]
    Delimited(#[from] csv::Error),

    /// Markup document could not be parsed or re-serialized
    #[error("Markup error: {0}")]
    Markup(#[from] quick_xml::Error),

    /// SAS transport file has an invalid or unsupported structure
    #[error("Transport file error: {0}")]
    Transport(String),

    /// Archive could not be unpacked or repacked. During a batch this
    /// aborts the whole operation before any member is touched.
    #[error("Container error: {0}")]
    Container(#[from] zip::result::ZipError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension_error() {
        let err = Error::UnsupportedExtension("docx".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Unsupported file extension"));
        assert!(msg.contains("docx"));
    }

    #[test]
    fn test_empty_pattern_error() {
        let msg = format!("{}", Error::EmptyPattern);
        assert!(msg.contains("must not be empty"));
    }

    #[test]
    fn test_transport_error() {
        let err = Error::Transport("bad variable count".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Transport file error"));
        assert!(msg.contains("bad variable count"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
