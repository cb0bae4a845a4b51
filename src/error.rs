//! Error types for the folio library.

use std::io;
use thiserror::Error;

use crate::assembly::SkippedSource;

/// Result type alias for folio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while assembling or annotating documents.
///
/// Malformed range tokens, non-finite coordinates and zero-area boxes are
/// recovered where they occur and never show up here.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a document the toolkit understands.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// Error parsing document structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The document is encrypted and cannot be opened.
    #[error("Document is encrypted")]
    Encrypted,

    /// The document structure is corrupted or malformed.
    #[error("Corrupted document structure: {0}")]
    Corrupted(String),

    /// Page index is out of range. Holds the zero-based index and the page
    /// count; the message shows the 1-based page number.
    #[error("Page {} is out of range (document has {} pages)", .0 + 1, .1)]
    PageOutOfRange(usize, usize),

    /// The toolkit cannot carry out the requested drawing or operation.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// The requested selection resolved to zero pages.
    #[error("No pages selected: {0}")]
    NoPagesSelected(String),

    /// Every source of a batch operation was skipped.
    #[error(
        "All {} sources could not be opened and were skipped: {}",
        .0.len(),
        describe_skipped(.0)
    )]
    AllSourcesUnavailable(Vec<SkippedSource>),

    /// Error encoding or decoding an exchange format (JSON, CSV).
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error means a source document could not be opened at all.
    ///
    /// Batch operations skip such sources instead of aborting.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            Error::Encrypted | Error::UnknownFormat | Error::Corrupted(_) | Error::PdfParse(_)
        )
    }
}

fn describe_skipped(skipped: &[SkippedSource]) -> String {
    skipped
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(feature = "lopdf-backend")]
impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::PageOutOfRange(5, 5);
        assert_eq!(
            err.to_string(),
            "Page 6 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_all_sources_unavailable_names_sources() {
        let err = Error::AllSourcesUnavailable(vec![
            SkippedSource::new(0, "a.pdf", "Document is encrypted"),
            SkippedSource::new(1, "b.pdf", "Document is encrypted"),
        ]);
        let message = err.to_string();
        assert!(message.contains("All 2 sources"));
        assert!(message.contains("a.pdf, b.pdf"));
    }

    #[test]
    fn test_source_unavailable_classification() {
        assert!(Error::Encrypted.is_source_unavailable());
        assert!(Error::Corrupted("xref".into()).is_source_unavailable());
        assert!(!Error::NoPagesSelected("empty".into()).is_source_unavailable());
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::from(io_err).is_source_unavailable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
