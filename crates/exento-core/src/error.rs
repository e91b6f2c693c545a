//! Error types for the exento-core library.

use thiserror::Error;

/// Main error type for the exento library.
#[derive(Error, Debug)]
pub enum ExentoError {
    /// Document extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Batch assembly error.
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),

    /// Report building or writing error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while extracting a record from a single document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The document could not be read at all.
    #[error("unreadable document: {0}")]
    Unreadable(String),

    /// The input is not well-formed XML.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A required element is absent.
    #[error("missing required element `{element}`")]
    MissingElement { element: String },

    /// The element exists but a required attribute (or its text) is absent or empty.
    #[error("element `{element}` is missing required value `{attribute}`")]
    MissingAttribute { element: String, attribute: String },
}

impl ExtractionError {
    pub(crate) fn missing_element(element: &str) -> Self {
        Self::MissingElement {
            element: element.to_string(),
        }
    }

    pub(crate) fn missing_attribute(element: &str, attribute: &str) -> Self {
        Self::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }

    /// True when the document parsed but lacked a required field.
    pub fn is_missing_field(&self) -> bool {
        matches!(
            self,
            Self::MissingElement { .. } | Self::MissingAttribute { .. }
        )
    }
}

/// Errors raised while joining per-document results into a batch.
#[derive(Error, Debug)]
pub enum BatchError {
    /// A document failed under the fail-fast policy.
    #[error("document #{index} ({name}) failed: {source}")]
    Document {
        index: usize,
        name: String,
        #[source]
        source: ExtractionError,
    },

    /// No document in the batch was extracted successfully.
    #[error("no documents were extracted successfully")]
    Empty,
}

/// Errors raised while building or writing the report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The report was requested over zero records.
    #[error("cannot build a report from an empty batch")]
    EmptyBatch,

    /// A style profile colour is not `RRGGBB` hex.
    #[error("invalid colour `{0}`, expected RRGGBB hex")]
    InvalidColor(String),

    /// The spreadsheet writer rejected the artifact.
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// I/O error while emitting the artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the exento library.
pub type Result<T> = std::result::Result<T, ExentoError>;
