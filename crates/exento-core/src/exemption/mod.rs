//! Exemption certificate field extraction.

mod extractor;
pub mod schema;

pub use extractor::{ExemptionExtractor, extract};

use crate::error::ExtractionError;
use crate::models::exemption::ExemptionRecord;
use crate::xml::XmlDocument;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for document field extractors.
pub trait DocumentExtractor {
    /// Extract a record from an already parsed document.
    fn extract_document(&self, document: &XmlDocument) -> Result<ExemptionRecord>;

    /// Extract a record from document text.
    fn extract(&self, text: &str) -> Result<ExemptionRecord> {
        let document = XmlDocument::parse(text)?;
        self.extract_document(&document)
    }

    /// Extract a record from raw document bytes (UTF-8).
    fn extract_bytes(&self, bytes: &[u8]) -> Result<ExemptionRecord> {
        let document = XmlDocument::from_bytes(bytes)?;
        self.extract_document(&document)
    }
}
