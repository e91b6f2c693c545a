//! Core library for FEL exemption certificates.
//!
//! This crate provides:
//! - XML document indexing with strict well-formedness checks
//! - Field extraction into validated exemption records
//! - Ordered batch assembly with fail-fast or skip-failed policies
//! - The styled "Exenciones" spreadsheet report and its xlsx output

pub mod batch;
pub mod error;
pub mod exemption;
pub mod models;
pub mod report;
pub mod xml;

pub use batch::{
    Batch, BatchPolicy, BatchSummary, DocumentFailure, DocumentResult, assemble, build_batch_report,
};
pub use error::{BatchError, ExentoError, ExtractionError, ReportError, Result};
pub use exemption::{DocumentExtractor, ExemptionExtractor, extract};
pub use models::exemption::{AffectedInvoice, Amounts, ExemptionRecord};
pub use report::{ReportBuilder, TabularArtifact, build_report, to_xlsx_bytes, write_xlsx};
pub use xml::XmlDocument;
