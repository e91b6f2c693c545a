//! Data models for exemption certificates and pipeline configuration.

pub mod config;
pub mod exemption;

pub use config::{BatchConfig, ExentoConfig, ReportConfig};
pub use exemption::{AffectedInvoice, Amounts, ExemptionRecord};
