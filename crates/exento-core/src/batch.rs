//! Joining per-document extraction results into an ordered batch.
//!
//! Documents may be extracted in any order and on any thread; each result
//! carries the input position of its document and [`assemble`] restores
//! input order before the failure policy is applied.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{BatchError, ExtractionError};
use crate::exemption::{DocumentExtractor, ExemptionExtractor};
use crate::models::exemption::ExemptionRecord;
use crate::report::{ReportBuilder, TabularArtifact};

/// What to do when a document fails to extract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Abort the batch on the first failing document (by input position).
    #[default]
    FailFast,
    /// Skip failing documents and report the rest.
    SkipFailed,
}

/// Outcome of extracting one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentResult {
    /// Position of the document in the input.
    pub index: usize,
    /// Display name (usually the file name).
    pub name: String,
    pub result: Result<ExemptionRecord, ExtractionError>,
}

impl DocumentResult {
    /// Extract one document's bytes.
    pub fn extract(index: usize, name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            index,
            name: name.into(),
            result: ExemptionExtractor::new().extract_bytes(bytes),
        }
    }

    /// A document whose bytes could not be obtained.
    pub fn unreadable(index: usize, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            result: Err(ExtractionError::Unreadable(reason.into())),
        }
    }
}

/// A document skipped under [`BatchPolicy::SkipFailed`].
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFailure {
    pub index: usize,
    pub name: String,
    pub error: ExtractionError,
}

/// Successfully extracted records in input order, plus skipped documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    records: Vec<ExemptionRecord>,
    names: Vec<String>,
    failures: Vec<DocumentFailure>,
}

impl Batch {
    pub fn records(&self) -> &[ExemptionRecord] {
        &self.records
    }

    /// Records paired with their document names.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExemptionRecord)> {
        self.names.iter().map(String::as_str).zip(self.records.iter())
    }

    pub fn failures(&self) -> &[DocumentFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ExemptionRecord> {
        self.records
    }

    /// Totals over the records of the batch.
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_records(&self.records)
    }
}

/// Join per-document results into a batch ordered by input position.
pub fn assemble<I>(results: I, policy: BatchPolicy) -> Result<Batch, BatchError>
where
    I: IntoIterator<Item = DocumentResult>,
{
    let mut results: Vec<DocumentResult> = results.into_iter().collect();
    results.sort_by_key(|r| r.index);

    let mut batch = Batch::default();

    for DocumentResult { index, name, result } in results {
        match result {
            Ok(record) => {
                batch.records.push(record);
                batch.names.push(name);
            }
            Err(error) => match policy {
                BatchPolicy::FailFast => {
                    return Err(BatchError::Document {
                        index,
                        name,
                        source: error,
                    });
                }
                BatchPolicy::SkipFailed => {
                    warn!("Skipping {}: {}", name, error);
                    batch.failures.push(DocumentFailure { index, name, error });
                }
            },
        }
    }

    if batch.records.is_empty() {
        return Err(BatchError::Empty);
    }

    info!(
        "Assembled batch of {} records ({} skipped)",
        batch.records.len(),
        batch.failures.len()
    );

    Ok(batch)
}

/// Extract named documents one after another and assemble the batch.
pub fn extract_all<I, N, B>(documents: I, policy: BatchPolicy) -> Result<Batch, BatchError>
where
    I: IntoIterator<Item = (N, B)>,
    N: Into<String>,
    B: AsRef<[u8]>,
{
    let mut results = Vec::new();
    for (index, (name, bytes)) in documents.into_iter().enumerate() {
        let result = DocumentResult::extract(index, name, bytes.as_ref());
        let failed = result.result.is_err();
        results.push(result);
        if failed && policy == BatchPolicy::FailFast {
            break;
        }
    }
    assemble(results, policy)
}

/// Extract named documents and build the report over the surviving records.
pub fn build_batch_report<I, N, B>(
    documents: I,
    policy: BatchPolicy,
    builder: &ReportBuilder,
) -> crate::Result<(Batch, TabularArtifact)>
where
    I: IntoIterator<Item = (N, B)>,
    N: Into<String>,
    B: AsRef<[u8]>,
{
    let batch = extract_all(documents, policy)?;
    let artifact = builder.build(batch.records())?;
    Ok((batch, artifact))
}

/// Aggregate figures over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of records.
    pub documents: usize,
    /// Sum of grand totals that parse as decimals.
    pub grand_total: Decimal,
    /// Sum of tax amounts that parse as decimals.
    pub total_tax: Decimal,
    /// Records left out of the sums because an amount did not parse.
    pub unparsed_amounts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_emission: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_emission: Option<NaiveDate>,
}

impl BatchSummary {
    pub fn from_records(records: &[ExemptionRecord]) -> Self {
        let mut summary = Self {
            documents: records.len(),
            ..Self::default()
        };

        for record in records {
            match (
                record.amounts.grand_total_value(),
                record.amounts.total_tax_value(),
            ) {
                (Some(total), Some(tax)) => {
                    summary.grand_total += total;
                    summary.total_tax += tax;
                }
                _ => summary.unparsed_amounts += 1,
            }

            if let Some(date) = record.emission_date_value() {
                summary.first_emission = Some(summary.first_emission.map_or(date, |d| d.min(date)));
                summary.last_emission = Some(summary.last_emission.map_or(date, |d| d.max(date)));
            }
        }

        summary
    }
}
