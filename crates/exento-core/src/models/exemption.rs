//! Exemption certificate data model.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A parsed exemption certificate.
///
/// Built in one step by the extractor; every field is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExemptionRecord {
    /// Emission date (`YYYY-MM-DD`), the date part of the emission timestamp.
    pub emission_date: String,

    /// DTE type code.
    pub document_type_code: String,

    /// Authorization number issued by the tax authority.
    pub authorization_number: String,

    /// Document series.
    pub series: String,

    /// Document number.
    pub number: String,

    /// The invoice this certificate refers to.
    pub affected_invoice: AffectedInvoice,

    /// Amounts declared on the certificate.
    pub amounts: Amounts,
}

/// Invoice referenced by an exemption certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedInvoice {
    pub series: String,
    pub number: String,
    pub authorization_number: String,

    /// Raw emission date attribute of the source document, not truncated.
    pub document_date: String,
}

/// Totals carried by the certificate, kept as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amounts {
    pub grand_total: String,
    pub total_tax: String,
}

impl Amounts {
    /// Grand total as a decimal, if it parses.
    pub fn grand_total_value(&self) -> Option<Decimal> {
        Decimal::from_str(&self.grand_total).ok()
    }

    /// Total tax as a decimal, if it parses.
    pub fn total_tax_value(&self) -> Option<Decimal> {
        Decimal::from_str(&self.total_tax).ok()
    }
}

impl ExemptionRecord {
    /// Emission date as a calendar date, if it is a valid ISO date.
    pub fn emission_date_value(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.emission_date, "%Y-%m-%d").ok()
    }

    /// Check the record for semantic problems and return any issues found.
    ///
    /// Issues are warnings: values are never modified.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.emission_date_value().is_none() {
            issues.push(format!(
                "Emission date '{}' is not a valid YYYY-MM-DD date",
                self.emission_date
            ));
        }

        if leading_iso_date(&self.affected_invoice.document_date).is_none() {
            issues.push(format!(
                "Affected invoice date '{}' does not start with a YYYY-MM-DD date",
                self.affected_invoice.document_date
            ));
        }

        let grand_total = self.amounts.grand_total_value();
        let total_tax = self.amounts.total_tax_value();

        if grand_total.is_none() {
            issues.push(format!(
                "Grand total '{}' is not a decimal amount",
                self.amounts.grand_total
            ));
        }

        if total_tax.is_none() {
            issues.push(format!(
                "Total tax '{}' is not a decimal amount",
                self.amounts.total_tax
            ));
        }

        if let Some(tax) = total_tax {
            if tax.is_sign_negative() && !tax.is_zero() {
                issues.push(format!("Total tax ({}) is negative", tax));
            }
            if let Some(total) = grand_total {
                if tax > total {
                    issues.push(format!(
                        "Total tax ({}) exceeds grand total ({})",
                        tax, total
                    ));
                }
            }
        }

        issues
    }
}

/// Parse the `YYYY-MM-DD` prefix of a date or timestamp string.
fn leading_iso_date(value: &str) -> Option<NaiveDate> {
    let prefix = value.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

#[cfg(test)]
pub(crate) fn sample_record(number: &str) -> ExemptionRecord {
    ExemptionRecord {
        emission_date: "2024-05-01".to_string(),
        document_type_code: "03".to_string(),
        authorization_number: "ABC123".to_string(),
        series: "A".to_string(),
        number: number.to_string(),
        affected_invoice: AffectedInvoice {
            series: "B".to_string(),
            number: "002".to_string(),
            authorization_number: "XYZ789".to_string(),
            document_date: "2024-04-01".to_string(),
        },
        amounts: Amounts {
            grand_total: "100.00".to_string(),
            total_tax: "12.00".to_string(),
        },
    }
}
