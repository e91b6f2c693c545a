//! Field extractor for FEL exemption certificates.

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::exemption::{AffectedInvoice, Amounts, ExemptionRecord};
use crate::xml::{Element, XmlDocument};

use super::schema::*;
use super::{DocumentExtractor, Result};

/// Extractor for the fixed exemption certificate schema.
///
/// Each section is read independently; the first missing value aborts the
/// whole document, so no partially filled record is ever produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExemptionExtractor;

impl ExemptionExtractor {
    pub fn new() -> Self {
        Self
    }

    fn general_data(&self, document: &XmlDocument) -> Result<(String, String)> {
        let element = required_element(document, GENERAL_DATA)?;

        let timestamp = required_attribute(element, EMISSION_TIMESTAMP)?;
        let document_type = required_attribute(element, DOCUMENT_TYPE)?;

        let date = timestamp
            .split(DATE_TIME_SEPARATOR)
            .next()
            .unwrap_or_default()
            .trim();
        if date.is_empty() {
            return Err(ExtractionError::missing_attribute(
                GENERAL_DATA,
                EMISSION_TIMESTAMP,
            ));
        }

        Ok((date.to_string(), document_type))
    }

    fn exemption_identity(&self, document: &XmlDocument) -> Result<(String, String, String)> {
        let element = required_element(document, AUTHORIZATION)?;

        let authorization = required_text(element)?;
        let series = required_attribute(element, SERIES)?;
        let number = required_attribute(element, NUMBER)?;

        Ok((authorization, series, number))
    }

    fn affected_invoice(&self, document: &XmlDocument) -> Result<AffectedInvoice> {
        let element = required_element(document, REFERENCE)?;

        Ok(AffectedInvoice {
            authorization_number: required_attribute(element, SOURCE_AUTHORIZATION)?,
            series: required_attribute(element, SOURCE_SERIES)?,
            number: required_attribute(element, SOURCE_NUMBER)?,
            document_date: required_attribute(element, SOURCE_DATE)?,
        })
    }

    fn amounts(&self, document: &XmlDocument) -> Result<Amounts> {
        let tax = required_element(document, TOTAL_TAX)?;
        let total = required_element(document, GRAND_TOTAL)?;

        Ok(Amounts {
            total_tax: required_attribute(tax, TAX_AMOUNT)?,
            grand_total: required_text(total)?,
        })
    }
}

impl DocumentExtractor for ExemptionExtractor {
    fn extract_document(&self, document: &XmlDocument) -> Result<ExemptionRecord> {
        let (emission_date, document_type_code) = self.general_data(document)?;
        let (authorization_number, series, number) = self.exemption_identity(document)?;
        let affected_invoice = self.affected_invoice(document)?;
        let amounts = self.amounts(document)?;

        debug!(
            "Extracted exemption {}-{} ({}) issued {}",
            series, number, authorization_number, emission_date
        );

        Ok(ExemptionRecord {
            emission_date,
            document_type_code,
            authorization_number,
            series,
            number,
            affected_invoice,
            amounts,
        })
    }
}

/// Extract an exemption record from document text.
pub fn extract(text: &str) -> Result<ExemptionRecord> {
    ExemptionExtractor::new().extract(text)
}

fn required_element<'a>(document: &'a XmlDocument, name: &str) -> Result<&'a Element> {
    let element = document
        .find(name)
        .ok_or_else(|| ExtractionError::missing_element(name))?;

    let occurrences = document.find_all(name).count();
    if occurrences > 1 {
        debug!("Found {} `{}` elements, using the first", occurrences, name);
    }

    Ok(element)
}

fn required_attribute(element: &Element, name: &str) -> Result<String> {
    element
        .attribute(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ExtractionError::missing_attribute(element.name(), name))
}

fn required_text(element: &Element) -> Result<String> {
    let text = element.text().trim();
    if text.is_empty() {
        return Err(ExtractionError::missing_attribute(element.name(), TEXT_CONTENT));
    }
    Ok(text.to_string())
}
