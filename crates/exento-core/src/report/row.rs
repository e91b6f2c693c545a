//! Flattening of exemption records into report rows.

use crate::models::exemption::ExemptionRecord;

/// Column labels of the report, in output order.
pub const HEADERS: [&str; 11] = [
    "Fecha de Emisión",
    "Tipo de DTE",
    "Autorización",
    "Serie",
    "Número",
    "Gran Total",
    "Total Impuesto",
    "Autorización de Factura Afectada",
    "Serie de Factura Afectada",
    "Número de Factura Afectada",
    "Fecha Emisión de Factura Afectada",
];

/// One export-ready row: labelled values in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    cells: Vec<(&'static str, String)>,
}

impl ReportRow {
    /// Column labels of this row, in column order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cells.iter().map(|(label, _)| *label)
    }

    /// Values of this row, in column order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, value)| value.as_str())
    }

    /// Value under a column label.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<&ExemptionRecord> for ReportRow {
    fn from(record: &ExemptionRecord) -> Self {
        let values = [
            &record.emission_date,
            &record.document_type_code,
            &record.authorization_number,
            &record.series,
            &record.number,
            &record.amounts.grand_total,
            &record.amounts.total_tax,
            &record.affected_invoice.authorization_number,
            &record.affected_invoice.series,
            &record.affected_invoice.number,
            &record.affected_invoice.document_date,
        ];

        Self {
            cells: HEADERS
                .iter()
                .zip(values)
                .map(|(label, value)| (*label, value.clone()))
                .collect(),
        }
    }
}

/// Map records to rows, preserving order.
pub fn to_rows(records: &[ExemptionRecord]) -> Vec<ReportRow> {
    records.iter().map(ReportRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exemption::sample_record;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_row_mapping() {
        let row = ReportRow::from(&sample_record("001"));

        assert_eq!(row.labels().collect::<Vec<_>>(), HEADERS.to_vec());
        assert_eq!(
            row.values().collect::<Vec<_>>(),
            vec![
                "2024-05-01", "03", "ABC123", "A", "001", "100.00", "12.00", "XYZ789", "B", "002",
                "2024-04-01",
            ]
        );
        assert_eq!(row.get("Gran Total"), Some("100.00"));
        assert_eq!(row.get("Fecha Emisión de Factura Afectada"), Some("2024-04-01"));
        assert_eq!(row.get("Desconocido"), None);
    }

    #[test]
    fn test_rows_preserve_order() {
        let records = vec![sample_record("003"), sample_record("001"), sample_record("002")];
        let numbers: Vec<_> = to_rows(&records)
            .iter()
            .map(|row| row.get("Número").unwrap().to_string())
            .collect();
        assert_eq!(numbers, vec!["003", "001", "002"]);
    }
}
