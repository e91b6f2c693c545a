//! Batch report builder.

use tracing::{debug, info};

use crate::error::ReportError;
use crate::models::config::ReportConfig;
use crate::models::exemption::ExemptionRecord;

use super::row::to_rows;
use super::sheet::{Region, Sheet};
use super::style::StyleProfile;

/// Name of the single report sheet.
pub const SHEET_NAME: &str = "Exenciones";

/// Text of the merged title band.
pub const TITLE: &str = "Exenciones";

/// File name the report is emitted under.
pub const FILE_NAME: &str = "Exenciones.xlsx";

const TITLE_ROW: u32 = 0;
const HEADER_ROW: u32 = 1;
const FIRST_DATA_ROW: u32 = 2;

const MAX_COLUMN_WIDTH: f64 = 60.0;

/// The finished report: one named sheet plus the file name to emit it as.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularArtifact {
    file_name: String,
    sheet: Sheet,
}

impl TabularArtifact {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    /// Column labels of the header band.
    pub fn headers(&self) -> Vec<&str> {
        self.sheet.row_values(HEADER_ROW)
    }

    /// Values of the `index`-th data row.
    pub fn data_row(&self, index: usize) -> Vec<&str> {
        self.sheet.row_values(FIRST_DATA_ROW + index as u32)
    }

    /// Number of data rows (excludes title and header bands).
    pub fn data_row_count(&self) -> usize {
        self.sheet.row_count().saturating_sub(FIRST_DATA_ROW) as usize
    }
}

/// Builds the styled exemption report from a batch of records.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    title_style: StyleProfile,
    header_style: StyleProfile,
    data_style: StyleProfile,
    autofit_columns: bool,
}

impl ReportBuilder {
    /// Create a builder with the default style profiles.
    pub fn new() -> Self {
        Self {
            title_style: StyleProfile::title(),
            header_style: StyleProfile::header(),
            data_style: StyleProfile::data(),
            autofit_columns: true,
        }
    }

    /// Create a builder from the report configuration.
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            title_style: config.title_style.clone(),
            header_style: config.header_style.clone(),
            data_style: config.data_style.clone(),
            autofit_columns: config.autofit_columns,
        }
    }

    pub fn with_title_style(mut self, style: StyleProfile) -> Self {
        self.title_style = style;
        self
    }

    pub fn with_header_style(mut self, style: StyleProfile) -> Self {
        self.header_style = style;
        self
    }

    pub fn with_data_style(mut self, style: StyleProfile) -> Self {
        self.data_style = style;
        self
    }

    /// Size each column to its longest header or data value.
    pub fn with_autofit(mut self, autofit: bool) -> Self {
        self.autofit_columns = autofit;
        self
    }

    /// Build the report. Fails with [`ReportError::EmptyBatch`] on zero records.
    pub fn build(&self, records: &[ExemptionRecord]) -> Result<TabularArtifact, ReportError> {
        let rows = to_rows(records);
        let first = rows.first().ok_or(ReportError::EmptyBatch)?;

        let labels: Vec<&'static str> = first.labels().collect();
        let last_col = labels.len().saturating_sub(1) as u16;
        let last_row = FIRST_DATA_ROW + rows.len() as u32 - 1;

        let mut sheet = Sheet::new(SHEET_NAME);

        // Values
        sheet.write(TITLE_ROW, 0, TITLE);
        sheet.merge(Region::row(TITLE_ROW, 0, last_col));
        sheet.write_row(HEADER_ROW, 0, labels.iter().copied());
        for (offset, row) in rows.iter().enumerate() {
            sheet.write_row(FIRST_DATA_ROW + offset as u32, 0, row.values());
        }

        // Styles
        sheet.apply_style(Region::row(TITLE_ROW, 0, last_col), &self.title_style);
        sheet.apply_style(Region::row(HEADER_ROW, 0, last_col), &self.header_style);
        let styled = sheet.apply_style(
            Region::new(FIRST_DATA_ROW, 0, last_row, last_col),
            &self.data_style,
        );
        debug!("Styled {} data cells", styled);

        if self.autofit_columns {
            autofit(&mut sheet, last_col, last_row);
        }

        info!(
            "Built report '{}' with {} rows and {} columns",
            SHEET_NAME,
            rows.len(),
            labels.len()
        );

        Ok(TabularArtifact {
            file_name: FILE_NAME.to_string(),
            sheet,
        })
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the report with the default styles.
pub fn build_report(records: &[ExemptionRecord]) -> Result<TabularArtifact, ReportError> {
    ReportBuilder::new().build(records)
}

fn autofit(sheet: &mut Sheet, last_col: u16, last_row: u32) {
    for col in 0..=last_col {
        let longest = (HEADER_ROW..=last_row)
            .filter_map(|row| sheet.value(row, col))
            .map(|value| value.chars().count())
            .max()
            .unwrap_or(0);

        let width = (longest as f64 * 1.2 + 2.0).min(MAX_COLUMN_WIDTH);
        sheet.set_column_width(col, width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exemption::sample_record;
    use crate::report::HEADERS;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_layout() {
        let records = vec![sample_record("001"), sample_record("002"), sample_record("003")];
        let artifact = build_report(&records).unwrap();
        let sheet = artifact.sheet();

        assert_eq!(artifact.file_name(), "Exenciones.xlsx");
        assert_eq!(sheet.name(), "Exenciones");
        assert_eq!(sheet.row_count(), 5);
        assert_eq!(artifact.data_row_count(), 3);

        assert_eq!(sheet.row_values(0), vec!["Exenciones"]);
        assert_eq!(sheet.merges(), &[Region::row(0, 0, 10)]);
        assert_eq!(artifact.headers(), HEADERS.to_vec());

        let numbers: Vec<_> = (0..3).map(|i| artifact.data_row(i)[4]).collect();
        assert_eq!(numbers, vec!["001", "002", "003"]);
    }

    #[test]
    fn test_headers_do_not_depend_on_content() {
        let mut record = sample_record("001");
        record.document_type_code = "Autorización".to_string();
        let artifact = build_report(&[record]).unwrap();
        assert_eq!(artifact.headers(), HEADERS.to_vec());
        assert_eq!(artifact.headers().len(), 11);
    }

    #[test]
    fn test_empty_batch() {
        assert!(matches!(build_report(&[]), Err(ReportError::EmptyBatch)));
    }

    #[test]
    fn test_region_styles() {
        let artifact = build_report(&[sample_record("001")]).unwrap();
        let sheet = artifact.sheet();

        assert_eq!(sheet.style(0, 0), Some(&StyleProfile::title()));
        // The merged tail of the title band holds no cells.
        assert!(sheet.cell(0, 5).is_none());

        for col in 0..11 {
            assert_eq!(sheet.style(1, col), Some(&StyleProfile::header()));
            assert_eq!(sheet.style(2, col), Some(&StyleProfile::data()));
        }
        assert_eq!(sheet.column_count(), 11);
    }

    #[test]
    fn test_styles_do_not_change_values() {
        let records = vec![sample_record("001"), sample_record("002")];
        let plain = StyleProfile {
            font_name: "Courier New".to_string(),
            ..StyleProfile::data()
        };

        let default = build_report(&records).unwrap();
        let restyled = ReportBuilder::new()
            .with_title_style(plain.clone())
            .with_header_style(plain.clone())
            .with_data_style(plain)
            .with_autofit(false)
            .build(&records)
            .unwrap();

        let values = |artifact: &TabularArtifact| -> Vec<(u32, u16, String)> {
            artifact
                .sheet()
                .cells()
                .map(|(r, c, cell)| (r, c, cell.value.clone()))
                .collect()
        };
        assert_eq!(values(&default), values(&restyled));
        assert_eq!(restyled.sheet().column_widths().count(), 0);
    }

    #[test]
    fn test_end_to_end_example() {
        let artifact = build_report(&[sample_record("001"), sample_record("001")]).unwrap();
        let sheet = artifact.sheet();

        assert_eq!(sheet.row_count(), 4);
        let fecha = HEADERS.iter().position(|h| *h == "Fecha de Emisión").unwrap() as u16;
        let total = HEADERS.iter().position(|h| *h == "Gran Total").unwrap() as u16;
        assert_eq!(sheet.value(2, fecha), Some("2024-05-01"));
        assert_eq!(sheet.value(2, total), Some("100.00"));
    }

    #[test]
    fn test_autofit_widths() {
        let artifact = build_report(&[sample_record("001")]).unwrap();
        let widths: Vec<_> = artifact.sheet().column_widths().collect();
        assert_eq!(widths.len(), 11);
        // "Autorización de Factura Afectada" is the longest label of column 7.
        let expected = 32.0 * 1.2 + 2.0;
        assert_eq!(widths[7], (7, expected));
    }
}
