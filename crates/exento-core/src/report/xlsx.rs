//! Spreadsheet (xlsx) output for report artifacts.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::{debug, info};

use crate::error::ReportError;

use super::builder::TabularArtifact;
use super::sheet::Sheet;
use super::style::StyleProfile;

/// Render the artifact into an in-memory workbook.
pub fn to_workbook(artifact: &TabularArtifact) -> Result<Workbook, ReportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    render_sheet(artifact.sheet(), worksheet)?;
    Ok(workbook)
}

/// Render the artifact to xlsx bytes.
pub fn to_xlsx_bytes(artifact: &TabularArtifact) -> Result<Vec<u8>, ReportError> {
    let mut workbook = to_workbook(artifact)?;
    let bytes = workbook.save_to_buffer()?;
    debug!("Rendered {} ({} bytes)", artifact.file_name(), bytes.len());
    Ok(bytes)
}

/// Write the artifact into `dir` under its file name; returns the path written.
pub fn write_xlsx(artifact: &TabularArtifact, dir: &Path) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(artifact.file_name());

    let mut workbook = to_workbook(artifact)?;
    workbook.save(&path)?;

    info!("Wrote report to {}", path.display());
    Ok(path)
}

fn render_sheet(sheet: &Sheet, worksheet: &mut Worksheet) -> Result<(), ReportError> {
    worksheet.set_name(sheet.name())?;

    let mut formats = FormatCache::default();

    for (row, col, cell) in sheet.cells() {
        let format = match &cell.style {
            Some(style) => Some(formats.get(style)?),
            None => None,
        };

        match (sheet.merge_at(row, col), format) {
            (Some(region), format) if !region.is_single_cell() => {
                let format = format.cloned().unwrap_or_default();
                worksheet.merge_range(
                    region.first_row,
                    region.first_col,
                    region.last_row,
                    region.last_col,
                    &cell.value,
                    &format,
                )?;
            }
            (_, Some(format)) => {
                worksheet.write_string_with_format(row, col, &cell.value, format)?;
            }
            (_, None) => {
                worksheet.write_string(row, col, &cell.value)?;
            }
        }
    }

    for (col, width) in sheet.column_widths() {
        worksheet.set_column_width(col, width)?;
    }

    Ok(())
}

/// Formats converted once per distinct profile.
#[derive(Default)]
struct FormatCache {
    formats: Vec<(StyleProfile, Format)>,
}

impl FormatCache {
    fn get(&mut self, style: &StyleProfile) -> Result<&Format, ReportError> {
        let index = match self.formats.iter().position(|(s, _)| s == style) {
            Some(index) => index,
            None => {
                self.formats.push((style.clone(), style.to_format()?));
                self.formats.len() - 1
            }
        };
        Ok(&self.formats[index].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exemption::sample_record;
    use crate::report::build_report;

    #[test]
    fn test_xlsx_bytes_are_a_zip_container() {
        let artifact = build_report(&[sample_record("001")]).unwrap();
        let bytes = to_xlsx_bytes(&artifact).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_format_cache_reuses_profiles() {
        let mut cache = FormatCache::default();
        cache.get(&StyleProfile::header()).unwrap();
        cache.get(&StyleProfile::header()).unwrap();
        cache.get(&StyleProfile::data()).unwrap();
        assert_eq!(cache.formats.len(), 2);
    }

    #[test]
    fn test_invalid_color_is_reported() {
        let style = StyleProfile {
            fill_color: Some("verde".to_string()),
            ..StyleProfile::header()
        };
        let artifact = crate::report::ReportBuilder::new()
            .with_header_style(style)
            .build(&[sample_record("001")])
            .unwrap();
        assert!(matches!(
            to_xlsx_bytes(&artifact),
            Err(ReportError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_cells_map_to_region_formats() {
        use rust_xlsxwriter::{Color, FormatAlign, FormatPattern};

        let artifact = build_report(&[sample_record("001")]).unwrap();
        let sheet = artifact.sheet();
        let mut cache = FormatCache::default();

        let header_style = sheet.style(1, 0).unwrap();
        let header = cache.get(header_style).unwrap().clone();
        let expected_header = Format::new()
            .set_font_name("Arial")
            .set_font_size(14.0)
            .set_bold()
            .set_font_color(Color::RGB(0x000000))
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(0x26A72D))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        assert_eq!(header, expected_header);

        let title = cache.get(sheet.style(0, 0).unwrap()).unwrap().clone();
        let expected_title = Format::new()
            .set_font_name("Arial")
            .set_font_size(18.0)
            .set_bold()
            .set_align(FormatAlign::Center);
        assert_eq!(title, expected_title);

        let data = cache.get(sheet.style(2, 5).unwrap()).unwrap().clone();
        assert_eq!(data, Format::new().set_font_name("Arial").set_font_size(12.0));
        assert_ne!(data, header);
    }
}
