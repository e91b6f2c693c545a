//! Visual style profiles for report regions.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern};
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Horizontal alignment within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

/// Vertical alignment within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

/// Font, fill and alignment applied to a region of the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleProfile {
    /// Font family.
    pub font_name: String,

    /// Font size in points.
    pub font_size: f64,

    /// Bold font.
    pub bold: bool,

    /// Font colour as `RRGGBB` hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,

    /// Solid background fill as `RRGGBB` hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_align: Option<HorizontalAlign>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<VerticalAlign>,
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self::data()
    }
}

impl StyleProfile {
    /// Title band: Arial 18, bold, centered.
    pub fn title() -> Self {
        Self {
            font_size: 18.0,
            bold: true,
            horizontal_align: Some(HorizontalAlign::Center),
            ..Self::data()
        }
    }

    /// Header band: Arial 14, bold, black on green, centered.
    pub fn header() -> Self {
        Self {
            font_size: 14.0,
            bold: true,
            font_color: Some("000000".to_string()),
            fill_color: Some("26A72D".to_string()),
            horizontal_align: Some(HorizontalAlign::Center),
            vertical_align: Some(VerticalAlign::Center),
            ..Self::data()
        }
    }

    /// Data band: Arial 12.
    pub fn data() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: 12.0,
            bold: false,
            font_color: None,
            fill_color: None,
            horizontal_align: None,
            vertical_align: None,
        }
    }

    /// Convert the profile into a spreadsheet cell format.
    pub fn to_format(&self) -> Result<Format, ReportError> {
        let mut format = Format::new()
            .set_font_name(self.font_name.as_str())
            .set_font_size(self.font_size);

        if self.bold {
            format = format.set_bold();
        }

        if let Some(color) = &self.font_color {
            format = format.set_font_color(parse_color(color)?);
        }

        if let Some(color) = &self.fill_color {
            format = format
                .set_pattern(FormatPattern::Solid)
                .set_background_color(parse_color(color)?);
        }

        if let Some(align) = self.horizontal_align {
            format = format.set_align(match align {
                HorizontalAlign::Left => FormatAlign::Left,
                HorizontalAlign::Center => FormatAlign::Center,
                HorizontalAlign::Right => FormatAlign::Right,
            });
        }

        if let Some(align) = self.vertical_align {
            format = format.set_align(match align {
                VerticalAlign::Top => FormatAlign::Top,
                VerticalAlign::Center => FormatAlign::VerticalCenter,
                VerticalAlign::Bottom => FormatAlign::Bottom,
            });
        }

        Ok(format)
    }
}

/// Parse an `RRGGBB` (optionally `#`-prefixed) colour.
fn parse_color(value: &str) -> Result<Color, ReportError> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return Err(ReportError::InvalidColor(value.to_string()));
    }
    u32::from_str_radix(hex, 16)
        .map(Color::RGB)
        .map_err(|_| ReportError::InvalidColor(value.to_string()))
}
