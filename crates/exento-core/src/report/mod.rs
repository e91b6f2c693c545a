//! Exemption report: row mapping, sheet layout, styling and xlsx output.

mod builder;
mod row;
mod sheet;
mod style;
mod xlsx;

pub use builder::{FILE_NAME, ReportBuilder, SHEET_NAME, TITLE, TabularArtifact, build_report};
pub use row::{HEADERS, ReportRow, to_rows};
pub use sheet::{Cell, Region, Sheet};
pub use style::{HorizontalAlign, StyleProfile, VerticalAlign};
pub use xlsx::{to_workbook, to_xlsx_bytes, write_xlsx};
