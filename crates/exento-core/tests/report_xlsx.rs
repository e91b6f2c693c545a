//! End-to-end: fixture documents to an xlsx file, read back from disk.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, open_workbook};
use pretty_assertions::assert_eq;

use exento_core::batch::extract_all;
use exento_core::report::{FILE_NAME, HEADERS, SHEET_NAME};
use exento_core::{BatchPolicy, ReportBuilder, build_report, to_xlsx_bytes, write_xlsx};

const FIRST: &[u8] = include_bytes!("fixtures/exemption.xml");
const SECOND: &[u8] = include_bytes!("fixtures/exemption_second.xml");

fn text(value: &str) -> Data {
    Data::String(value.to_string())
}

#[test]
fn test_report_written_to_disk_reads_back() {
    let batch = extract_all(
        [("exemption.xml", FIRST), ("exemption_second.xml", SECOND)],
        BatchPolicy::FailFast,
    )
    .unwrap();
    let artifact = build_report(batch.records()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = write_xlsx(&artifact, dir.path()).unwrap();
    assert_eq!(path, dir.path().join(FILE_NAME));

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec![SHEET_NAME.to_string()]);

    let range = workbook.worksheet_range(SHEET_NAME).unwrap();
    let cell = |row: u32, col: u32| range.get_value((row, col)).cloned().unwrap_or(Data::Empty);

    assert_eq!(range.height(), 4);
    assert_eq!(cell(0, 0), text("Exenciones"));

    for (col, header) in HEADERS.iter().enumerate() {
        assert_eq!(cell(1, col as u32), text(header));
    }

    let first_row: Vec<Data> = (0..11).map(|col| cell(2, col)).collect();
    assert_eq!(
        first_row,
        [
            "2024-05-01", "03", "ABC123", "A", "001", "100.00", "12.00", "XYZ789", "B", "002",
            "2024-04-01",
        ]
        .map(text)
        .to_vec()
    );

    assert_eq!(cell(3, 0), text("2024-05-02"));
    assert_eq!(cell(3, 4), text("003"));
    assert_eq!(cell(3, 5), text("250.50"));
    assert_eq!(cell(3, 10), text("2024-04-15T09:12:00-06:00"));
}

#[test]
fn test_report_bytes_match_artifact_values() {
    let batch = extract_all([("exemption.xml", FIRST)], BatchPolicy::FailFast).unwrap();
    let artifact = ReportBuilder::new()
        .with_autofit(false)
        .build(batch.records())
        .unwrap();

    let bytes = to_xlsx_bytes(&artifact).unwrap();
    let mut workbook = Xlsx::new(Cursor::new(bytes)).unwrap();
    let range = workbook.worksheet_range(SHEET_NAME).unwrap();

    for (row, col, cell) in artifact.sheet().cells() {
        assert_eq!(
            range.get_value((row, col as u32)),
            Some(&text(&cell.value)),
            "cell ({}, {})",
            row,
            col
        );
    }
}

#[test]
fn test_title_band_is_merged_across_all_columns() {
    let batch = extract_all(
        [("exemption.xml", FIRST), ("exemption_second.xml", SECOND)],
        BatchPolicy::FailFast,
    )
    .unwrap();
    let artifact = build_report(batch.records()).unwrap();
    let bytes = to_xlsx_bytes(&artifact).unwrap();

    let mut workbook = Xlsx::new(Cursor::new(bytes)).unwrap();
    let merges = workbook
        .worksheet_merge_cells(SHEET_NAME)
        .expect("sheet exists")
        .unwrap();

    // A1:K1 only; header and data rows are never merged
    assert_eq!(merges.len(), 1);
    assert_eq!(merges[0].start, (0, 0));
    assert_eq!(merges[0].end, (0, HEADERS.len() as u32 - 1));

    let range = workbook.worksheet_range(SHEET_NAME).unwrap();
    assert_eq!(range.get_value((0, 0)), Some(&text("Exenciones")));
    assert_eq!(range.get_value((1, 10)), Some(&text(HEADERS[10])));
}
