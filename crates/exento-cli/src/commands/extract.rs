//! Extract command - read the fields of a single exemption document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use exento_core::exemption::{DocumentExtractor, ExemptionExtractor};
use exento_core::models::exemption::ExemptionRecord;
use exento_core::report::{HEADERS, ReportRow};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input XML document
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Warn about unparseable dates or amounts
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output with report column labels
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let data = fs::read(&args.input)?;
    let record = ExemptionExtractor::new()
        .extract_bytes(&data)
        .map_err(|e| anyhow::anyhow!("Failed to extract {}: {}", args.input.display(), e))?;

    if args.validate || config.batch.validate {
        let issues = record.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_record(&record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_record(record: &ExemptionRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_record_csv(record),
        OutputFormat::Text => Ok(format_record_text(record)),
    }
}

fn format_record_csv(record: &ExemptionRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(HEADERS)?;
    wtr.write_record(ReportRow::from(record).values())?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_record_text(record: &ExemptionRecord) -> String {
    let row = ReportRow::from(record);
    let width = HEADERS.iter().map(|h| h.chars().count()).max().unwrap_or(0);

    let mut output = String::new();
    for (label, value) in row.labels().zip(row.values()) {
        let padding = width - label.chars().count();
        output.push_str(&format!("{}:{} {}\n", label, " ".repeat(padding), value));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = include_str!("../../../exento-core/tests/fixtures/exemption.xml");

    fn record() -> ExemptionRecord {
        exento_core::extract(DOCUMENT).unwrap()
    }

    #[test]
    fn test_csv_has_report_labels() {
        let csv = format_record_csv(&record()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap().split(',').count(), 11);
        assert!(csv.starts_with("Fecha de Emisión,Tipo de DTE,"));
        assert_eq!(
            lines.next().unwrap(),
            "2024-05-01,03,ABC123,A,001,100.00,12.00,XYZ789,B,002,2024-04-01"
        );
    }

    #[test]
    fn test_text_lists_every_field() {
        let text = format_record_text(&record());
        assert_eq!(text.lines().count(), 11);
        assert!(text.lines().any(|l| l.starts_with("Gran Total:") && l.ends_with(" 100.00")));
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = format_record(&record(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["documentTypeCode"], "03");
        assert_eq!(value["affectedInvoice"]["number"], "002");
    }
}
