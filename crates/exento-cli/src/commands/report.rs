//! Report command: extract many documents and write the Exenciones workbook.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use exento_core::ExtractionError;
use exento_core::batch::{BatchPolicy, DocumentFailure, DocumentResult, assemble};
use exento_core::report::{ReportBuilder, write_xlsx};

use super::load_config;

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Input files or glob patterns (globs only match .xml files)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Directory to write Exenciones.xlsx into
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of documents extracted in parallel
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Skip documents that fail to extract instead of aborting
    #[arg(long)]
    continue_on_error: bool,

    /// Warn about records with unparseable dates or amounts
    #[arg(long)]
    validate: bool,

    /// Print totals for the batch
    #[arg(long)]
    summary: bool,

    /// Write skipped documents and their errors to a CSV file
    #[arg(long)]
    failures: Option<PathBuf>,
}

pub async fn run(args: ReportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = resolve_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.inputs.join(" "));
    }

    let policy = if args.continue_on_error {
        BatchPolicy::SkipFailed
    } else {
        config.batch.policy()
    };
    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);

    let missing: Vec<&PathBuf> = files.iter().filter(|path| !path.is_file()).collect();
    if let Some(path) = missing.first() {
        if policy == BatchPolicy::FailFast {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        for path in &missing {
            warn!("Input file not found: {}", path.display());
        }
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );
    info!("Extracting {} documents with {} jobs ({:?})", files.len(), jobs, policy);

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let results = extract_files(&files, jobs, policy, &progress).await?;
    progress.finish_and_clear();

    let batch = assemble(results, policy)?;

    if args.validate || config.batch.validate {
        for (name, record) in batch.iter() {
            for issue in record.validate() {
                warn!("{}: {}", name, issue);
                eprintln!("{} {}: {}", style("⚠").yellow(), name, issue);
            }
        }
    }

    let artifact = ReportBuilder::from_config(&config.report).build(batch.records())?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.report.output_dir.clone());
    let path = write_xlsx(&artifact, &output_dir)?;

    if let Some(failures_path) = &args.failures {
        write_failures(failures_path, batch.failures())?;
        println!(
            "{} Failures written to {}",
            style("✓").green(),
            failures_path.display()
        );
    }

    if args.summary {
        let summary = batch.summary();
        println!();
        println!("Documents:     {}", summary.documents);
        println!("Grand total:   {}", summary.grand_total);
        println!("Total tax:     {}", summary.total_tax);
        if summary.unparsed_amounts > 0 {
            println!("Not summed:    {}", summary.unparsed_amounts);
        }
        if let (Some(first), Some(last)) = (summary.first_emission, summary.last_emission) {
            println!("Emitted:       {} .. {}", first, last);
        }
    }

    println!();
    println!(
        "{} Wrote {} rows to {} in {:?}",
        style("✓").green(),
        artifact.data_row_count(),
        path.display(),
        start.elapsed()
    );

    if !batch.failures().is_empty() {
        println!(
            "   {} successful, {} skipped",
            style(batch.len()).green(),
            style(batch.failures().len()).red()
        );
        println!();
        println!("{}", style("Skipped files:").red());
        for failure in batch.failures() {
            println!(
                "  - {} ({}): {}",
                failure.name,
                failure_kind(&failure.error),
                failure.error
            );
        }
    }

    Ok(())
}

/// Expand inputs into an ordered list of files.
///
/// Inputs without glob metacharacters are explicit paths: they are kept
/// as given, repeats and missing files included, so every document the
/// caller named gets a row or a reported failure. Patterns are filtered to
/// `.xml` files; a pattern matching nothing is an error, and a file
/// already listed is not added again.
fn resolve_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() || !is_pattern(input) {
            seen.insert(path.to_path_buf());
            files.push(path.to_path_buf());
            continue;
        }

        let mut matched = 0usize;
        for entry in glob(input)?.filter_map(|r| r.ok()) {
            let ext = entry.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !entry.is_file() || !ext.eq_ignore_ascii_case("xml") {
                continue;
            }

            matched += 1;
            if seen.insert(entry.clone()) {
                files.push(entry);
            } else {
                warn!("{} is already listed, not adding it again", entry.display());
            }
        }

        if matched == 0 {
            anyhow::bail!("No matching files found for pattern: {}", input);
        }
    }

    Ok(files)
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Extract files concurrently, at most `jobs` at a time.
///
/// Results arrive in completion order; `assemble` restores input order.
/// Under fail-fast, collection stops once every document before the
/// earliest failure has reported.
async fn extract_files(
    files: &[PathBuf],
    jobs: usize,
    policy: BatchPolicy,
    progress: &ProgressBar,
) -> anyhow::Result<Vec<DocumentResult>> {
    let mut pending = stream::iter(files.iter().cloned().enumerate())
        .map(|(index, path)| tokio::task::spawn_blocking(move || extract_file(index, &path)))
        .buffer_unordered(jobs.max(1));

    let mut results = Vec::with_capacity(files.len());
    let mut first_failure: Option<usize> = None;
    while let Some(joined) = pending.next().await {
        let result = joined?;
        progress.inc(1);

        if policy == BatchPolicy::FailFast && result.result.is_err() {
            first_failure = Some(first_failure.map_or(result.index, |i| i.min(result.index)));
        }
        results.push(result);

        if let Some(failed) = first_failure {
            if results.iter().filter(|r| r.index < failed).count() == failed {
                break;
            }
        }
    }

    Ok(results)
}

fn extract_file(index: usize, path: &Path) -> DocumentResult {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string();

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Could not read {}: {}", path.display(), e);
            return DocumentResult::unreadable(index, name, format!("{}: {}", path.display(), e));
        }
    };

    let result = DocumentResult::extract(index, name, &bytes);
    debug!(
        "Extracted {} ({} bytes): {}",
        path.display(),
        bytes.len(),
        if result.result.is_ok() { "ok" } else { "failed" }
    );

    result
}

fn failure_kind(error: &ExtractionError) -> &'static str {
    match error {
        ExtractionError::Unreadable(_) => "unreadable",
        e if e.is_missing_field() => "missing field",
        _ => "malformed",
    }
}

fn write_failures(path: &Path, failures: &[DocumentFailure]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["filename", "kind", "error"])?;
    for failure in failures {
        wtr.write_record([
            failure.name.as_str(),
            failure_kind(&failure.error),
            failure.error.to_string().as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
