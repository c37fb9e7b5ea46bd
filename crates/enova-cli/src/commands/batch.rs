//! Batch processing command for many certificate texts.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use enova_core::storage::{key_value_rows, read_source_rows, CsvSink, RecordSink};
use enova_core::{CertificateTableParser, EnergyCertificate, SourceRow, TableParser};

use super::config::load_config;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Source rows (.csv or .jsonl) with pdfid, extracted_text and metadata columns
    #[arg(required = true)]
    input: PathBuf,

    /// Key/value output CSV
    #[arg(short, long, default_value = "key_values.csv")]
    output: PathBuf,

    /// Also write one normalized certificate row per document
    #[arg(long)]
    normalized: Option<PathBuf>,

    /// Also write a per-document summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Only process the first N source rows
    #[arg(short, long)]
    limit: Option<usize>,

    /// Stop at the first document without table data
    #[arg(long)]
    fail_fast: bool,
}

/// Result of processing a single source row.
struct ProcessResult {
    pdf_id: i64,
    records: usize,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut rows = read_source_rows(&args.input)?;
    if let Some(limit) = args.limit.or(config.batch.limit) {
        rows.truncate(limit);
    }

    let total = rows.len();
    let rows: Vec<SourceRow> = rows.into_iter().filter(SourceRow::is_complete).collect();
    if rows.len() < total {
        info!("Dropped {} incomplete source rows", total - rows.len());
    }

    if rows.is_empty() {
        anyhow::bail!("No complete source rows in {}", args.input.display());
    }

    println!(
        "{} Found {} certificate texts to process",
        style("ℹ").blue(),
        rows.len()
    );

    let continue_on_error = !args.fail_fast && config.batch.continue_on_error;

    let pb = ProgressBar::new(rows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} texts")?
            .progress_chars("=>-"),
    );

    let parser = CertificateTableParser::new();
    let mut sink = CsvSink::create(&args.output)?;
    let mut normalized = match &args.normalized {
        Some(path) => Some(csv::Writer::from_path(path)?),
        None => None,
    };

    let mut results = Vec::with_capacity(rows.len());

    for row in &rows {
        let Some(meta) = row.metadata() else {
            pb.inc(1);
            continue;
        };

        match parser.parse(row.text()) {
            Ok(doc) => {
                let created = Local::now().naive_local();
                let kv_rows = key_value_rows(&doc, &meta, Uuid::new_v4(), created);
                sink.write_rows(&kv_rows)?;

                if let Some(wtr) = normalized.as_mut() {
                    wtr.serialize(EnergyCertificate::from_document(&doc))?;
                }

                debug!("pdfid {}: {} records", meta.pdf_id, kv_rows.len());
                results.push(ProcessResult {
                    pdf_id: meta.pdf_id,
                    records: kv_rows.len(),
                    error: None,
                });
            }
            Err(e) => {
                if continue_on_error {
                    warn!("pdfid {}: {}", meta.pdf_id, e);
                    results.push(ProcessResult {
                        pdf_id: meta.pdf_id,
                        records: 0,
                        error: Some(e.to_string()),
                    });
                } else {
                    error!("pdfid {}: {}", meta.pdf_id, e);
                    pb.abandon();
                    sink.flush()?;
                    anyhow::bail!("Processing failed for pdfid {}: {}", meta.pdf_id, e);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");
    sink.flush()?;
    if let Some(mut wtr) = normalized {
        wtr.flush()?;
    }

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let processed = results.iter().filter(|r| r.error.is_none()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let written: usize = results.iter().map(|r| r.records).sum();

    println!();
    println!(
        "{} Processed {} texts in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} parsed, {} errors, {} rows written to {}",
        style(processed).green(),
        style(failed.len()).red(),
        written,
        args.output.display()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed texts:").red());
        for result in &failed {
            println!(
                "  - pdfid {}: {}",
                result.pdf_id,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["pdfid", "status", "records", "error"])?;

    for result in results {
        let pdf_id = result.pdf_id.to_string();
        let status = if result.error.is_some() { "error" } else { "success" };
        wtr.write_record([
            pdf_id.as_str(),
            status,
            &result.records.to_string(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
