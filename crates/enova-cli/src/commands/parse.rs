//! Parse command - extract field records from a single certificate text.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use enova_core::models::record::ParsedDocument;
use enova_core::storage::format_value;
use enova_core::structured::{build_extraction_prompt, parse_structured_response};
use enova_core::{CertificateTableParser, EnergyCertificate, ExtractionError, TableParser};

use super::config::load_config;
use crate::http::{self, ChatFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input text file (markdown extracted from a certificate PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Emit the normalized certificate summary instead of raw records
    #[arg(long)]
    normalized: bool,

    /// Ask the configured chat model for the records instead of parsing the tables
    #[arg(long)]
    llm: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = fs::read_to_string(&args.input)?;
    debug!("Read {} bytes from {}", text.len(), args.input.display());

    let extracted = if args.llm {
        extract_with_llm(&text, config_path).await?
    } else {
        CertificateTableParser::new().parse(&text)
    };

    let doc = extracted.map_err(|e| match e {
        ExtractionError::NoData => {
            anyhow::anyhow!("No table data found in {}", args.input.display())
        }
        ExtractionError::InvalidResponse(message) => {
            anyhow::anyhow!("Model answer for {} was not usable: {}", args.input.display(), message)
        }
    })?;

    info!("Extracted {} records in {:?}", doc.len(), start.elapsed());

    let output = if args.normalized {
        let summary = EnergyCertificate::from_document(&doc);
        match args.format {
            OutputFormat::Json => serde_json::to_string_pretty(&summary)?,
            OutputFormat::Csv => format_summary_csv(&summary)?,
            OutputFormat::Text => format_summary_text(&summary),
        }
    } else {
        match args.format {
            OutputFormat::Json => serde_json::to_string_pretty(&doc)?,
            OutputFormat::Csv => format_records_csv(&doc)?,
            OutputFormat::Text => format_records_text(&doc),
        }
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Wrote {} records to {}",
            style("✓").green(),
            doc.len(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Structured extraction through the configured chat model.
///
/// Transport failures are returned as errors; an unusable answer is returned
/// as an extraction error so it reads like a parser failure.
async fn extract_with_llm(
    text: &str,
    config_path: Option<&str>,
) -> anyhow::Result<Result<ParsedDocument, ExtractionError>> {
    let config = load_config(config_path)?;
    let review_config = &config.review;

    let api_key = std::env::var(&review_config.api_key_env).map_err(|_| {
        anyhow::anyhow!("Environment variable {} is not set", review_config.api_key_env)
    })?;

    let client = http::client(review_config.timeout())?;
    let prompt = build_extraction_prompt(text);
    info!("Requesting structured extraction from {}", review_config.model);

    let content =
        http::chat_completion(&client, review_config, &api_key, &prompt, ChatFormat::JsonObject)
            .await?;
    Ok(parse_structured_response(&content))
}

fn format_records_csv(doc: &ParsedDocument) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["title", "name", "value", "unit"])?;
    for record in &doc.records {
        wtr.write_record([
            doc.title.as_str(),
            record.name.as_str(),
            &record.value.map(format_value).unwrap_or_default(),
            record.unit.as_deref().unwrap_or_default(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_records_text(doc: &ParsedDocument) -> String {
    let width = doc
        .records
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut output = format!("{}\n\n", doc.title);
    for record in &doc.records {
        let rendered = match (record.value, record.unit.as_deref()) {
            (Some(v), Some(u)) => format!("{} {}", format_value(v), u),
            (Some(v), None) => format_value(v),
            (None, Some(u)) => u.to_string(),
            (None, None) => String::new(),
        };
        output.push_str(&format!("{:<width$}  {}\n", record.name, rendered, width = width));
    }

    output
}

fn format_summary_csv(summary: &EnergyCertificate) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.serialize(summary)?;
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_summary_text(summary: &EnergyCertificate) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}: {}\n", summary.title, summary.merkenummer));
    if let Some(dato) = summary.dato {
        output.push_str(&format!("Dato: {}\n", dato));
    }
    output.push('\n');

    output.push_str("Eiendom:\n");
    output.push_str(&format!("  {} {}, {}\n", summary.postnummer, summary.sted, summary.kommunenavn));
    output.push_str(&format!(
        "  Gnr {} Bnr {} Snr {} Bygning {}\n",
        summary.gardsnummer, summary.bruksnummer, summary.seksjonsnummer, summary.bygningsnummer
    ));
    output.push('\n');

    output.push_str("Bygning:\n");
    output.push_str(&format!("  {} / {}\n", summary.bygningskategori, summary.bygningstype));
    output.push_str(&format!("  Byggeår: {}\n", summary.byggeaar));
    output.push_str(&format!("  BRA: {} {}\n", summary.bra, summary.bra_unit));
    output.push_str(&format!(
        "  U-verdi yttervegger: {} {}\n",
        summary.u_verdi_yttervegger, summary.u_verdi_yttervegger_unit
    ));

    if !summary.innmeldt_av.is_empty() {
        output.push_str(&format!("\nInnmeldt av: {}\n", summary.innmeldt_av));
    }

    output
}
