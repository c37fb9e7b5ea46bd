//! Review command - summarize certificate texts with an LLM.

use std::path::PathBuf;

use clap::Args;
use console::style;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use enova_core::geocode::{GeocodeResponse, GEOCODE_URL};
use enova_core::review::{build_prompt, parse_response};
use enova_core::storage::read_source_rows;
use enova_core::{CertificateReview, ReviewContext, SourceRow};

use super::config::load_config;
use crate::http::{self, ChatFormat};

/// Arguments for the review command.
#[derive(Args)]
pub struct ReviewArgs {
    /// Source rows (.csv or .jsonl) with extracted_text and metadata columns
    #[arg(required = true)]
    input: PathBuf,

    /// Number of certificates to review
    #[arg(short, long, default_value = "3")]
    limit: usize,

    /// Look up address coordinates and pass them to the model
    #[arg(long)]
    geocode: bool,

    /// Print reviews as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ReviewOutput<'a> {
    merkenummer: Option<&'a str>,
    adresse: Option<&'a str>,
    location: Option<(f64, f64)>,
    #[serde(flatten)]
    review: &'a CertificateReview,
}

pub async fn run(args: ReviewArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let review_config = &config.review;

    let api_key = std::env::var(&review_config.api_key_env).map_err(|_| {
        anyhow::anyhow!("Environment variable {} is not set", review_config.api_key_env)
    })?;

    let geocode_key = if args.geocode {
        let key = std::env::var(&review_config.geocode_key_env).map_err(|_| {
            anyhow::anyhow!(
                "Environment variable {} is not set",
                review_config.geocode_key_env
            )
        })?;
        Some(key)
    } else {
        None
    };

    let rows: Vec<SourceRow> = read_source_rows(&args.input)?
        .into_iter()
        .filter(SourceRow::is_complete)
        .take(args.limit)
        .collect();

    if rows.is_empty() {
        anyhow::bail!("No complete source rows in {}", args.input.display());
    }
    info!("Reviewing {} certificates", rows.len());

    let client = http::client(review_config.timeout())?;
    let mut failed = 0;

    for row in &rows {
        let location = match (&geocode_key, row.adresse.as_deref()) {
            (Some(key), Some(adresse)) => geocode(&client, key, adresse).await,
            _ => None,
        };

        let context = ReviewContext {
            energikarakter: row.energikarakter.clone(),
            oppvarmingskarakter: row.oppvarmingskarakter.clone(),
            location,
        };

        let prompt = build_prompt(row.text(), &context);
        let content =
            match http::chat_completion(&client, review_config, &api_key, &prompt, ChatFormat::Text)
                .await
            {
                Ok(content) => content,
                Err(e) => {
                    warn!(
                        "Review of {} failed: {}",
                        row.merkenummer.as_deref().unwrap_or_default(),
                        e
                    );
                    failed += 1;
                    continue;
                }
            };
        let review = parse_response(&content);

        let missing = review.missing_keys();
        if !missing.is_empty() {
            warn!(
                "Review of {} is missing {}",
                row.merkenummer.as_deref().unwrap_or_default(),
                missing.join(", ")
            );
        }

        if args.json {
            let output = ReviewOutput {
                merkenummer: row.merkenummer.as_deref(),
                adresse: row.adresse.as_deref(),
                location,
                review: &review,
            };
            println!("{}", serde_json::to_string(&output)?);
        } else {
            print_review(row, location, &review);
        }
    }

    if failed > 0 {
        println!(
            "{} {} of {} reviews failed",
            style("⚠").yellow(),
            failed,
            rows.len()
        );
    }
    if failed == rows.len() {
        anyhow::bail!("All {} reviews failed", failed);
    }

    Ok(())
}

/// Coordinates of an address. Lookup failures are logged and yield `None`.
async fn geocode(client: &Client, key: &str, address: &str) -> Option<(f64, f64)> {
    let response = client
        .get(GEOCODE_URL)
        .query(&[("address", address), ("key", key)])
        .send()
        .await;

    let body: GeocodeResponse = match response {
        Ok(response) => match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Unexpected geocoding response: {}", e);
                return None;
            }
        },
        Err(e) => {
            warn!("Geocoding request failed: {}", e);
            return None;
        }
    };

    let location = body.first_location();
    if location.is_none() {
        warn!("Geocoding failed: {}", body.status);
    }
    location
}

fn print_review(row: &SourceRow, location: Option<(f64, f64)>, review: &CertificateReview) {
    let show = |v: &Option<String>| v.clone().unwrap_or_default();

    println!();
    println!(
        "{}",
        style(format!(
            "EnergiAttest {}:",
            row.merkenummer.as_deref().unwrap_or_default()
        ))
        .bold()
    );
    println!("Adresse: {}", row.adresse.as_deref().unwrap_or_default());
    if let Some((lat, lng)) = location {
        println!("Koordinater: {}, {}", lat, lng);
    }
    println!("Energikarakter: {}", row.energikarakter.as_deref().unwrap_or_default());
    println!(
        "Oppvarmingskarakter: {}",
        row.oppvarmingskarakter.as_deref().unwrap_or_default()
    );
    println!("Utførende: {}", show(&review.innmeldt_av));
    println!("Antall enheter: {}", show(&review.antall_registrerte_enheter));
    println!("Positive aspekter: {}", show(&review.positive_ting));
    println!("Forbedringspotensiale: {}", show(&review.forbedringspotensiale));
}
