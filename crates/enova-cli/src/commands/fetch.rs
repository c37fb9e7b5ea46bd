//! Fetch command - look certificates up in the public Energiattest API.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use enova_core::models::certificate::{
    CertificateListing, CertificateQuery, CertificateRow, RequestLogEntry, RequestStatus,
};
use enova_core::models::config::ApiConfig;

use super::config::load_config;
use crate::http;

/// Arguments for the fetch command.
#[derive(Args)]
pub struct FetchArgs {
    /// Query rows (.csv) with imphist_id and property identifier columns
    #[arg(required = true)]
    input: PathBuf,

    /// Certificate output CSV
    #[arg(short, long, default_value = "certificates.csv")]
    output: PathBuf,

    /// Request log CSV
    #[arg(long, default_value = "request_log.csv")]
    log: PathBuf,

    /// Only look up the first N queries
    #[arg(short, long)]
    limit: Option<usize>,
}

/// Running totals for the closing summary.
#[derive(Default)]
struct FetchStats {
    api_calls: usize,
    records: usize,
    logged: usize,
}

pub async fn run(args: FetchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let api = &config.api;

    let api_key = std::env::var(&api.api_key_env).map_err(|_| {
        anyhow::anyhow!("Environment variable {} is not set", api.api_key_env)
    })?;

    let mut queries = read_queries(&args.input)?;
    if let Some(limit) = args.limit {
        queries.truncate(limit);
    }
    println!(
        "{} Retrieved {} query rows",
        style("ℹ").blue(),
        queries.len()
    );

    let client = http::client(api.timeout())?;
    let import_date = Local::now().naive_local();

    let mut rows_out = csv::Writer::from_path(&args.output)?;
    let mut log_out = csv::Writer::from_path(&args.log)?;
    let mut stats = FetchStats::default();

    let pb = ProgressBar::new(queries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} queries")?
            .progress_chars("=>-"),
    );

    for (i, query) in queries.iter().enumerate() {
        if stats.api_calls > 0 {
            tokio::time::sleep(api.request_interval()).await;
        }

        let (status, listings) = lookup(&client, api, &api_key, query, &mut stats).await;

        for listing in &listings {
            rows_out.serialize(CertificateRow::from_listing(import_date, query, listing))?;
            stats.records += 1;
        }

        let entry = RequestLogEntry::new(log_date(), query, listings.len(), &status);
        log_out.serialize(&entry)?;
        stats.logged += 1;

        if status != RequestStatus::Success && status != RequestStatus::NoRecords {
            warn!("imphist_id {}: {}", query.imphist_id, status);
        }

        if (i + 1) % 10 == 0 {
            info!(
                "Processed {}/{} requests, {} records written, {} logged",
                i + 1,
                queries.len(),
                stats.records,
                stats.logged
            );
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");
    rows_out.flush()?;
    log_out.flush()?;

    print_summary(&stats, start);

    Ok(())
}

fn read_queries(path: &Path) -> anyhow::Result<Vec<CertificateQuery>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut queries = Vec::new();
    for query in rdr.deserialize() {
        queries.push(query?);
    }
    debug!("Read {} queries from {}", queries.len(), path.display());
    Ok(queries)
}

fn log_date() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Perform one lookup. Never fails: every outcome maps to a log status.
async fn lookup(
    client: &Client,
    api: &ApiConfig,
    api_key: &str,
    query: &CertificateQuery,
    stats: &mut FetchStats,
) -> (RequestStatus, Vec<CertificateListing>) {
    let payload = query.payload();
    let build = || {
        client
            .post(&api.url)
            .header("x-api-key", api_key)
            .json(&payload)
    };

    let mut response = match http::send_with_retry(&api.retry, build).await {
        Ok((response, _)) => response,
        Err(e) => return (RequestStatus::Request(e.to_string()), Vec::new()),
    };
    stats.api_calls += 1;

    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        warn!(
            "Rate limited on imphist_id {}, waiting {:?}",
            query.imphist_id,
            api.rate_limit_wait()
        );
        tokio::time::sleep(api.rate_limit_wait()).await;
        response = match build().send().await {
            Ok(response) => response,
            Err(e) => return (RequestStatus::Request(e.to_string()), Vec::new()),
        };
        stats.api_calls += 1;
    }

    if response.status() != StatusCode::OK {
        return (RequestStatus::Http(response.status().as_u16()), Vec::new());
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return (RequestStatus::Request(e.to_string()), Vec::new()),
    };

    match serde_json::from_str::<Vec<CertificateListing>>(&body) {
        Ok(listings) => (RequestStatus::for_records(listings.len()), listings),
        Err(e) => (RequestStatus::General(e.to_string()), Vec::new()),
    }
}

fn print_summary(stats: &FetchStats, start: Instant) {
    let total = start.elapsed().as_secs_f64();

    println!();
    println!("{}", style("=== Summary ===").bold());
    println!("API calls made: {}", stats.api_calls);
    println!("Records written: {}", stats.records);
    println!("Requests logged: {}", stats.logged);
    println!("Total time: {:.3} sec", total);

    let per_record = if stats.records > 0 {
        total / stats.records as f64
    } else {
        0.0
    };
    println!("Average per record: {:.4} sec", per_record);

    if stats.api_calls > 0 {
        println!(
            "Average per API call: {:.4} sec",
            total / stats.api_calls as f64
        );
    } else {
        println!("Average per API call: N/A");
    }
}
