//! CLI application for Norwegian energy certificate processing.

mod commands;
mod http;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, fetch, parse, review};

/// Energiattest tools - extract, look up and review Norwegian energy certificates
#[derive(Parser)]
#[command(name = "enova")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the certificate tables of a single text file
    Parse(parse::ParseArgs),

    /// Parse many certificate texts into key/value rows
    Batch(batch::BatchArgs),

    /// Look up certificates in the public Energiattest API
    Fetch(fetch::FetchArgs),

    /// Summarize certificates with an LLM
    Review(review::ReviewArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Parse(args) => parse::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Fetch(args) => fetch::run(args, config_path).await,
        Commands::Review(args) => review::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
