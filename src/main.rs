//! price-compare - search several marketplaces and list offers cheapest first.

use anyhow::Result;
use clap::{Parser, Subcommand};
use price_compare::commands::{list_sources, SearchCommand};
use price_compare::config::{Config, OutputFormat};
use price_compare::AggregateError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "price-compare",
    version,
    about = "Compare product prices across marketplaces",
    long_about = "Searches eBay, regional Amazon stores, and Uzbek marketplaces concurrently, \
                  normalizes prices to USD, and prints offers cheapest first."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "PRICE_PROXY")]
    proxy: Option<String>,

    /// Minimum delay before each request in milliseconds
    #[arg(long, global = true)]
    delay_min: Option<u64>,

    /// Maximum delay before each request in milliseconds
    #[arg(long, global = true)]
    delay_max: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search all selected sources for a product
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,

        /// Sources or groups to search (comma-separated, e.g. ebay,amazon-de or local)
        #[arg(long, value_delimiter = ',')]
        sources: Option<Vec<String>>,

        /// Maximum number of listings to show (0 = all)
        #[arg(short, long)]
        max: Option<usize>,

        /// Minimum price filter (USD)
        #[arg(long)]
        min_price: Option<f64>,

        /// Maximum price filter (USD)
        #[arg(long)]
        max_price: Option<f64>,

        /// Excluded keywords from title (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,

        /// Deadline for the whole search in seconds (0 = none)
        #[arg(long)]
        deadline: Option<u64>,
    },

    /// List supported sources
    Sources,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(delay) = cli.delay_min {
        config.delay_min_ms = delay;
    }
    if let Some(delay) = cli.delay_max {
        config.delay_max_ms = delay;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    let mut config = config.normalized();

    match cli.command {
        Commands::Search { query, sources, max, min_price, max_price, exclude, deadline } => {
            // Apply search-specific config
            if let Some(sources) = sources {
                config.sources = sources;
            }
            if let Some(max) = max {
                config.max_results = max;
            }
            if min_price.is_some() {
                config.min_price = min_price;
            }
            if max_price.is_some() {
                config.max_price = max_price;
            }
            if let Some(ex) = exclude {
                config.exclude_keywords = ex;
            }
            if let Some(deadline) = deadline {
                config.deadline_secs = deadline;
            }

            let cmd = SearchCommand::new(config);
            match cmd.execute(&query).await {
                Ok(output) => println!("{}", output),
                Err(e) => match e.downcast_ref::<AggregateError>() {
                    Some(AggregateError::NoResults { query }) => {
                        eprintln!(
                            "No data found for '{}'. Try another query or more sources.",
                            query
                        );
                        return Ok(ExitCode::FAILURE);
                    }
                    None => return Err(e),
                },
            }
        }

        Commands::Sources => {
            println!("{}", list_sources(&config.rates));
        }
    }

    Ok(ExitCode::SUCCESS)
}
