//! WebScraper main entry point
//!
//! This is the command-line interface for scraping single pages and managing
//! the stored results.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use webscraper::config::{load_config_with_hash, Config};
use webscraper::output::{load_statistics, print_statistics, render_record, render_records, OutputFormat};
use webscraper::storage::open_repository;
use webscraper::{Pipeline, ResultRepository, SqliteRepository};

/// WebScraper: single-page metadata scraper
///
/// Fetches one page, extracts its metadata (title, description, links,
/// images, word count, ...) and stores the result in SQLite.
#[derive(Parser, Debug)]
#[command(name = "webscraper")]
#[command(version)]
#[command(about = "Single-page metadata scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a page and store the result
    Scrape {
        /// Absolute http(s) URL
        url: String,
    },

    /// List stored results, most recent first
    List {
        /// Only results scraped from exactly this URL
        #[arg(long, conflicts_with = "status")]
        url: Option<String>,

        /// Only results with this HTTP status code
        #[arg(long)]
        status: Option<u16>,
    },

    /// Show one stored result
    Show { id: i64 },

    /// Delete one stored result
    Delete { id: i64 },

    /// Show statistics over stored results
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let repository = Arc::new(open_repository(Path::new(&config.database.path))?);
    tracing::debug!("Opened result store at {}", config.database.path);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let outcome = match cli.command {
        Command::Scrape { url } => handle_scrape(&config, Arc::clone(&repository), &url, format).await,
        Command::List { url, status } => handle_list(repository.as_ref(), url, status, format),
        Command::Show { id } => handle_show(repository.as_ref(), id, format),
        Command::Delete { id } => handle_delete(repository.as_ref(), id),
        Command::Stats => handle_stats(repository.as_ref(), format),
    };

    // Close the store on every path; the command error takes precedence
    match Arc::try_unwrap(repository) {
        Ok(repository) => {
            if let Err(e) = repository.close() {
                tracing::warn!("Failed to close result store: {}", e);
            }
        }
        Err(_) => tracing::warn!("Result store still in use at shutdown"),
    }

    outcome
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webscraper=info,warn"),
            1 => EnvFilter::new("webscraper=debug,info"),
            2 => EnvFilter::new("webscraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles `scrape`: runs the pipeline and prints the stored record
async fn handle_scrape(
    config: &Config,
    repository: Arc<SqliteRepository>,
    url: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(&config.scraping, repository)?;

    match pipeline.scrape(url).await {
        Ok(record) => {
            println!("{}", render_record(&record, format)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles `list`: prints all records or a filtered subset
fn handle_list(
    repository: &dyn ResultRepository,
    url: Option<String>,
    status: Option<u16>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = match (url, status) {
        (Some(url), _) => repository.list_by_url(&url)?,
        (None, Some(status)) => repository.list_by_status(status)?,
        (None, None) => repository.list()?,
    };

    tracing::debug!("Listing {} results", records.len());
    println!("{}", render_records(&records, format)?);

    Ok(())
}

/// Handles `show`: prints one record or reports that it does not exist
fn handle_show(
    repository: &dyn ResultRepository,
    id: i64,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match repository.get_by_id(id)? {
        Some(record) => {
            println!("{}", render_record(&record, format)?);
            Ok(())
        }
        None => Err(format!("Result {} not found", id).into()),
    }
}

/// Handles `delete`: checks that the record exists, then removes it
fn handle_delete(repository: &dyn ResultRepository, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    if repository.get_by_id(id)?.is_none() {
        return Err(format!("Result {} not found", id).into());
    }

    repository.delete_by_id(id)?;
    println!("Deleted result {}", id);

    Ok(())
}

/// Handles `stats`: prints the store summary
fn handle_stats(
    repository: &dyn ResultRepository,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let stats = load_statistics(repository)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => print_statistics(&stats),
    }

    Ok(())
}
