//! finstate CLI binary.
//!
//! Looks up a company's financial statements on OpenDART by name.

mod export;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Utc};
use clap::Parser;
use finstate::{
    CorpCodeFile, DEFAULT_MIN_ROWS, DartClient, DirectorySource, FetchPolicy, Lookup, SqliteCache,
    StatementService,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "finstate")]
#[command(about = "Look up a company's financial statements on OpenDART", long_about = None)]
#[command(version)]
struct Cli {
    /// Company name (exact name preferred, otherwise the first name containing it)
    name: String,

    /// OpenDART API key
    #[arg(long, env = "DART_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Fiscal year (defaults to last calendar year)
    #[arg(long, value_parser = clap::value_parser!(i32).range(1900..=9999))]
    year: Option<i32>,

    /// Read the corporate directory from a local CORPCODE.xml or corpCode.zip
    #[arg(long, value_name = "FILE")]
    corp_codes: Option<PathBuf>,

    /// Only match companies with a stock code
    #[arg(long)]
    listed_only: bool,

    /// A response needs more than this many rows to be accepted
    #[arg(long, default_value_t = DEFAULT_MIN_ROWS)]
    min_rows: usize,

    /// Probe annual reports before interim reports
    #[arg(long)]
    annual_first: bool,

    /// Cache probe responses in this SQLite database
    #[arg(long, value_name = "PATH")]
    cache: Option<PathBuf>,

    /// Drop cached probe responses older than this many hours
    #[arg(
        long,
        value_name = "HOURS",
        default_value_t = 24,
        value_parser = clap::value_parser!(u64).range(0..=87_600)
    )]
    cache_ttl: u64,

    /// Also write the statements to this CSV file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let year = cli.year.unwrap_or_else(|| Utc::now().year() - 1);
    let client = DartClient::new(cli.api_key)?;

    let source: Box<dyn DirectorySource> = match &cli.corp_codes {
        Some(path) => Box::new(CorpCodeFile::new(path)),
        None => Box::new(client.clone()),
    };
    let mut directory = source.load_directory().await?;
    if cli.listed_only {
        directory.retain(|entry| entry.is_listed());
    }
    debug!(entries = directory.len(), "Loaded corporate directory");

    let policy = if cli.annual_first {
        FetchPolicy::annual_first()
    } else {
        FetchPolicy::default()
    }
    .with_min_rows(cli.min_rows);

    let mut service = StatementService::new(Arc::new(client)).with_policy(policy);
    if let Some(path) = &cli.cache {
        service = service
            .with_cache(Arc::new(SqliteCache::new(path)?))
            .with_cache_ttl(Duration::from_secs(cli.cache_ttl * 3600));
    }

    let lookup = service.lookup(&directory, &cli.name, year).await?;
    if let Lookup::Found { entry, result } = &lookup {
        match &result.request {
            Some(request) => println!(
                "{} ({}) {} {} {}",
                entry.display_name,
                entry.identifier,
                year,
                request.report_period,
                request.consolidation
            ),
            None => println!("{} ({}) {}", entry.display_name, entry.identifier, year),
        }
        println!("{}", result.to_frame()?);

        if let Some(path) = &cli.output {
            export::export_to_file(result, year, path)?;
            println!("Wrote {} lines to {}", result.len(), path.display());
        }
    }

    let (code, message) = outcome(&lookup, year);
    if let Some(message) = message {
        eprintln!("{message}");
    }
    Ok(ExitCode::from(code))
}

/// Exit status and diagnostic for a lookup: 0 when found, 2 when the company
/// or its statements are missing. Errors exit with 1 from `main`.
fn outcome(lookup: &Lookup, year: i32) -> (u8, Option<String>) {
    match lookup {
        Lookup::Found { .. } => (0, None),
        Lookup::NoStatement { entry, result } => (
            2,
            Some(format!(
                "No statement for {} ({}) in {} after {} probes",
                entry.display_name, entry.identifier, year, result.attempts
            )),
        ),
        Lookup::CompanyNotFound { name } => (2, Some(format!("Company not found: {name}"))),
    }
}
