//! Company Intel Command Line Interface
//!
//! # Usage
//!
//! ```bash
//! # Both sources, merged
//! company_intel_cli 404404404 --pretty
//!
//! # One source only
//! company_intel_cli 404404404 --source registry
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use company_intel::{AggregateError, Aggregator, CompanyId, IntelConfig};

#[derive(Parser)]
#[command(name = "company_intel_cli")]
#[command(version)]
#[command(about = "Look up a company in the revenue service and business registry")]
struct Cli {
    /// Company identifier (tax ID / identification code)
    company_id: String,

    /// Which source to query
    #[arg(long, short, default_value = "all", value_enum)]
    source: Source,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Locator file replacing the embedded set
    #[arg(long, env = "COMPANY_INTEL_LOCATORS_PATH")]
    locators: Option<std::path::PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    Tax,
    Registry,
    All,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "company_intel=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = IntelConfig::from_env()?;
    if cli.locators.is_some() {
        config.locators_path = cli.locators.clone();
    }
    let aggregator = Aggregator::from_config(&config)?;
    let id = CompanyId::new(cli.company_id.as_str())?;

    match cli.source {
        Source::Tax => print(&aggregator.tax().fetch_tax_record(&id).await, cli.pretty)?,
        Source::Registry => {
            let record = aggregator.registry().fetch_registry_record(&id).await?;
            print(&record, cli.pretty)?;
        }
        Source::All => match aggregator.lookup(id.as_str()).await {
            Ok(info) => print(&info, cli.pretty)?,
            Err(e @ AggregateError::NoInformation { .. }) => {
                eprintln!("{}", e);
                return Ok(ExitCode::from(2));
            }
            Err(e) => return Err(e.into()),
        },
    }
    Ok(ExitCode::SUCCESS)
}

fn print<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
