use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use match_scores::config::AppConfig;
use match_scores::format::write_matches;
use match_scores::validate::{valid_month, valid_path, valid_year, Month, SourcePath, Year};

const DEFAULT_CONFIG: &str = "config.env";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "The utility can select the results of matches through a query by year and month"
)]
struct Cli {
    /// Month number e.g 03 or 12
    #[arg(short, long, value_parser = valid_month)]
    month: Month,

    /// Year number e.g. 1994
    #[arg(short, long, value_parser = valid_year)]
    year: Year,

    /// CSV file of `date,home,visitor` rows to load before querying
    #[arg(short, long = "source_csv", value_parser = valid_path)]
    source_csv: Option<SourcePath>,

    /// Configuration file with the database connection settings
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries the match lines
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

    let lines = match_scores::run(&cli.month, &cli.year, cli.source_csv.as_ref(), &config).await?;

    write_matches(&mut std::io::stdout().lock(), &lines)?;

    Ok(())
}
