pub mod config;
pub mod db;
pub mod error;
pub mod fetcher;
pub mod format;
pub mod ingest;
pub mod loader;
pub mod types;
pub mod validate;

use tracing::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::types::FieldSchema;
use crate::validate::{Month, SourcePath, Year};

/// Optionally reloads the table from `source_csv`, then returns the formatted
/// matches for the given month.
pub async fn run(
    month: &Month,
    year: &Year,
    source_csv: Option<&SourcePath>,
    config: &AppConfig,
) -> Result<Vec<String>> {
    info!("Script arguments -> Month: {}, Year: {}.", month, year);

    let date_column = &config.storage.date_column;
    if let Some(source_csv) = source_csv {
        loader::import_csv(
            source_csv.as_path(),
            &FieldSchema::match_results(date_column),
            config,
        )
        .await?;
        info!("Has been loaded data from file -> {}", source_csv);
    }

    let matches = fetcher::fetch_match_data_by_date(month, year, config, date_column).await?;
    Ok(format::format_matches_data(&matches))
}
