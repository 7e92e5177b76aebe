use csv::StringRecord;
use std::path::Path;
use tracing::info;

use crate::config::AppConfig;
use crate::db::DbConnection;
use crate::error::Result;
use crate::ingest;
use crate::types::{FieldSchema, ImportStats};

pub fn create_table_sql(table: &str, fields: &FieldSchema) -> String {
    let fields_str = fields
        .iter()
        .map(|(name, ty)| format!("{} {}", name, ty))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {} ({})", table, fields_str)
}

/// Creates the configured table if needed, empties it and bulk loads `csv_file` into it.
///
/// The file is read and checked against `fields` before any connection is opened,
/// so a rejected file leaves the table as it was. Database errors are returned as
/// is and nothing is retried.
pub async fn import_csv(csv_file: &Path, fields: &FieldSchema, config: &AppConfig) -> Result<ImportStats> {
    let rows = ingest::read_csv_rows(csv_file, fields)?;

    let mut conn = DbConnection::connect(&config.connection).await?;
    let result = load_into(&mut conn, &rows, csv_file, fields, config).await;
    conn.close().await;
    result
}

async fn load_into(
    conn: &mut DbConnection,
    rows: &[StringRecord],
    csv_file: &Path,
    fields: &FieldSchema,
    config: &AppConfig,
) -> Result<ImportStats> {
    conn.open_schema(&config.storage.schema).await?;

    let table = config.storage.qualified_table();
    conn.execute(&create_table_sql(&table, fields)).await?;

    let removed = conn.truncate(&table).await?;
    info!("Cleared table {} ({} rows removed)", table, removed);

    let stats = conn.import_rows(rows, &table).await?;
    info!(
        "Imported {} rows from {:?} into {} in {} ms",
        stats.rows,
        csv_file,
        table,
        stats.elapsed.as_millis()
    );
    Ok(stats)
}
