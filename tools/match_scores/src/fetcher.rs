use tracing::info;

use crate::config::AppConfig;
use crate::db::DbConnection;
use crate::error::Result;
use crate::types::MatchRecord;
use crate::validate::{Month, Year};

/// Selects every row whose date column, read as text, starts with `<year>-<month>-`.
pub fn select_by_month_sql(table: &str, date_column: &str, year: &Year, month: &Month) -> String {
    format!(
        "SELECT * FROM {} WHERE CAST({} AS TEXT) LIKE '{}-{}-%'",
        table, date_column, year, month
    )
}

/// Rows come back in whatever order the database returns them.
pub async fn fetch_match_data_by_date(
    month: &Month,
    year: &Year,
    config: &AppConfig,
    date_column: &str,
) -> Result<Vec<MatchRecord>> {
    let mut conn = DbConnection::connect(&config.connection).await?;
    let result = fetch_with(&mut conn, month, year, config, date_column).await;
    conn.close().await;
    result
}

async fn fetch_with(
    conn: &mut DbConnection,
    month: &Month,
    year: &Year,
    config: &AppConfig,
    date_column: &str,
) -> Result<Vec<MatchRecord>> {
    conn.open_schema(&config.storage.schema).await?;

    let table = config.storage.qualified_table();
    let matches = conn
        .fetch_all(&select_by_month_sql(&table, date_column, year, month))
        .await?;
    info!("Fetched {} matches for {}-{} from {}", matches.len(), year, month, table);
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{valid_month, valid_year};

    #[test]
    fn test_select_by_month_sql() {
        let sql = select_by_month_sql(
            "public.MATCHES",
            "MATCH_DATE",
            &valid_year("2020").unwrap(),
            &valid_month("09").unwrap(),
        );
        assert_eq!(
            sql,
            "SELECT * FROM public.MATCHES WHERE CAST(MATCH_DATE AS TEXT) LIKE '2020-09-%'"
        );
    }
}
