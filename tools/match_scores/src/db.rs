//! Thin wrapper over the two supported engines. Exposes only what the loader
//! and fetcher need: connect, open a schema, run a statement, bulk import a
//! batch of CSV rows and fetch match rows.

use csv::StringRecord;
use sqlx::{
    postgres::{PgConnectOptions, PgConnection, PgRow},
    sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow},
    Connection, Row, TypeInfo, ValueRef,
};
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::{Backend, ConnectionConfig};
use crate::error::{Error, Result};
use crate::types::{Cell, ImportStats, MatchRecord};

pub enum DbConnection {
    Postgres(PgConnection),
    Sqlite(SqliteConnection),
}

impl DbConnection {
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        match config.backend {
            Backend::Postgres => {
                let mut options = PgConnectOptions::from_str(&config.dsn)?;
                if let Some(user) = &config.user {
                    options = options.username(user);
                }
                if let Some(password) = &config.password {
                    options = options.password(password);
                }
                let conn = PgConnection::connect_with(&options).await?;
                debug!("Connected to Postgres");
                Ok(Self::Postgres(conn))
            }
            Backend::Sqlite => {
                let options = SqliteConnectOptions::from_str(&config.dsn)?.create_if_missing(true);
                let conn = SqliteConnection::connect_with(&options).await?;
                debug!("Connected to SQLite database {}", config.dsn);
                Ok(Self::Sqlite(conn))
            }
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            Self::Postgres(_) => Backend::Postgres,
            Self::Sqlite(_) => Backend::Sqlite,
        }
    }

    pub async fn open_schema(&mut self, schema: &str) -> Result<()> {
        match self {
            Self::Postgres(conn) => {
                sqlx::raw_sql(&format!("SET search_path TO {}", schema))
                    .execute(&mut *conn)
                    .await?;
            }
            Self::Sqlite(_) => {
                // Attached databases are addressed through the qualified table name
                debug!("SQLite has no search path, statements use {}.<table>", schema);
            }
        }
        Ok(())
    }

    /// Runs a statement that returns no rows and reports the affected row count.
    pub async fn execute(&mut self, sql: &str) -> Result<u64> {
        debug!("Executing: {}", sql);
        let rows = match self {
            Self::Postgres(conn) => sqlx::raw_sql(sql).execute(&mut *conn).await?.rows_affected(),
            Self::Sqlite(conn) => sqlx::raw_sql(sql).execute(&mut *conn).await?.rows_affected(),
        };
        Ok(rows)
    }

    /// Removes every row from `table`. SQLite has no TRUNCATE.
    pub async fn truncate(&mut self, table: &str) -> Result<u64> {
        let sql = match self.backend() {
            Backend::Postgres => format!("TRUNCATE TABLE {}", table),
            Backend::Sqlite => format!("DELETE FROM {}", table),
        };
        self.execute(&sql).await
    }

    /// Loads already checked CSV rows into `table` in one call. Empty fields become NULL.
    pub async fn import_rows(&mut self, rows: &[StringRecord], table: &str) -> Result<ImportStats> {
        let started = Instant::now();
        let imported = match self {
            Self::Postgres(conn) => {
                let payload = csv_payload(rows)?;
                let mut copy = conn
                    .copy_in_raw(&format!("COPY {} FROM STDIN WITH (FORMAT csv)", table))
                    .await?;
                copy.send(payload).await?;
                copy.finish().await?
            }
            Self::Sqlite(conn) => {
                let mut tx = conn.begin().await?;
                let mut imported = 0;
                for record in rows {
                    let placeholders = vec!["?"; record.len()].join(", ");
                    let statement = format!("INSERT INTO {} VALUES ({})", table, placeholders);
                    let mut query = sqlx::query(&statement);
                    for field in record.iter() {
                        query = query.bind(Some(field).filter(|f| !f.is_empty()));
                    }
                    imported += query.execute(&mut *tx).await?.rows_affected();
                }
                tx.commit().await?;
                imported
            }
        };

        Ok(ImportStats {
            rows: imported,
            elapsed: started.elapsed(),
        })
    }

    pub async fn fetch_all(&mut self, sql: &str) -> Result<Vec<MatchRecord>> {
        debug!("Fetching: {}", sql);
        match self {
            Self::Postgres(conn) => sqlx::query(sql)
                .fetch_all(&mut *conn)
                .await?
                .iter()
                .map(|row| to_record(row, pg_cell))
                .collect(),
            Self::Sqlite(conn) => sqlx::query(sql)
                .fetch_all(&mut *conn)
                .await?
                .iter()
                .map(|row| to_record(row, sqlite_cell))
                .collect(),
        }
    }

    /// Closes the connection, logging rather than failing if the engine complains.
    pub async fn close(self) {
        let result = match self {
            Self::Postgres(conn) => conn.close().await,
            Self::Sqlite(conn) => conn.close().await,
        };
        if let Err(e) = result {
            warn!("Failed to close database connection cleanly: {}", e);
        }
    }
}

// Unquoted empty fields are NULL to COPY ... WITH (FORMAT csv)
fn csv_payload(rows: &[StringRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in rows {
        writer.write_record(record)?;
    }
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

fn to_record<R: Row>(
    row: &R,
    cell: fn(&R, usize) -> std::result::Result<Cell, sqlx::Error>,
) -> Result<MatchRecord> {
    if row.len() != MatchRecord::COLUMNS {
        return Err(Error::RowShape {
            expected: MatchRecord::COLUMNS,
            found: row.len(),
        });
    }
    Ok(MatchRecord {
        match_date: cell(row, 0)?,
        home: cell(row, 1)?,
        visitor: cell(row, 2)?,
    })
}

fn pg_cell(row: &PgRow, idx: usize) -> std::result::Result<Cell, sqlx::Error> {
    let value = row.try_get_raw(idx)?;
    if value.is_null() {
        return Ok(Cell::Null);
    }
    let type_name = value.type_info().name().to_string();

    let cell = match type_name.as_str() {
        "DATE" => Cell::Date(row.try_get(idx)?),
        "NUMERIC" => Cell::Decimal(row.try_get(idx)?),
        "INT2" => Cell::Integer(row.try_get::<i16, _>(idx)?.into()),
        "INT4" => Cell::Integer(row.try_get::<i32, _>(idx)?.into()),
        "INT8" => Cell::Integer(row.try_get(idx)?),
        "FLOAT4" => Cell::Float(row.try_get::<f32, _>(idx)?.into()),
        "FLOAT8" => Cell::Float(row.try_get(idx)?),
        _ => Cell::Text(row.try_get(idx)?),
    };
    Ok(cell)
}

// SQLite reports the storage class of each value, not the declared column type
fn sqlite_cell(row: &SqliteRow, idx: usize) -> std::result::Result<Cell, sqlx::Error> {
    let value = row.try_get_raw(idx)?;
    if value.is_null() {
        return Ok(Cell::Null);
    }
    let type_name = value.type_info().name().to_string();

    let cell = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => Cell::Integer(row.try_get(idx)?),
        "REAL" => Cell::Float(row.try_get(idx)?),
        _ => Cell::Text(row.try_get(idx)?),
    };
    Ok(cell)
}
