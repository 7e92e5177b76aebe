// Library error; database errors pass through with their original message
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV file contains insecure construction at line {line}: '{value}'")]
    InsecureCsv { line: u64, value: String },
    #[error("Transformation of value='{value}' failed at line {line} - {reason}")]
    Cast {
        line: u64,
        value: String,
        reason: String,
    },
    #[error("CSV line {line} has {found} fields but the table has {expected} columns")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Expected {expected} columns per match row but the table returned {found}")]
    RowShape { expected: usize, found: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
