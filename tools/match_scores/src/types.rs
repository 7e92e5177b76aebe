use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::time::Duration;

/// Raw value of one result column, as the database returned it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Decimal(Decimal),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("None"),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Decimal(v) => write!(f, "{}", v),
            // Keep the fraction so 3.0 never reads as a whole score
            Cell::Float(v) => write!(f, "{:?}", v),
            Cell::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Cell::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Integer(v)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Integer(v.into())
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Null, Into::into)
    }
}

/// One fetched row: match date, home goals, visitor goals.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub match_date: Cell,
    pub home: Cell,
    pub visitor: Cell,
}

impl MatchRecord {
    pub const COLUMNS: usize = 3;

    pub fn new(match_date: impl Into<Cell>, home: impl Into<Cell>, visitor: impl Into<Cell>) -> Self {
        Self {
            match_date: match_date.into(),
            home: home.into(),
            visitor: visitor.into(),
        }
    }
}

/// Ordered column name to type descriptor pairs, used verbatim in `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema(Vec<(String, String)>);

impl FieldSchema {
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            fields
                .into_iter()
                .map(|(name, ty)| (name.into(), ty.into()))
                .collect(),
        )
    }

    /// The three column layout of the match results table.
    pub fn match_results(date_column: &str) -> Self {
        Self::new([
            (date_column, "DATE"),
            ("HOME", "DECIMAL(4,0)"),
            ("VISITOR", "DECIMAL(4,0)"),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, ty)| (name.as_str(), ty.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub rows: u64,
    pub elapsed: Duration,
}
