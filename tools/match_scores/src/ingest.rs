//! Reads a match CSV into memory and checks every cell against the target
//! field schema, so a bad file is rejected before the table is touched.

use csv::StringRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::FieldSchema;

static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:DECIMAL|NUMERIC|DEC)\s*(?:\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\))?$").unwrap()
});
static TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:VARCHAR|CHAR|CHARACTER VARYING|CHARACTER)\s*\(\s*(\d+)\s*\)$").unwrap()
});

const DEFAULT_PRECISION: u32 = 18;

/// What a column type descriptor allows, as far as the import cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Date,
    Decimal { precision: u32, scale: u32 },
    Integer,
    Text { max_len: usize },
    Unchecked,
}

impl ColumnType {
    pub fn parse(descriptor: &str) -> Self {
        let descriptor = descriptor.trim().to_uppercase();

        if descriptor == "DATE" {
            return ColumnType::Date;
        }
        if matches!(descriptor.as_str(), "INT" | "INTEGER" | "BIGINT" | "SMALLINT") {
            return ColumnType::Integer;
        }
        if let Some(caps) = DECIMAL_RE.captures(&descriptor) {
            let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
            return ColumnType::Decimal {
                precision: number(1).unwrap_or(DEFAULT_PRECISION),
                scale: number(2).unwrap_or(0),
            };
        }
        if let Some(max_len) = TEXT_RE
            .captures(&descriptor)
            .and_then(|caps| caps[1].parse::<usize>().ok())
        {
            return ColumnType::Text { max_len };
        }
        ColumnType::Unchecked
    }

    /// Returns the reason `value` cannot be stored in a column of this type.
    pub fn check(&self, value: &str) -> Option<String> {
        match *self {
            ColumnType::Date => chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .err()
                .map(|_| "invalid value for date format YYYY-MM-DD".to_string()),
            ColumnType::Decimal { precision, scale } => check_decimal(value, precision, scale),
            ColumnType::Integer => value
                .parse::<i64>()
                .err()
                .map(|_| "invalid character value for cast".to_string()),
            ColumnType::Text { max_len } => (value.chars().count() > max_len)
                .then(|| format!("value too long for a column of {} characters", max_len)),
            ColumnType::Unchecked => None,
        }
    }
}

fn check_decimal(value: &str, precision: u32, scale: u32) -> Option<String> {
    let number = match Decimal::from_str(value) {
        Ok(number) => number.normalize(),
        Err(_) => return Some("invalid character value for cast".to_string()),
    };
    if number.scale() > scale {
        return Some(format!("more than {} digits after the decimal point", scale));
    }
    let whole = number.trunc().abs();
    let digits = if whole.is_zero() { 0 } else { whole.to_string().len() };
    if digits > precision.saturating_sub(scale) as usize {
        return Some(format!("numeric value out of range for DECIMAL({},{})", precision, scale));
    }
    None
}

/// Cells a spreadsheet would evaluate as a formula. A minus sign followed by a
/// digit is an ordinary negative number.
pub fn is_formula(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some('=' | '+' | '@' | '\t' | '\r') => true,
        Some('-') => chars.next().is_some_and(|c| !c.is_ascii_digit()),
        _ => false,
    }
}

/// Reads every data row of `csv_file`, skipping rows that start with `#`, and rejects the whole
/// file on the first formula cell, wrong field count or value that does not fit
/// its column. Empty cells are NULL and always accepted.
pub fn read_csv_rows(csv_file: &Path, fields: &FieldSchema) -> Result<Vec<StringRecord>> {
    let column_types: Vec<ColumnType> = fields.iter().map(|(_, ty)| ColumnType::parse(ty)).collect();

    // Comment rows are skipped here rather than by the reader so that record
    // positions stay on the physical line
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(csv_file)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.get(0).is_some_and(|first| first.starts_with('#')) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());

        if let Some(value) = record.iter().find(|v| is_formula(v)) {
            return Err(Error::InsecureCsv {
                line,
                value: value.to_string(),
            });
        }
        if record.len() != column_types.len() {
            return Err(Error::FieldCount {
                line,
                expected: column_types.len(),
                found: record.len(),
            });
        }
        for (value, column_type) in record.iter().zip(&column_types) {
            if value.is_empty() {
                continue;
            }
            if let Some(reason) = column_type.check(value) {
                return Err(Error::Cast {
                    line,
                    value: value.to_string(),
                    reason,
                });
            }
        }
        rows.push(record);
    }

    debug!("Read {} rows from {:?}", rows.len(), csv_file);
    Ok(rows)
}
