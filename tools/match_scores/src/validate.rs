//! Argument validators. Each returns a newtype that can only be built here,
//! so anything holding a [`Month`], [`Year`] or [`SourcePath`] has already
//! passed its check.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

static MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:0[1-9]|1[0-2])$").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[1-3][0-9]{3}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("Parameter 'month' should have the following format -> 'MM' but has -> '{0}'.")]
    Month(String),
    #[error("Parameter 'year' should have the following format -> 'YYYY' but has -> '{0}'.")]
    Year(String),
    #[error("No such path: '{0}'.")]
    Path(String),
}

/// Two digit month, `01` to `12`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Month(String);

impl Month {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Four digit year starting with 1, 2 or 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Year(String);

impl Year {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A path that existed when it was validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePath(PathBuf);

impl SourcePath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

pub fn valid_month(m: &str) -> Result<Month, ArgumentError> {
    if MONTH_RE.is_match(m) {
        Ok(Month(m.to_string()))
    } else {
        Err(ArgumentError::Month(m.to_string()))
    }
}

pub fn valid_year(y: &str) -> Result<Year, ArgumentError> {
    if YEAR_RE.is_match(y) {
        Ok(Year(y.to_string()))
    } else {
        Err(ArgumentError::Year(y.to_string()))
    }
}

// Existence is only checked here; the file may disappear before it is read.
pub fn valid_path(path: &str) -> Result<SourcePath, ArgumentError> {
    if Path::new(path).exists() {
        Ok(SourcePath(PathBuf::from(path)))
    } else {
        Err(ArgumentError::Path(path.to_string()))
    }
}
