use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, Write};
use tracing::info;

use crate::types::{Cell, MatchRecord};

// Non-negative, no leading zero, at most four digits
static SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[1-9][0-9]{3}|[1-9][0-9]{2}|[1-9][0-9]|[0-9])$").unwrap()
});

/// Renders a score as stored if it still looks like a plausible score, `None` otherwise.
pub fn sanitize_score(score: &Cell) -> String {
    let text = score.to_string();
    if SCORE_RE.is_match(&text) {
        text
    } else {
        "None".to_string()
    }
}

pub fn format_match(record: &MatchRecord) -> String {
    format!(
        "{}, {}:{}",
        record.match_date,
        sanitize_score(&record.home),
        sanitize_score(&record.visitor)
    )
}

pub fn format_matches_data(matches: &[MatchRecord]) -> Vec<String> {
    matches.iter().map(format_match).collect()
}

pub const HEADER: &str = "Date, Home:Visitors";

/// Writes the header and one line per match. An empty month writes nothing and
/// is only logged.
pub fn write_matches<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    if lines.is_empty() {
        info!("There were no matches in such month");
        return Ok(());
    }

    writeln!(out, "{}", HEADER)?;
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    #[test]
    fn test_empty_input() {
        assert!(format_matches_data(&[]).is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let matches = vec![
            MatchRecord::new("2020-10-17", 1, 2),
            MatchRecord::new("2020-10-15", 0, 1),
            MatchRecord::new("2020-10-14", 1, 1),
        ];
        assert_eq!(
            format_matches_data(&matches),
            vec!["2020-10-17, 1:2", "2020-10-15, 0:1", "2020-10-14, 1:1"]
        );
    }

    #[test]
    fn test_non_numeric_visitor() {
        let matches = vec![MatchRecord::new("2020-10-17", 1, " ")];
        assert_eq!(format_matches_data(&matches), vec!["2020-10-17, 1:None"]);
    }

    #[test]
    fn test_sanitize_score() {
        assert_eq!(sanitize_score(&Cell::Integer(0)), "0");
        assert_eq!(sanitize_score(&Cell::Integer(9999)), "9999");
        assert_eq!(sanitize_score(&Cell::Decimal(Decimal::from(42))), "42");
        assert_eq!(sanitize_score(&Cell::Integer(10000)), "None");
        assert_eq!(sanitize_score(&Cell::Integer(-1)), "None");
        assert_eq!(sanitize_score(&Cell::Text("07".to_string())), "None");
        assert_eq!(sanitize_score(&Cell::Text("A".to_string())), "None");
        assert_eq!(sanitize_score(&Cell::Float(1.5)), "None");
        assert_eq!(sanitize_score(&Cell::Float(3.0)), "None");
        assert_eq!(sanitize_score(&Cell::Null), "None");
    }

    #[test]
    fn test_missing_scores() {
        let matches = vec![MatchRecord::new("2020-10-01", None::<i64>, Some(2))];
        assert_eq!(format_matches_data(&matches), vec!["2020-10-01, None:2"]);
    }

    #[test]
    fn test_write_matches() {
        let lines = vec!["2020-10-17, 1:2".to_string(), "2020-10-15, 0:None".to_string()];
        let mut out = Vec::new();
        write_matches(&mut out, &lines).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Date, Home:Visitors\n2020-10-17, 1:2\n2020-10-15, 0:None\n"
        );
    }

    #[test]
    fn test_write_matches_empty_month_prints_nothing() {
        let mut out = Vec::new();
        write_matches(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}
