//! CSV category import.
//!
//! Expected header: `Parent,Child,Type,Hidden,Savings,Description`. A
//! missing `Parent` or `Child` header fails the whole import; bad rows are
//! collected individually and the valid remainder still goes through.

use csv::ReaderBuilder;
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub parent: String,
    pub child: String,
    pub hidden: bool,
    pub savings: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RowError {
    /// 1-based file line; the header is line 1.
    pub row: usize,
    pub error: String,
}

/// Truthy values for the boolean columns, matched case-insensitively.
fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "yes" | "true" | "1" | "y"
    )
}

fn header_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

pub fn parse(text: &str) -> Result<(Vec<ParsedRow>, Vec<RowError>), ApiError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ApiError::Invalid(format!("csv: {e}")))?
        .clone();
    let parent_idx = header_index(&headers, "Parent")
        .ok_or_else(|| ApiError::Invalid("csv: missing required header \"Parent\"".into()))?;
    let child_idx = header_index(&headers, "Child")
        .ok_or_else(|| ApiError::Invalid("csv: missing required header \"Child\"".into()))?;
    let hidden_idx = header_index(&headers, "Hidden");
    let savings_idx = header_index(&headers, "Savings");

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let line = i + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                errors.push(RowError {
                    row: line,
                    error: format!("malformed row: {e}"),
                });
                continue;
            }
        };
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i)).unwrap_or("").trim().to_string()
        };
        let parent = field(Some(parent_idx));
        let child = field(Some(child_idx));
        if parent.is_empty() {
            errors.push(RowError {
                row: line,
                error: "Parent is required".into(),
            });
            continue;
        }
        if child.is_empty() {
            errors.push(RowError {
                row: line,
                error: "Child is required".into(),
            });
            continue;
        }
        rows.push(ParsedRow {
            parent,
            child,
            hidden: parse_bool(&field(hidden_idx)),
            savings: parse_bool(&field(savings_idx)),
        });
    }

    if rows.is_empty() {
        return Err(ApiError::Invalid("csv: no valid data rows".into()));
    }
    Ok((rows, errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Parent,Child,Type,Hidden,Savings,Description\n";

    #[test]
    fn parses_valid_rows() {
        let csv = format!(
            "{HEADER}Food,Groceries,expense,no,no,Weekly shop\nFood,Restaurants,expense,,,\n"
        );
        let (rows, errors) = parse(&csv).unwrap();
        assert!(errors.is_empty());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].parent, "Food");
        assert_eq!(rows[0].child, "Groceries");
        assert!(!rows[0].hidden);
    }

    #[test]
    fn boolean_columns_accept_truthy_spellings() {
        let csv = format!(
            "{HEADER}Savings,Emergency Fund,expense,YES,y,\nSavings,Vacation,expense,1,TRUE,\n"
        );
        let (rows, _) = parse(&csv).unwrap();
        assert!(rows.iter().all(|r| r.hidden && r.savings));
    }

    #[test]
    fn row_missing_child_is_reported_not_fatal() {
        let csv = format!("{HEADER}Food,Groceries,,,,\nFood,,,,,\n");
        let (rows, errors) = parse(&csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(errors, vec![RowError { row: 3, error: "Child is required".into() }]);
    }

    #[test]
    fn missing_required_header_short_circuits() {
        let err = parse("Parent,Type,Hidden,Savings,Description\nFood,expense,,,\n").unwrap_err();
        assert!(err.to_string().contains("Child"));
    }

    #[test]
    fn no_valid_rows_is_a_top_level_failure() {
        let csv = format!("{HEADER},Orphan,,,,\n");
        assert!(parse(&csv).is_err());
        assert!(parse(HEADER).is_err());
    }

    #[test]
    fn quoted_fields_with_commas() {
        let csv = format!("{HEADER}\"Food, Drink & Fun\",\"Bars, Pubs\",expense,no,no,\n");
        let (rows, _) = parse(&csv).unwrap();
        assert_eq!(rows[0].parent, "Food, Drink & Fun");
        assert_eq!(rows[0].child, "Bars, Pubs");
    }
}
