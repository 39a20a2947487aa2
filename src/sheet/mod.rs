use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{PipelineError, Result};

pub mod schema;

/// A whole-snapshot tabular range: ordered column names plus rows of string
/// cells. This is the shape every stage boundary reads and writes.
///
/// The wire form is either `{"headers": [...], "rows": [[...], ...]}` or a
/// bare 2-D array whose first row is the header row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(headers: Vec<String>) -> Self {
        Sheet {
            headers,
            rows: Vec::new(),
        }
    }

    /// Parses either accepted wire form. Cells that are not JSON strings are
    /// stringified; nulls become empty cells.
    pub fn from_value(value: &Value) -> Result<Sheet> {
        if let Some(obj) = value.as_object() {
            let headers = obj
                .get("headers")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    PipelineError::SnapshotFormat("object snapshot missing headers".into())
                })?;
            let rows = obj
                .get("rows")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    PipelineError::SnapshotFormat("object snapshot missing rows".into())
                })?;
            return Ok(Sheet {
                headers: headers.iter().map(cell_to_string).collect(),
                rows: rows
                    .iter()
                    .map(|row| row_to_strings(row))
                    .collect::<Result<Vec<_>>>()?,
            });
        }

        if let Some(grid) = value.as_array() {
            let mut iter = grid.iter();
            let headers = match iter.next() {
                Some(first) => row_to_strings(first)?,
                None => Vec::new(),
            };
            return Ok(Sheet {
                headers,
                rows: iter
                    .map(|row| row_to_strings(row))
                    .collect::<Result<Vec<_>>>()?,
            });
        }

        Err(PipelineError::SnapshotFormat(
            "snapshot is neither an object nor a 2-D array".into(),
        ))
    }

    pub fn from_json(json: &str) -> Result<Sheet> {
        let value: Value = serde_json::from_str(json)?;
        Sheet::from_value(&value)
    }

    pub fn header_map(&self) -> HeaderMap {
        HeaderMap::new(&self.headers)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn row_to_strings(value: &Value) -> Result<Vec<String>> {
    value
        .as_array()
        .map(|cells| cells.iter().map(cell_to_string).collect())
        .ok_or_else(|| PipelineError::SnapshotFormat("row is not an array".into()))
}

/// Column-name-to-index lookup tolerant of missing columns and ragged rows.
/// Missing columns and short rows both read as empty cells.
pub struct HeaderMap {
    indices: HashMap<String, usize>,
}

impl HeaderMap {
    pub fn new(headers: &[String]) -> Self {
        let indices = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();
        HeaderMap { indices }
    }

    pub fn index(&self, column: &str) -> Option<usize> {
        self.indices.get(column).copied()
    }

    /// Reads a cell by column name, returning "" for anything absent.
    pub fn cell<'a>(&self, row: &'a [String], column: &str) -> &'a str {
        self.index(column)
            .and_then(|i| row.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Parses a cell holding a JSON array of strings. Falls back to splitting on
/// commas and stripping bracket/quote characters when the cell is not valid
/// JSON, which is how hand-edited alias and keyword cells usually arrive.
pub fn parse_string_list_cell(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
            return items
                .iter()
                .map(cell_to_string)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }

    trimmed
        .split(',')
        .map(|part| part.trim().trim_matches(|c| matches!(c, '"' | '[' | ']')).to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_wrapped_object_form() {
        let value = json!({
            "headers": ["A", "B"],
            "rows": [["1", "2"], ["3", null]]
        });
        let sheet = Sheet::from_value(&value).unwrap();
        assert_eq!(sheet.headers, vec!["A", "B"]);
        assert_eq!(sheet.rows[1], vec!["3", ""]);
    }

    #[test]
    fn parses_bare_grid_form() {
        let value = json!([["A", "B"], ["1", "2"]]);
        let sheet = Sheet::from_value(&value).unwrap();
        assert_eq!(sheet.headers, vec!["A", "B"]);
        assert_eq!(sheet.rows.len(), 1);
    }

    #[test]
    fn rejects_scalar_snapshot() {
        assert!(Sheet::from_value(&json!("nope")).is_err());
    }

    #[test]
    fn header_map_tolerates_short_rows_and_missing_columns() {
        let sheet = Sheet {
            headers: vec!["A".into(), "B".into()],
            rows: vec![vec!["only-a".into()]],
        };
        let map = sheet.header_map();
        assert_eq!(map.cell(&sheet.rows[0], "A"), "only-a");
        assert_eq!(map.cell(&sheet.rows[0], "B"), "");
        assert_eq!(map.cell(&sheet.rows[0], "MISSING"), "");
    }

    #[test]
    fn string_list_cell_parses_json_array() {
        assert_eq!(
            parse_string_list_cell(r#"["The O2", "O2 Arena"]"#),
            vec!["The O2", "O2 Arena"]
        );
    }

    #[test]
    fn string_list_cell_falls_back_to_comma_split() {
        assert_eq!(
            parse_string_list_cell(r#"["The O2", broken"#),
            vec!["The O2", "broken"]
        );
        assert_eq!(parse_string_list_cell("a, b ,c"), vec!["a", "b", "c"]);
        assert!(parse_string_list_cell("  ").is_empty());
    }
}
