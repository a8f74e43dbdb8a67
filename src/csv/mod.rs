// src/csv/mod.rs
//
// Parsing for the CSV exports the backend writes. The producer guarantees
// comma never appears inside a field value (multi-valued fields are joined
// with ";"), so lines split on the bare delimiter with no quoting support.
// Changing that contract here without changing the producer would silently
// misalign rows.

pub mod group;

use std::collections::HashMap;

/// One parsed CSV resource: the header, in file order, plus one row per
/// data line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    /// Column names from the first line. Order matters for rendering.
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl CsvTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A single data row keyed by header name. Every row of a table carries
/// exactly the table's header names as keys; fields missing from a short
/// line are present with an empty value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvRow(HashMap<String, String>);

impl CsvRow {
    /// Value for `column`, or the empty string when the column is unknown.
    pub fn get(&self, column: &str) -> &str {
        self.0.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Parse comma-delimited text with a header line.
///
/// The first line is the header; every following line becomes a row keyed
/// by header name, with each field trimmed and missing trailing fields
/// defaulting to the empty string. Fields beyond the header width are
/// dropped. Handles both LF and CRLF line endings. Empty input parses to an
/// empty table.
pub fn parse_csv(text: &str) -> CsvTable {
    // The exporter writes utf-8-sig; drop the BOM before it can glue onto
    // the first header name.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text).trim();
    if text.is_empty() {
        return CsvTable::default();
    }

    let mut lines = text.lines();
    let headers: Vec<String> = match lines.next() {
        Some(line) => line.split(',').map(|h| h.trim().to_string()).collect(),
        None => return CsvTable::default(),
    };

    let rows = lines
        .map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            CsvRow(
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| {
                        let value = fields.get(i).map(|f| f.trim()).unwrap_or("");
                        (h.clone(), value.to_string())
                    })
                    .collect(),
            )
        })
        .collect();

    CsvTable { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_match_header_width() {
        let table = parse_csv("a,b,c\n1,2,3\n4,5,6\n");
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.rows.len(), 2);
        for row in &table.rows {
            assert_eq!(row.len(), 3);
        }
        assert_eq!(table.rows[0].get("a"), "1");
        assert_eq!(table.rows[1].get("c"), "6");
    }

    #[test]
    fn short_lines_pad_with_empty() {
        let table = parse_csv("a,b,c\n1,2\n");
        assert_eq!(table.rows[0].get("b"), "2");
        assert_eq!(table.rows[0].get("c"), "");
        assert_eq!(table.rows[0].len(), 3);
    }

    #[test]
    fn excess_fields_are_dropped() {
        let table = parse_csv("a,b\n1,2,3,4\n");
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[0].get("b"), "2");
    }

    #[test]
    fn fields_are_trimmed() {
        let table = parse_csv("metric , value\n total , 42 \n");
        assert_eq!(table.headers, vec!["metric", "value"]);
        assert_eq!(table.rows[0].get("value"), "42");
    }

    #[test]
    fn header_only_is_empty() {
        let table = parse_csv("a,b,c\n");
        assert_eq!(table.headers.len(), 3);
        assert!(table.is_empty());
    }

    #[test]
    fn empty_text_is_empty_table() {
        assert_eq!(parse_csv(""), CsvTable::default());
        assert_eq!(parse_csv("  \n "), CsvTable::default());
    }

    #[test]
    fn crlf_line_endings() {
        let table = parse_csv("a,b\r\n1,2\r\n3,4\r\n");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].get("a"), "3");
    }

    #[test]
    fn leading_bom_is_stripped() {
        let table = parse_csv("\u{feff}a,b\n1,2\n");
        assert_eq!(table.headers[0], "a");
        assert_eq!(table.rows[0].get("a"), "1");
    }

    #[test]
    fn unknown_column_reads_empty() {
        let table = parse_csv("a\n1\n");
        assert_eq!(table.rows[0].get("missing"), "");
    }
}
