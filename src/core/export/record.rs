//! Row serialization for flat-file exports
//!
//! Anything that can be written to an hourly file implements [`TxtRecord`].
//! The exporter owns the file framing (header first, one line per record,
//! `\n` terminators); a record only renders its own line.

use std::sync::Arc;

/// Field delimiter used in exported files
pub const FIELD_DELIMITER: char = '|';

/// Token written for SQL NULL
///
/// A text value equal to this token loads as NULL too.
pub const NULL_TOKEN: &str = "NULL";

/// A record that can be rendered as one line of a delimited text file
pub trait TxtRecord {
    /// Header line naming the fields, without a trailing newline
    fn txt_header(&self) -> String;

    /// This record's field values, without a trailing newline
    fn txt_values(&self) -> String;
}

/// A source row with every column already cast to text
///
/// Column names are shared between all rows of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedRow {
    columns: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl DelimitedRow {
    /// Creates a row; `values` must line up with `columns`
    pub fn new(columns: Arc<[String]>, values: Vec<Option<String>>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }
}

impl TxtRecord for DelimitedRow {
    fn txt_header(&self) -> String {
        let mut header = String::new();
        for (index, column) in self.columns.iter().enumerate() {
            if index > 0 {
                header.push(FIELD_DELIMITER);
            }
            header.push_str(&escape_field(column));
        }
        header
    }

    fn txt_values(&self) -> String {
        let mut line = String::new();
        for (index, value) in self.values.iter().enumerate() {
            if index > 0 {
                line.push(FIELD_DELIMITER);
            }
            match value {
                Some(text) => line.push_str(&escape_field(text)),
                None => line.push_str(NULL_TOKEN),
            }
        }
        line
    }
}

/// Backslash-escapes the delimiter, backslash and line breaks
///
/// Matches what a warehouse `COPY ... ESCAPE` expects to unescape.
pub fn escape_field(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' | FIELD_DELIMITER | '\n' | '\r' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}
