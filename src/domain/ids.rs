//! Domain identifier types with validation
//!
//! Bucket and table names end up both in object keys and in SQL text, so
//! they are validated once at construction and carried as newtypes after that.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .expect("identifier pattern is a valid regex")
    })
}

/// Returns true if `name` is a plain or schema-qualified SQL identifier
///
/// Only unquoted identifiers are accepted: letters, digits and underscores,
/// optionally prefixed by one `schema.` qualifier.
pub fn is_sql_identifier(name: &str) -> bool {
    identifier_pattern().is_match(name)
}

/// Object store bucket name
///
/// # Examples
///
/// ```
/// use hourglass::domain::ids::BucketName;
///
/// let bucket = BucketName::new("analytics-archive").unwrap();
/// assert_eq!(bucket.as_str(), "analytics-archive");
/// assert!(BucketName::new("a/b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketName(String);

impl BucketName {
    /// Creates a new BucketName
    ///
    /// Rejects empty names and names containing `/` or whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Bucket name cannot be empty".to_string());
        }
        if name.contains('/') || name.chars().any(char::is_whitespace) {
            return Err(format!(
                "Bucket name '{name}' must not contain '/' or whitespace"
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BucketName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for BucketName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BucketName> for String {
    fn from(value: BucketName) -> Self {
        value.0
    }
}

impl AsRef<str> for BucketName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Exported table name
///
/// Used verbatim as the top-level key prefix, as the file name stem and as
/// the table identifier in generated SQL.
///
/// # Examples
///
/// ```
/// use hourglass::domain::ids::TableName;
///
/// let table = TableName::new("events").unwrap();
/// assert_eq!(table.to_string(), "events");
/// assert!(TableName::new("events; drop table x").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Creates a new TableName
    ///
    /// The name must be a plain or schema-qualified SQL identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.is_empty() {
            return Err("Table name cannot be empty".to_string());
        }
        if !is_sql_identifier(&name) {
            return Err(format!("Table name '{name}' is not a valid SQL identifier"));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TableName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TableName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TableName> for String {
    fn from(value: TableName) -> Self {
        value.0
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
