//! Validated target table name.
//!
//! Table names cannot be bound as parameters, so they are spliced into SQL
//! text. Only plain lowercase identifiers are accepted.

use std::fmt;
use std::str::FromStr;

use crate::config::{CSV_HEADER, DEFAULT_TABLE};
use crate::error_handling::DatabaseError;

/// PostgreSQL truncates identifiers longer than this.
const MAX_IDENTIFIER_LEN: usize = 63;

/// A table name safe to interpolate into SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Validates `name`: lowercase ASCII letters, digits and underscores, not
    /// starting with a digit.
    pub fn new(name: impl Into<String>) -> Result<Self, DatabaseError> {
        let name = name.into();
        let valid_start = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
        let valid_rest = name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

        if valid_start && valid_rest && name.len() <= MAX_IDENTIFIER_LEN {
            Ok(Self(name))
        } else {
            Err(DatabaseError::InvalidTableName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Comma-separated column list in CSV order.
    pub fn column_list() -> String {
        CSV_HEADER.join(", ")
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE.to_string())
    }
}

impl FromStr for TableName {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
