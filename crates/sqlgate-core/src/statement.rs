//! SQL statements and positional-placeholder scanning.

use crate::error::{ParameterError, Result};
use crate::value::Value;

/// An immutable SQL text plus an optional ordered sequence of positional
/// bind parameters.
#[derive(Debug, Clone)]
pub struct Statement {
    sql: String,
    params: Option<Vec<Value>>,
}

impl Statement {
    /// Create an unparameterized statement.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: None,
        }
    }

    /// Create a statement with positional parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params: Some(params),
        }
    }

    /// The SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The bind parameters, if any were supplied.
    pub fn params(&self) -> Option<&[Value]> {
        self.params.as_deref()
    }

    /// Whether the statement carries a non-empty parameter sequence.
    ///
    /// An absent and an empty sequence are equivalent: both dispatch through
    /// the unparameterized driver entry points.
    pub fn has_params(&self) -> bool {
        self.params.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Number of positional placeholders in the SQL text.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.sql)
    }

    /// Check the supplied parameter count against the placeholder count.
    pub fn validate(&self) -> Result<()> {
        let expected = self.placeholder_count();
        let supplied = self.params.as_ref().map_or(0, Vec::len);
        if supplied == expected {
            Ok(())
        } else {
            Err(ParameterError::count_mismatch(expected, supplied, self.sql.clone()).into())
        }
    }
}

/// Count the positional placeholders in a SQL text.
///
/// Recognizes `?`, `?N`, and `$N`. String literals (`'...'`, with `''`
/// escapes), quoted identifiers (`"..."`, `` `...` ``), line comments
/// (`-- ...`) and block comments (`/* ... */`) are skipped. Numbered
/// placeholders follow SQLite's rule: a bare `?` takes the next index after
/// the largest one seen so far, and the count is the largest index overall.
pub fn count_placeholders(sql: &str) -> usize {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    let mut max_index = 0usize;

    while i < len {
        match bytes[i] {
            // String literal; a doubled quote re-enters the literal on the
            // next loop iteration, so '' needs no special case.
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < len && bytes[i] != quote {
                    i += 1;
                }
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < len && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < len && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(len);
            }
            marker @ (b'?' | b'$') => {
                i += 1;
                let digits_start = i;
                while i < len && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if i > digits_start {
                    let n: usize = sql[digits_start..i].parse().unwrap_or(0);
                    max_index = max_index.max(n);
                } else if marker == b'?' {
                    // Bare '?' takes the next index; a bare '$' is not a
                    // placeholder.
                    max_index += 1;
                }
            }
            _ => i += 1,
        }
    }

    max_index
}
