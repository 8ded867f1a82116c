//! Query and update results.

use crate::row::{ColumnInfo, Row};
use crate::value::Value;
use std::sync::Arc;

/// An ordered sequence of rows returned by a query.
///
/// All rows share one `ColumnInfo`; the column set is consistent across the
/// whole result and keeps the order the database reported it in.
#[derive(Debug, Clone)]
pub struct ResultSet {
    columns: Arc<ColumnInfo>,
    rows: Vec<Row>,
}

impl ResultSet {
    /// Create a result set from shared column metadata and rows.
    ///
    /// This is typically called by a driver, not by users directly.
    pub fn new(columns: Arc<ColumnInfo>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// An empty result set with no columns (non-query statements).
    pub fn empty() -> Self {
        Self {
            columns: Arc::new(ColumnInfo::new(Vec::new())),
            rows: Vec::new(),
        }
    }

    /// Get the shared column metadata.
    pub fn columns(&self) -> &ColumnInfo {
        &self.columns
    }

    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by index.
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Iterate over the rows in order.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Consume the result set, returning the rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Take the first row, if any, consuming the result set.
    pub fn into_first(mut self) -> Option<Row> {
        if self.rows.is_empty() {
            None
        } else {
            Some(self.rows.swap_remove(0))
        }
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// The result of an INSERT/UPDATE/DELETE statement.
#[derive(Debug, Clone, Default)]
pub struct UpdateResult {
    /// Number of rows affected by the statement.
    pub rows_affected: u64,
    /// Keys generated by the statement (auto-increment ids), when the
    /// driver reports them.
    pub generated_keys: Option<Vec<Value>>,
}

impl UpdateResult {
    /// Create an update result with no generated keys.
    pub fn new(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            generated_keys: None,
        }
    }

    /// Attach generated keys.
    pub fn with_keys(mut self, keys: Vec<Value>) -> Self {
        self.generated_keys = Some(keys);
        self
    }

    /// First generated key, if any.
    pub fn first_key(&self) -> Option<&Value> {
        self.generated_keys.as_ref().and_then(|k| k.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        let columns = Arc::new(ColumnInfo::new(vec!["id".to_string(), "name".to_string()]));
        let rows = vec![
            Row::with_columns(
                Arc::clone(&columns),
                vec![Value::Int(1), Value::Text("Alice".to_string())],
            ),
            Row::with_columns(
                Arc::clone(&columns),
                vec![Value::Int(2), Value::Text("Bob".to_string())],
            ),
        ];
        ResultSet::new(columns, rows)
    }

    #[test]
    fn test_result_set_access() {
        let rs = sample();
        assert_eq!(rs.len(), 2);
        assert!(!rs.is_empty());
        assert_eq!(rs.columns().names(), &["id", "name"]);
        assert_eq!(rs.get(0).unwrap().get_named::<i64>("id").unwrap(), 1);
        assert_eq!(rs.get(2), None);
    }

    #[test]
    fn test_result_set_iteration_order() {
        let rs = sample();
        let ids: Vec<i64> = rs
            .iter()
            .map(|row| row.get_named::<i64>("id").unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_result_set_into_first() {
        let rs = sample();
        let first = rs.into_first().unwrap();
        assert_eq!(first.get_named::<String>("name").unwrap(), "Alice");

        assert!(ResultSet::empty().into_first().is_none());
    }

    #[test]
    fn test_empty_result_set() {
        let rs = ResultSet::empty();
        assert!(rs.is_empty());
        assert_eq!(rs.len(), 0);
        assert!(rs.columns().is_empty());
    }

    #[test]
    fn test_update_result() {
        let res = UpdateResult::new(3);
        assert_eq!(res.rows_affected, 3);
        assert!(res.generated_keys.is_none());
        assert!(res.first_key().is_none());

        let res = UpdateResult::new(1).with_keys(vec![Value::Int(7)]);
        assert_eq!(res.first_key(), Some(&Value::Int(7)));
    }
}
