use std::collections::HashMap;
use std::sync::Arc;

use crate::types::SqlValue;

/// A row from a query result, with access by column name or index.
///
/// Column names are shared across all rows of one result set.
#[derive(Debug, Clone)]
pub struct Row {
    /// The column names for this row.
    pub columns: Arc<Vec<String>>,
    /// The values for this row.
    pub values: Vec<SqlValue>,
    // Cache for column lookups, shared with the owning result set.
    column_index: Arc<HashMap<String, usize>>,
}

impl Row {
    #[must_use]
    pub fn new(columns: Arc<Vec<String>>, values: Vec<SqlValue>) -> Self {
        let column_index = Arc::new(index_of(&columns));
        Self {
            columns,
            values,
            column_index,
        }
    }

    /// Get a value by column name, or `None` if the column is unknown.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.column_index
            .get(column)
            .copied()
            .or_else(|| self.columns.iter().position(|c| c == column))
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value by column index.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Clone the row out into ordered `(column, value)` pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, SqlValue)> {
        self.columns
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }
}

fn index_of(columns: &[String]) -> HashMap<String, usize> {
    columns
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

/// The rows returned by a query, plus the affected-row count for DML.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    columns: Option<Arc<Vec<String>>>,
    column_index: Option<Arc<HashMap<String, usize>>>,
    /// The rows returned by the query.
    pub rows: Vec<Row>,
    /// Rows affected; for SELECTs this tracks the row count.
    pub rows_affected: u64,
}

impl ResultSet {
    /// Create a result set with a preallocated row capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            columns: None,
            column_index: None,
            rows: Vec::with_capacity(capacity),
            rows_affected: 0,
        }
    }

    /// Set the shared column names for subsequent rows.
    pub fn set_columns(&mut self, columns: Arc<Vec<String>>) {
        self.column_index = Some(Arc::new(index_of(&columns)));
        self.columns = Some(columns);
    }

    #[must_use]
    pub fn columns(&self) -> Option<&Arc<Vec<String>>> {
        self.columns.as_ref()
    }

    /// Append a row sharing the result set's column names.
    pub fn add_row_values(&mut self, values: Vec<SqlValue>) {
        let columns = self
            .columns
            .clone()
            .unwrap_or_else(|| Arc::new(Vec::new()));
        let column_index = self
            .column_index
            .clone()
            .unwrap_or_else(|| Arc::new(HashMap::new()));
        self.rows.push(Row {
            columns,
            values,
            column_index,
        });
        self.rows_affected += 1;
    }
}
