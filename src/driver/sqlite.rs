//! Synchronous `SQLite` driver backed by rusqlite.

use std::sync::Arc;

use rusqlite::Connection;
use rusqlite::types::Value as SqliteValue;

use crate::driver::{ConnectionAttributes, ConnectionSpec, DriverConnection, DriverKind};
use crate::error::SqlAdapterError;
use crate::results::ResultSet;
use crate::types::{SQL_TIMESTAMP_FORMAT, SqlValue};

/// Live `SQLite` connection.
pub struct SqliteConnection {
    conn: Connection,
}

impl SqliteConnection {
    /// Open the database named by a `sqlite:<path>` spec. An empty path or
    /// `:memory:` opens an in-memory database.
    ///
    /// # Errors
    /// Returns `SqlAdapterError::ConnectionError` if the database cannot be
    /// opened.
    pub fn open(spec: &ConnectionSpec) -> Result<Self, SqlAdapterError> {
        let target = spec.rest();
        let conn = if target.is_empty() || target == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(target)
        }
        .map_err(|e| {
            SqlAdapterError::ConnectionError(format!(
                "failed to open sqlite database '{target}': {e}"
            ))
        })?;
        Ok(Self { conn })
    }
}

fn to_sqlite_value(value: &SqlValue) -> SqliteValue {
    match value {
        SqlValue::Int(i) => SqliteValue::Integer(*i),
        SqlValue::Float(f) => SqliteValue::Real(*f),
        SqlValue::Text(s) => SqliteValue::Text(s.clone()),
        SqlValue::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        SqlValue::Timestamp(ts) => {
            SqliteValue::Text(ts.format(SQL_TIMESTAMP_FORMAT).to_string())
        }
        SqlValue::Null => SqliteValue::Null,
        SqlValue::JSON(v) => SqliteValue::Text(v.to_string()),
        SqlValue::Blob(b) => SqliteValue::Blob(b.clone()),
    }
}

fn from_sqlite_value(value: SqliteValue) -> SqlValue {
    match value {
        SqliteValue::Null => SqlValue::Null,
        SqliteValue::Integer(i) => SqlValue::Int(i),
        SqliteValue::Real(f) => SqlValue::Float(f),
        SqliteValue::Text(s) => SqlValue::Text(s),
        SqliteValue::Blob(b) => SqlValue::Blob(b),
    }
}

impl DriverConnection for SqliteConnection {
    fn kind(&self) -> DriverKind {
        DriverKind::Sqlite
    }

    fn apply_attributes(&mut self, _attrs: &ConnectionAttributes) -> Result<(), SqlAdapterError> {
        // Associative rows, strict errors and buffered results are inherent
        // to the rusqlite API; nothing to configure.
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<u64, SqlAdapterError> {
        self.conn.execute_batch(sql)?;
        Ok(self.conn.changes())
    }

    fn execute_with(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, SqlAdapterError> {
        let converted: Vec<SqliteValue> = params.iter().map(to_sqlite_value).collect();
        let mut stmt = self.conn.prepare(sql)?;
        let affected = stmt.execute(rusqlite::params_from_iter(converted))?;
        Ok(affected as u64)
    }

    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, SqlAdapterError> {
        let converted: Vec<SqliteValue> = params.iter().map(to_sqlite_value).collect();
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .map(std::string::ToString::to_string)
            .collect();
        let columns = Arc::new(columns);

        let mut result = ResultSet::with_capacity(10);
        result.set_columns(Arc::clone(&columns));

        let mut rows = stmt.query(rusqlite::params_from_iter(converted))?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                let value: SqliteValue = row.get(idx)?;
                values.push(from_sqlite_value(value));
            }
            result.add_row_values(values);
        }
        Ok(result)
    }

    fn begin_transaction(&mut self) -> Result<(), SqlAdapterError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SqlAdapterError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SqlAdapterError> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn quote_literal(&self, value: &SqlValue) -> Result<String, SqlAdapterError> {
        // Delegate to the engine's own quote() so the escaping rules are
        // always sqlite's, not ours.
        let quoted = self.conn.query_row(
            "SELECT quote(?1)",
            [to_sqlite_value(value)],
            |row| row.get::<_, String>(0),
        )?;
        Ok(quoted)
    }

    fn last_insert_id(&mut self) -> Result<i64, SqlAdapterError> {
        Ok(self.conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_conn() -> SqliteConnection {
        SqliteConnection::open(&ConnectionSpec::new("sqlite::memory:")).unwrap()
    }

    #[test]
    fn quote_literal_uses_engine_rules() {
        let conn = memory_conn();
        assert_eq!(
            conn.quote_literal(&SqlValue::Text("a'b".into())).unwrap(),
            "'a''b'"
        );
        assert_eq!(conn.quote_literal(&SqlValue::Int(42)).unwrap(), "42");
        assert_eq!(conn.quote_literal(&SqlValue::Null).unwrap(), "NULL");
        assert_eq!(
            conn.quote_literal(&SqlValue::Blob(vec![0xab])).unwrap(),
            "X'ab'"
        );
    }

    #[test]
    fn execute_and_query_round_trip() {
        let mut conn = memory_conn();
        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        let affected = conn
            .execute_with(
                "INSERT INTO t (name) VALUES (?)",
                &[SqlValue::Text("alice".into())],
            )
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(conn.last_insert_id().unwrap(), 1);

        let rs = conn
            .query("SELECT id, name FROM t WHERE name = ?", &[SqlValue::Text("alice".into())])
            .unwrap();
        assert_eq!(rs.rows.len(), 1);
        assert_eq!(rs.rows[0].get("id"), Some(&SqlValue::Int(1)));
    }

    #[test]
    fn open_failure_is_a_connection_error() {
        let spec = ConnectionSpec::new("sqlite:/nonexistent-dir/sub/db.sqlite");
        assert!(matches!(
            SqliteConnection::open(&spec),
            Err(SqlAdapterError::ConnectionError(_))
        ));
    }
}
