//! The adapter: lazy connection, quoting, templating, statement building,
//! logging and nested-transaction emulation behind one facade.

use tracing::debug;

use crate::connection::LazyConnection;
use crate::driver::{ConnectionSpec, Driver, DriverConnection};
use crate::error::SqlAdapterError;
use crate::log::QueryLog;
use crate::placeholder::expand_placeholders;
use crate::quoting::{ConnectionQuoter, wrap_identifier};
use crate::results::{ResultSet, Row};
use crate::transaction::{TransactionState, TxStatement};
use crate::types::{SqlParam, SqlValue};

/// Quoted fragments derived from one ordered value set.
struct ColumnValues {
    columns: Vec<String>,
    data: Vec<String>,
    updates: Vec<String>,
}

/// A lazily connected database adapter.
///
/// One adapter owns one (eventual) driver connection and one transaction
/// state. It is synchronous and not internally synchronized; callers using
/// it from multiple threads must serialize access themselves.
///
/// ```rust,no_run
/// use sql_adapter::prelude::*;
///
/// # fn demo() -> Result<(), SqlAdapterError> {
/// let mut db = Adapter::new(ConnectionSpec::new("sqlite:app.db"));
/// db.insert("users", &[("name".to_string(), SqlValue::Text("alice".into()))])?;
/// let rows = db.fetch_all("* FROM users", &[])?;
/// # let _ = rows;
/// # Ok(())
/// # }
/// ```
pub struct Adapter {
    connection: LazyConnection,
    log: QueryLog,
    tx: TransactionState,
    protect_names: bool,
}

impl Adapter {
    /// Create an adapter using the built-in driver selection. Nothing
    /// connects until the first operation needs the database.
    #[must_use]
    pub fn new(spec: ConnectionSpec) -> Self {
        Self::with_driver_box(LazyConnection::new(spec))
    }

    /// Create an adapter with an explicit driver implementation.
    #[must_use]
    pub fn with_driver(spec: ConnectionSpec, driver: Box<dyn Driver>) -> Self {
        Self::with_driver_box(LazyConnection::with_driver(spec, driver))
    }

    fn with_driver_box(connection: LazyConnection) -> Self {
        Self {
            connection,
            log: QueryLog::new(),
            tx: TransactionState::new(),
            protect_names: true,
        }
    }

    #[must_use]
    pub fn spec(&self) -> &ConnectionSpec {
        self.connection.spec()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Set the charset used for the one-time `SET NAMES` directive.
    pub fn set_names(&mut self, charset: impl Into<String>) {
        self.connection.set_names(charset);
    }

    /// Inject an externally constructed connection; attribute application and
    /// the charset directive are skipped.
    pub fn set_connection(&mut self, conn: Box<dyn DriverConnection>) {
        self.connection.set_connection(conn);
    }

    /// Toggle identifier protection for the statement builders.
    pub fn set_protect_names(&mut self, protect: bool) {
        self.protect_names = protect;
    }

    // ---- query log ----

    pub fn enable_log(&mut self) {
        self.log.enable();
    }

    pub fn disable_log(&mut self) {
        self.log.disable();
    }

    #[must_use]
    pub fn log_is_enabled(&self) -> bool {
        self.log.is_enabled()
    }

    /// All logged statements, in the order they were issued.
    #[must_use]
    pub fn query_log(&self) -> Vec<&str> {
        self.log.entries()
    }

    #[must_use]
    pub fn query_count(&self) -> usize {
        self.log.len()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// The most recent statement, recorded even while logging is disabled.
    #[must_use]
    pub fn last_statement(&self) -> &str {
        self.log.last_statement()
    }

    // ---- execution ----

    /// Run SQL, optionally with positional parameters, returning the
    /// affected-row count. Parameters use the driver's prepared path.
    ///
    /// # Errors
    /// Returns a connection error on the first call if the lazy connect
    /// fails, or the driver's error if the statement is rejected.
    pub fn exec(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, SqlAdapterError> {
        self.log.record(sql);
        debug!(%sql, "exec");
        let conn = self.connection.ensure_connected(&mut self.log)?;
        if params.is_empty() {
            conn.execute(sql)
        } else {
            conn.execute_with(sql, params)
        }
    }

    /// Run a query and materialize every row.
    ///
    /// # Errors
    /// Returns a connection error on the first call if the lazy connect
    /// fails, or the driver's error if the query is rejected.
    pub fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, SqlAdapterError> {
        self.log.record(sql);
        debug!(%sql, "query");
        let conn = self.connection.ensure_connected(&mut self.log)?;
        conn.query(sql, params)
    }

    /// Run `SELECT <query>` and return all rows; the leading keyword is
    /// supplied here.
    ///
    /// # Errors
    /// See [`query`](Adapter::query).
    pub fn fetch_all(
        &mut self,
        query: &str,
        params: &[SqlValue],
    ) -> Result<ResultSet, SqlAdapterError> {
        let sql = format!("SELECT {query}");
        self.query(&sql, params)
    }

    /// First row of `SELECT <query> LIMIT 1`, if any.
    ///
    /// # Errors
    /// See [`query`](Adapter::query).
    pub fn fetch(
        &mut self,
        query: &str,
        params: &[SqlValue],
    ) -> Result<Option<Row>, SqlAdapterError> {
        let sql = format!("SELECT {query} LIMIT 1");
        Ok(self.query(&sql, params)?.rows.into_iter().next())
    }

    /// First value of the first row of `SELECT <query> LIMIT 1`, if any.
    ///
    /// # Errors
    /// See [`query`](Adapter::query).
    pub fn fetch_one(
        &mut self,
        query: &str,
        params: &[SqlValue],
    ) -> Result<Option<SqlValue>, SqlAdapterError> {
        Ok(self
            .fetch(query, params)?
            .and_then(|row| row.values.into_iter().next()))
    }

    /// Row id generated by the last insert on this connection.
    ///
    /// # Errors
    /// Returns the driver's error if the engine cannot report one.
    pub fn last_insert_id(&mut self) -> Result<i64, SqlAdapterError> {
        let conn = self.connection.ensure_connected(&mut self.log)?;
        conn.last_insert_id()
    }

    // ---- quoting and templating ----

    /// Quote a scalar as a SQL literal via the driver's native escaping.
    ///
    /// # Errors
    /// Returns a connection error on the first call if the lazy connect
    /// fails, or the driver's error if its quoting primitive fails.
    pub fn quote(&mut self, value: &SqlValue) -> Result<String, SqlAdapterError> {
        let conn = self.connection.ensure_connected(&mut self.log)?;
        conn.quote_literal(value)
    }

    /// Quote a table or column name. Never use [`quote`](Adapter::quote) for
    /// identifiers.
    ///
    /// # Errors
    /// Returns a connection error on the first call if the lazy connect
    /// fails.
    pub fn quote_identifier(&mut self, ident: &str) -> Result<String, SqlAdapterError> {
        let conn = self.connection.ensure_connected(&mut self.log)?;
        Ok(wrap_identifier(ident, conn.kind().identifier_quote_char()))
    }

    /// Expand a placeholder template (`?`, `?p`, `?a`, `?k`, `?v`) into a
    /// SQL fragment, quoting through the live connection.
    ///
    /// # Errors
    /// Returns `SqlAdapterError::ParameterError` for exhausted or
    /// wrongly-shaped arguments, and connection/driver errors as above.
    pub fn placeholder(
        &mut self,
        template: &str,
        args: &[SqlParam],
    ) -> Result<String, SqlAdapterError> {
        let conn = self.connection.ensure_connected(&mut self.log)?;
        let quoter = ConnectionQuoter::new(&*conn);
        expand_placeholders(template, args, &quoter)
    }

    // ---- statement builders ----

    /// Insert one row built from ordered `(column, value)` pairs.
    ///
    /// # Errors
    /// Returns `SqlAdapterError::ConfigError` for an empty table name or an
    /// empty value set, plus connection/driver errors.
    pub fn insert(
        &mut self,
        table: &str,
        values: &[(String, SqlValue)],
    ) -> Result<u64, SqlAdapterError> {
        self.write_row("INSERT INTO", table, values, "nothing to insert")
    }

    /// Like [`insert`](Adapter::insert) but with `REPLACE INTO` semantics.
    ///
    /// # Errors
    /// See [`insert`](Adapter::insert).
    pub fn replace(
        &mut self,
        table: &str,
        values: &[(String, SqlValue)],
    ) -> Result<u64, SqlAdapterError> {
        self.write_row("REPLACE INTO", table, values, "nothing to insert")
    }

    /// Update rows matching `where_body` (no `WHERE` keyword; empty updates
    /// everything). The caller escapes values embedded in the predicate with
    /// [`quote`](Adapter::quote).
    ///
    /// # Errors
    /// See [`insert`](Adapter::insert).
    pub fn update(
        &mut self,
        table: &str,
        values: &[(String, SqlValue)],
        where_body: &str,
    ) -> Result<u64, SqlAdapterError> {
        let table_sql = self.table_sql(table)?;
        if values.is_empty() {
            return Err(SqlAdapterError::ConfigError("nothing to update".to_string()));
        }
        let parts = self.quoted_column_values(values)?;
        let where_sql = if where_body.is_empty() {
            String::new()
        } else {
            format!(" WHERE {where_body}")
        };
        let sql = format!(
            "UPDATE {table_sql} SET {}{where_sql}",
            parts.updates.join(", ")
        );
        self.exec(&sql, &[])
    }

    fn write_row(
        &mut self,
        verb: &str,
        table: &str,
        values: &[(String, SqlValue)],
        empty_msg: &str,
    ) -> Result<u64, SqlAdapterError> {
        let table_sql = self.table_sql(table)?;
        if values.is_empty() {
            return Err(SqlAdapterError::ConfigError(empty_msg.to_string()));
        }
        let parts = self.quoted_column_values(values)?;
        let sql = format!(
            "{verb} {table_sql}({}) VALUES({});",
            parts.columns.join(", "),
            parts.data.join(", ")
        );
        self.exec(&sql, &[])
    }

    fn table_sql(&mut self, table: &str) -> Result<String, SqlAdapterError> {
        let trimmed = table.trim();
        if trimmed.is_empty() {
            return Err(SqlAdapterError::ConfigError(
                "table name must not be empty".to_string(),
            ));
        }
        if !self.protect_names {
            return Ok(trimmed.to_string());
        }
        self.quote_identifier(trimmed)
    }

    fn quoted_column_values(
        &mut self,
        values: &[(String, SqlValue)],
    ) -> Result<ColumnValues, SqlAdapterError> {
        let protect = self.protect_names;
        let conn = self.connection.ensure_connected(&mut self.log)?;
        let quote_char = conn.kind().identifier_quote_char();

        let mut columns = Vec::with_capacity(values.len());
        let mut data = Vec::with_capacity(values.len());
        let mut updates = Vec::with_capacity(values.len());
        for (name, value) in values {
            let column = if protect {
                wrap_identifier(name, quote_char)
            } else {
                name.clone()
            };
            let literal = conn.quote_literal(value)?;
            updates.push(format!("{column}={literal}"));
            columns.push(column);
            data.push(literal);
        }
        Ok(ColumnValues {
            columns,
            data,
            updates,
        })
    }

    // ---- transactions ----

    #[must_use]
    pub fn transaction_depth(&self) -> u32 {
        self.tx.depth()
    }

    #[must_use]
    pub fn nested_transactions_enabled(&self) -> bool {
        self.tx.nesting_enabled()
    }

    /// Toggle savepoint-based nesting.
    ///
    /// # Errors
    /// Returns `SqlAdapterError::ConfigError` while a transaction is open.
    pub fn set_nested_transactions(&mut self, enabled: bool) -> Result<(), SqlAdapterError> {
        self.tx.set_nesting_enabled(enabled)
    }

    /// Begin a (possibly nested) transaction. Returns `true` only when a new
    /// physical transaction was started, `false` for savepoints and no-ops.
    ///
    /// # Errors
    /// Returns connection/driver errors from running the planned statement.
    pub fn begin_transaction(&mut self) -> Result<bool, SqlAdapterError> {
        let nestable = self.driver_nestable()?;
        let statement = self.tx.begin(nestable);
        self.run_tx_statement(statement)
    }

    /// Commit one level. Returns `true` only when a physical commit ran.
    ///
    /// The depth is decremented before the driver call and is not restored
    /// if the driver rejects the statement; callers seeing a failed commit
    /// must treat the transaction state as out of sync with the server.
    ///
    /// # Errors
    /// Returns `SqlAdapterError::ConfigError` with no open transaction, plus
    /// connection/driver errors.
    pub fn commit(&mut self) -> Result<bool, SqlAdapterError> {
        let nestable = self.driver_nestable()?;
        let statement = self.tx.commit(nestable)?;
        self.run_tx_statement(statement)
    }

    /// Roll back one level. Returns `true` only when a physical rollback
    /// ran. Depth behaves as in [`commit`](Adapter::commit).
    ///
    /// # Errors
    /// See [`commit`](Adapter::commit).
    pub fn rollback(&mut self) -> Result<bool, SqlAdapterError> {
        let nestable = self.driver_nestable()?;
        let statement = self.tx.rollback(nestable)?;
        self.run_tx_statement(statement)
    }

    fn driver_nestable(&mut self) -> Result<bool, SqlAdapterError> {
        if !self.tx.nesting_enabled() {
            // The flat path never consults the driver, so disabled-nesting
            // no-ops do not force a connect.
            return Ok(false);
        }
        let conn = self.connection.ensure_connected(&mut self.log)?;
        Ok(conn.kind().supports_savepoints())
    }

    fn run_tx_statement(&mut self, statement: TxStatement) -> Result<bool, SqlAdapterError> {
        match statement {
            TxStatement::BeginTransaction => {
                self.log.record("START TRANSACTION;");
                debug!("starting physical transaction");
                let conn = self.connection.ensure_connected(&mut self.log)?;
                conn.begin_transaction()?;
                Ok(true)
            }
            TxStatement::Commit => {
                self.log.record("COMMIT;");
                debug!("committing physical transaction");
                let conn = self.connection.ensure_connected(&mut self.log)?;
                conn.commit()?;
                Ok(true)
            }
            TxStatement::Rollback => {
                self.log.record("ROLLBACK;");
                debug!("rolling back physical transaction");
                let conn = self.connection.ensure_connected(&mut self.log)?;
                conn.rollback()?;
                Ok(true)
            }
            TxStatement::Exec(sql) => {
                self.exec(&sql, &[])?;
                Ok(false)
            }
            TxStatement::Noop => Ok(false),
        }
    }
}
