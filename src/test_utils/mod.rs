//! Test helpers: a recording mock driver for exercising the adapter without
//! a live database.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::driver::{
    ConnectionAttributes, ConnectionSpec, Driver, DriverConnection, DriverKind,
};
use crate::error::SqlAdapterError;
use crate::results::ResultSet;
use crate::types::{SQL_TIMESTAMP_FORMAT, SqlValue};

/// Shared journal of driver-level calls, in order.
pub type CallJournal = Arc<Mutex<Vec<String>>>;

/// Driver handing out recording [`MockConnection`]s.
///
/// Every connection shares the driver's journal and canned-result queue, so a
/// test keeps the handles and asserts afterwards:
/// ```rust
/// use sql_adapter::prelude::*;
/// use sql_adapter::test_utils::MockDriver;
///
/// let driver = MockDriver::new(DriverKind::Mysql);
/// let journal = driver.journal();
/// let mut db = Adapter::with_driver(
///     ConnectionSpec::new("mysql:host=localhost;dbname=app"),
///     Box::new(driver),
/// );
/// db.begin_transaction().unwrap();
/// assert!(journal.lock().unwrap().contains(&"BEGIN".to_string()));
/// ```
pub struct MockDriver {
    kind: DriverKind,
    journal: CallJournal,
    results: Arc<Mutex<VecDeque<ResultSet>>>,
    fail_connect: bool,
}

impl MockDriver {
    #[must_use]
    pub fn new(kind: DriverKind) -> Self {
        Self {
            kind,
            journal: Arc::new(Mutex::new(Vec::new())),
            results: Arc::new(Mutex::new(VecDeque::new())),
            fail_connect: false,
        }
    }

    /// Handle to the shared call journal.
    #[must_use]
    pub fn journal(&self) -> CallJournal {
        Arc::clone(&self.journal)
    }

    /// Queue a canned result for the next `query` call.
    pub fn push_result(&self, result: ResultSet) {
        if let Ok(mut results) = self.results.lock() {
            results.push_back(result);
        }
    }

    /// Make every connect attempt fail.
    #[must_use]
    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Build a standalone connection sharing this driver's journal, for
    /// direct injection via `set_connection`.
    #[must_use]
    pub fn connection(&self) -> MockConnection {
        MockConnection {
            kind: self.kind,
            journal: Arc::clone(&self.journal),
            results: Arc::clone(&self.results),
        }
    }
}

impl Driver for MockDriver {
    fn connect(&self, _spec: &ConnectionSpec) -> Result<Box<dyn DriverConnection>, SqlAdapterError> {
        if self.fail_connect {
            return Err(SqlAdapterError::ConnectionError(
                "mock connect failure".to_string(),
            ));
        }
        Ok(Box::new(self.connection()))
    }
}

/// Connection that records every driver-level call instead of talking to an
/// engine. Physical transaction calls are journaled as `BEGIN`, `COMMIT` and
/// `ROLLBACK`; savepoint statements arrive through the execute path as plain
/// SQL.
pub struct MockConnection {
    kind: DriverKind,
    journal: CallJournal,
    results: Arc<Mutex<VecDeque<ResultSet>>>,
}

impl MockConnection {
    fn record(&self, entry: impl Into<String>) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.push(entry.into());
        }
    }
}

impl DriverConnection for MockConnection {
    fn kind(&self) -> DriverKind {
        self.kind
    }

    fn apply_attributes(&mut self, _attrs: &ConnectionAttributes) -> Result<(), SqlAdapterError> {
        self.record("APPLY ATTRIBUTES");
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<u64, SqlAdapterError> {
        self.record(sql);
        Ok(1)
    }

    fn execute_with(&mut self, sql: &str, _params: &[SqlValue]) -> Result<u64, SqlAdapterError> {
        self.record(sql);
        Ok(1)
    }

    fn query(&mut self, sql: &str, _params: &[SqlValue]) -> Result<ResultSet, SqlAdapterError> {
        self.record(sql);
        let canned = self
            .results
            .lock()
            .ok()
            .and_then(|mut results| results.pop_front());
        Ok(canned.unwrap_or_default())
    }

    fn begin_transaction(&mut self) -> Result<(), SqlAdapterError> {
        self.record("BEGIN");
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SqlAdapterError> {
        self.record("COMMIT");
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SqlAdapterError> {
        self.record("ROLLBACK");
        Ok(())
    }

    fn quote_literal(&self, value: &SqlValue) -> Result<String, SqlAdapterError> {
        Ok(match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            SqlValue::Text(s) => quote_text(s, self.kind),
            SqlValue::Timestamp(ts) => format!("'{}'", ts.format(SQL_TIMESTAMP_FORMAT)),
            SqlValue::JSON(v) => quote_text(&v.to_string(), self.kind),
            SqlValue::Blob(bytes) => {
                let mut out = String::with_capacity(bytes.len() * 2 + 3);
                out.push_str("X'");
                for byte in bytes {
                    out.push_str(&format!("{byte:02x}"));
                }
                out.push('\'');
                out
            }
        })
    }

    fn last_insert_id(&mut self) -> Result<i64, SqlAdapterError> {
        Ok(1)
    }
}

/// The MySQL family escapes with backslashes; everyone else doubles quotes.
fn quote_text(s: &str, kind: DriverKind) -> String {
    match kind {
        DriverKind::Mysql => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        DriverKind::Postgres | DriverKind::Sqlite => format!("'{}'", s.replace('\'', "''")),
    }
}
