//! Nesting-aware transaction planning.
//!
//! `TransactionState` tracks the nesting depth and decides, per call, whether
//! to run a physical transaction statement or a savepoint statement. The
//! decision is returned as a [`TxStatement`] plan; running it is the
//! adapter's job, which keeps this module free of I/O and exhaustively
//! testable.

use crate::error::SqlAdapterError;

/// Statement to run for one begin/commit/rollback call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatement {
    /// Start a physical transaction through the driver's dedicated entry
    /// point. Logged as `START TRANSACTION;`.
    BeginTransaction,
    /// Commit the physical transaction. Logged as `COMMIT;`.
    Commit,
    /// Roll back the physical transaction. Logged as `ROLLBACK;`.
    Rollback,
    /// Run a savepoint statement through the ordinary exec path.
    Exec(String),
    /// Nothing to run; only the depth moved.
    Noop,
}

/// Tracks nesting depth and the savepoint-emulation toggle.
///
/// Depth only increases through [`begin`](TransactionState::begin) and only
/// decreases through [`commit`](TransactionState::commit) /
/// [`rollback`](TransactionState::rollback); it never goes negative.
#[derive(Debug, Clone)]
pub struct TransactionState {
    depth: u32,
    nesting_enabled: bool,
}

impl Default for TransactionState {
    fn default() -> Self {
        Self {
            depth: 0,
            nesting_enabled: true,
        }
    }
}

impl TransactionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently open (possibly emulated) transaction levels.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub fn nesting_enabled(&self) -> bool {
        self.nesting_enabled
    }

    /// Toggle savepoint-based nesting.
    ///
    /// # Errors
    /// Returns `SqlAdapterError::ConfigError` while any transaction is open:
    /// switching semantics mid-flight would make open savepoint names
    /// meaningless.
    pub fn set_nesting_enabled(&mut self, enabled: bool) -> Result<(), SqlAdapterError> {
        if self.depth != 0 {
            return Err(SqlAdapterError::ConfigError(
                "cannot change nested-transaction mode while a transaction is open".to_string(),
            ));
        }
        self.nesting_enabled = enabled;
        Ok(())
    }

    /// Plan one `begin`; the depth is incremented after the decision.
    ///
    /// With nesting disabled, only the outermost begin produces a statement;
    /// inner levels still move the depth but get no isolation from an inner
    /// rollback. With nesting enabled, a driver without savepoint support
    /// gets a physical begin at every level (which the engine will reject
    /// beyond the first; that failure is the driver's to report).
    pub fn begin(&mut self, driver_nestable: bool) -> TxStatement {
        let statement = if !self.nesting_enabled {
            if self.depth == 0 {
                TxStatement::BeginTransaction
            } else {
                TxStatement::Noop
            }
        } else if !driver_nestable || self.depth == 0 {
            TxStatement::BeginTransaction
        } else {
            // Opened with the pre-increment depth so the matching release /
            // rollback-to (planned after the decrement) lands on the same name.
            TxStatement::Exec(format!("SAVEPOINT {}", savepoint_name(self.depth)))
        };
        self.depth += 1;
        statement
    }

    /// Plan one `commit`; the depth is decremented before the decision.
    ///
    /// # Errors
    /// Returns `SqlAdapterError::ConfigError` when no transaction is open.
    pub fn commit(&mut self, driver_nestable: bool) -> Result<TxStatement, SqlAdapterError> {
        self.decrement("commit")?;
        Ok(if !self.nesting_enabled {
            if self.depth == 0 {
                TxStatement::Commit
            } else {
                TxStatement::Noop
            }
        } else if !driver_nestable || self.depth == 0 {
            TxStatement::Commit
        } else {
            TxStatement::Exec(format!("RELEASE SAVEPOINT {}", savepoint_name(self.depth)))
        })
    }

    /// Plan one `rollback`; the depth is decremented before the decision.
    ///
    /// # Errors
    /// Returns `SqlAdapterError::ConfigError` when no transaction is open.
    pub fn rollback(&mut self, driver_nestable: bool) -> Result<TxStatement, SqlAdapterError> {
        self.decrement("rollback")?;
        Ok(if !self.nesting_enabled {
            if self.depth == 0 {
                TxStatement::Rollback
            } else {
                TxStatement::Noop
            }
        } else if !driver_nestable || self.depth == 0 {
            TxStatement::Rollback
        } else {
            TxStatement::Exec(format!(
                "ROLLBACK TO SAVEPOINT {}",
                savepoint_name(self.depth)
            ))
        })
    }

    fn decrement(&mut self, op: &str) -> Result<(), SqlAdapterError> {
        self.depth = self.depth.checked_sub(1).ok_or_else(|| {
            SqlAdapterError::ConfigError(format!("{op} called with no open transaction"))
        })?;
        Ok(())
    }
}

fn savepoint_name(depth: u32) -> String {
    format!("LEVEL{depth}")
}
