//! Convenient imports for common functionality.

pub use crate::adapter::Adapter;
pub use crate::connection::LazyConnection;
pub use crate::driver::{
    ConnectionAttributes, ConnectionSpec, DefaultDriver, Driver, DriverConnection, DriverKind,
    SAVEPOINT_DRIVERS,
};
pub use crate::error::SqlAdapterError;
pub use crate::log::QueryLog;
pub use crate::placeholder::expand_placeholders;
pub use crate::quoting::{ConnectionQuoter, ValueQuoter};
pub use crate::record::Record;
pub use crate::registry::AdapterRegistry;
pub use crate::results::{ResultSet, Row};
pub use crate::transaction::{TransactionState, TxStatement};
pub use crate::types::{SqlParam, SqlValue, stamp};

#[cfg(feature = "sqlite")]
pub use crate::driver::sqlite::SqliteConnection;
