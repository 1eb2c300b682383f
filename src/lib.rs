//! Lazy-connecting synchronous SQL adapter.
//!
//! The adapter layers two things on top of a raw driver: emulation of nested
//! transactions through savepoints where the engine supports them, and a
//! small typed placeholder grammar (`?`, `?p`, `?a`, `?k`, `?v`) that builds
//! SQL fragments without ever interpolating an untrusted value unescaped.
//! Around that core sit statement builders, fetch helpers, a query log, an
//! ordered-map row wrapper and a named adapter registry.
//!
//! ```rust,no_run
//! use sql_adapter::prelude::*;
//!
//! # fn demo() -> Result<(), SqlAdapterError> {
//! let mut db = Adapter::new(ConnectionSpec::new("sqlite:app.db"));
//! db.begin_transaction()?;
//! db.insert("users", &[("name".to_string(), SqlValue::Text("alice".into()))])?;
//! let fragment = db.placeholder(
//!     "name=? AND ?p",
//!     &[SqlParam::from("o'brien"), SqlParam::raw("active=1")],
//! )?;
//! db.commit()?;
//! # let _ = fragment;
//! # Ok(())
//! # }
//! ```
//!
//! Connections open lazily on first use; the registry hands the same adapter
//! back for the same handle. See [`prelude`] for the common imports.

pub mod adapter;
pub mod connection;
pub mod driver;
pub mod error;
pub mod log;
pub mod placeholder;
pub mod prelude;
pub mod quoting;
pub mod record;
pub mod registry;
pub mod results;
pub mod transaction;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use adapter::Adapter;
pub use error::SqlAdapterError;
