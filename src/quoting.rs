//! Value and identifier quoting over the driver boundary.

use crate::driver::DriverConnection;
use crate::error::SqlAdapterError;
use crate::types::SqlValue;

/// Escapes and quotes pieces of generated SQL.
///
/// Literal quoting and identifier quoting are distinct operations: table and
/// column names must always go through [`quote_identifier`], never the scalar
/// quoter.
///
/// [`quote_identifier`]: ValueQuoter::quote_identifier
pub trait ValueQuoter {
    /// Quote a scalar as a SQL literal.
    ///
    /// # Errors
    /// Returns the driver's error if its quoting primitive fails.
    fn quote(&self, value: &SqlValue) -> Result<String, SqlAdapterError>;

    /// Quote a table or column name.
    fn quote_identifier(&self, ident: &str) -> String;
}

/// Quoter borrowing a live driver connection: literals go to the engine's
/// native escaping primitive, identifiers are wrapped in the kind's quote
/// character.
pub struct ConnectionQuoter<'a> {
    conn: &'a dyn DriverConnection,
}

impl<'a> ConnectionQuoter<'a> {
    #[must_use]
    pub fn new(conn: &'a dyn DriverConnection) -> Self {
        Self { conn }
    }
}

impl ValueQuoter for ConnectionQuoter<'_> {
    fn quote(&self, value: &SqlValue) -> Result<String, SqlAdapterError> {
        self.conn.quote_literal(value)
    }

    fn quote_identifier(&self, ident: &str) -> String {
        wrap_identifier(ident, self.conn.kind().identifier_quote_char())
    }
}

/// Wrap `ident` in `quote`, doubling embedded quote characters.
pub(crate) fn wrap_identifier(ident: &str, quote: char) -> String {
    let mut out = String::with_capacity(ident.len() + 2);
    out.push(quote);
    for ch in ident.chars() {
        out.push(ch);
        if ch == quote {
            out.push(quote);
        }
    }
    out.push(quote);
    out
}
