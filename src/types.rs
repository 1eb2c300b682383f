use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Format used for timestamp literals across the crate.
pub(crate) const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Values that can be stored in a database row or used as statement
/// parameters.
///
/// The same enum is used across drivers so helper code does not need to
/// branch on driver-specific types:
/// ```rust
/// use sql_adapter::prelude::*;
///
/// let params = vec![
///     SqlValue::Int(1),
///     SqlValue::Text("alice".into()),
///     SqlValue::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let SqlValue::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let SqlValue::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, SQL_TIMESTAMP_FORMAT) {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let SqlValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Plain unquoted rendering, used where a caller asked for verbatim
    /// emission. Blobs render as bare hex digits.
    #[must_use]
    pub(crate) fn plain_text(&self) -> String {
        match self {
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Text(s) => s.clone(),
            SqlValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            SqlValue::Timestamp(ts) => ts.format(SQL_TIMESTAMP_FORMAT).to_string(),
            SqlValue::Null => "NULL".to_string(),
            SqlValue::JSON(v) => v.to_string(),
            SqlValue::Blob(bytes) => {
                let mut out = String::with_capacity(bytes.len() * 2);
                for byte in bytes {
                    out.push_str(&format!("{byte:02x}"));
                }
                out
            }
        }
    }
}

/// A typed argument consumed by exactly one placeholder token during
/// expansion.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Scalar rendered through the driver's literal quoting (`?`).
    Value(SqlValue),
    /// Pre-built SQL fragment emitted verbatim (`?p`). The caller asserts it
    /// is already safe SQL.
    Raw(String),
    /// Ordered key/value mapping (`?a`, `?k`, `?v`).
    Map(Vec<(String, SqlValue)>),
    /// Sequence of values (`?v`).
    List(Vec<SqlValue>),
}

impl SqlParam {
    /// Shorthand for a trusted raw fragment.
    pub fn raw(fragment: impl Into<String>) -> Self {
        SqlParam::Raw(fragment.into())
    }

    /// Shorthand for an ordered mapping.
    pub fn map<K: Into<String>>(pairs: impl IntoIterator<Item = (K, SqlValue)>) -> Self {
        SqlParam::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Shorthand for a value sequence.
    pub fn list(values: impl IntoIterator<Item = SqlValue>) -> Self {
        SqlParam::List(values.into_iter().collect())
    }
}

impl From<SqlValue> for SqlParam {
    fn from(value: SqlValue) -> Self {
        SqlParam::Value(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Value(SqlValue::Text(value.to_string()))
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Value(SqlValue::Int(value))
    }
}

/// Format a SQL timestamp literal body (without quotes) for the given time,
/// defaulting to now.
#[must_use]
pub fn stamp(time: Option<NaiveDateTime>, date_only: bool) -> String {
    let t = time.unwrap_or_else(|| chrono::Local::now().naive_local());
    t.format(if date_only { "%Y-%m-%d" } else { SQL_TIMESTAMP_FORMAT })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variants() {
        assert_eq!(SqlValue::Int(7).as_int(), Some(&7));
        assert_eq!(SqlValue::Text("x".into()).as_text(), Some("x"));
        assert_eq!(SqlValue::Int(1).as_bool(), Some(&true));
        assert_eq!(SqlValue::Int(0).as_bool(), Some(&false));
        assert!(SqlValue::Null.is_null());
        assert!(SqlValue::Text("x".into()).as_int().is_none());
    }

    #[test]
    fn timestamp_parses_from_text() {
        let v = SqlValue::Text("2021-08-06 16:00:00".into());
        let ts = v.as_timestamp().unwrap();
        assert_eq!(ts.format(SQL_TIMESTAMP_FORMAT).to_string(), "2021-08-06 16:00:00");
    }

    #[test]
    fn plain_text_renders_unquoted() {
        assert_eq!(SqlValue::Int(3).plain_text(), "3");
        assert_eq!(SqlValue::Text("a'b".into()).plain_text(), "a'b");
        assert_eq!(SqlValue::Null.plain_text(), "NULL");
        assert_eq!(SqlValue::Blob(vec![0xab, 0x01]).plain_text(), "ab01");
    }

    #[test]
    fn stamp_formats_explicit_time() {
        let t = NaiveDateTime::parse_from_str("2017-03-01 08:15:00", SQL_TIMESTAMP_FORMAT).unwrap();
        assert_eq!(stamp(Some(t), false), "2017-03-01 08:15:00");
        assert_eq!(stamp(Some(t), true), "2017-03-01");
    }
}
