//! Row wrapper with an explicit ordered field mapping.

use crate::adapter::Adapter;
use crate::error::SqlAdapterError;
use crate::types::SqlValue;

/// One table row as an ordered field map, with find/save/delete operations
/// driving an [`Adapter`].
///
/// Fields keep first-insertion order. A declared field set restricts what
/// [`filtered`](Record::filtered) projects for writes; an empty set means
/// everything is writable.
#[derive(Debug, Clone, Default)]
pub struct Record {
    table: String,
    fields: Vec<String>,
    data: Vec<(String, SqlValue)>,
    id: Option<i64>,
}

impl Record {
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
            data: Vec::new(),
            id: None,
        }
    }

    /// Declare the field set [`filtered`](Record::filtered) is restricted to.
    #[must_use]
    pub fn with_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn set_table(&mut self, table: impl Into<String>) {
        self.table = table.into();
    }

    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    /// Set a field, preserving first-insertion order on overwrite.
    pub fn set(&mut self, key: impl Into<String>, value: SqlValue) -> &mut Self {
        let key = key.into();
        if let Some(slot) = self.data.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.data.push((key, value));
        }
        self
    }

    /// Set several fields at once.
    pub fn set_all<K: Into<String>>(
        &mut self,
        pairs: impl IntoIterator<Item = (K, SqlValue)>,
    ) -> &mut Self {
        for (key, value) in pairs {
            self.set(key, value);
        }
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SqlValue> {
        self.data.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.data.iter().any(|(k, _)| k == key)
    }

    pub fn remove(&mut self, key: &str) -> Option<SqlValue> {
        let idx = self.data.iter().position(|(k, _)| k == key)?;
        Some(self.data.remove(idx).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn data(&self) -> &[(String, SqlValue)] {
        &self.data
    }

    /// Projection of the data restricted to the declared field set, in
    /// record order. An empty declared set projects everything.
    #[must_use]
    pub fn filtered(&self) -> Vec<(String, SqlValue)> {
        if self.fields.is_empty() {
            return self.data.clone();
        }
        self.data
            .iter()
            .filter(|(k, _)| self.fields.iter().any(|f| f == k))
            .cloned()
            .collect()
    }

    /// Load the row with the given id. Returns whether a row was found.
    ///
    /// # Errors
    /// Propagates adapter errors.
    pub fn find_by_id(&mut self, db: &mut Adapter, id: i64) -> Result<bool, SqlAdapterError> {
        let body = format!("* FROM {} WHERE id=?", self.table);
        match db.fetch(&body, &[SqlValue::Int(id)])? {
            Some(row) => {
                self.absorb(row.to_pairs());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Load the first row matching `where_body` (including the `WHERE`
    /// keyword, or empty). Returns whether a row was found.
    ///
    /// # Errors
    /// Propagates adapter errors.
    pub fn find(
        &mut self,
        db: &mut Adapter,
        where_body: &str,
        params: &[SqlValue],
    ) -> Result<bool, SqlAdapterError> {
        let body = format!("* FROM {} {where_body}", self.table);
        match db.fetch(&body, params)? {
            Some(row) => {
                self.absorb(row.to_pairs());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Load every row matching `where_body` as records bound to `table`.
    ///
    /// # Errors
    /// Propagates adapter errors.
    pub fn find_all(
        db: &mut Adapter,
        table: &str,
        where_body: &str,
        params: &[SqlValue],
    ) -> Result<Vec<Record>, SqlAdapterError> {
        let body = format!("* FROM {table} {where_body}");
        let result = db.fetch_all(&body, params)?;
        Ok(result
            .rows
            .iter()
            .map(|row| {
                let mut record = Record::new(table);
                record.absorb(row.to_pairs());
                record
            })
            .collect())
    }

    /// Write the record: update when a row with this id exists, insert
    /// otherwise. Returns the row id.
    ///
    /// # Errors
    /// Propagates adapter errors.
    pub fn save(&mut self, db: &mut Adapter) -> Result<i64, SqlAdapterError> {
        if let Some(id) = self.id {
            let body = format!("COUNT(*) FROM {} WHERE id=?", self.table);
            let found = db
                .fetch_one(&body, &[SqlValue::Int(id)])?
                .and_then(|v| v.as_int().copied())
                .unwrap_or(0);
            if found > 0 {
                let predicate = format!("id={}", db.quote(&SqlValue::Int(id))?);
                db.update(&self.table, &self.filtered(), &predicate)?;
                return Ok(id);
            }
        }
        db.insert(&self.table, &self.filtered())?;
        let id = db.last_insert_id()?;
        self.id = Some(id);
        Ok(id)
    }

    /// Delete the row this record points at.
    ///
    /// # Errors
    /// Returns `SqlAdapterError::ConfigError` when the record has no id;
    /// propagates adapter errors.
    pub fn delete(&self, db: &mut Adapter) -> Result<u64, SqlAdapterError> {
        let id = self.id.ok_or_else(|| {
            SqlAdapterError::ConfigError("record has no id to delete by".to_string())
        })?;
        let sql = format!("DELETE FROM {} WHERE id=?", self.table);
        db.exec(&sql, &[SqlValue::Int(id)])
    }

    /// Delete every row matching `where_body`.
    ///
    /// # Errors
    /// Propagates adapter errors.
    pub fn delete_all(
        db: &mut Adapter,
        table: &str,
        where_body: &str,
        params: &[SqlValue],
    ) -> Result<u64, SqlAdapterError> {
        let sql = format!("DELETE FROM {table} {where_body}");
        db.exec(&sql, params)
    }

    /// Count rows matching `where_body`.
    ///
    /// # Errors
    /// Propagates adapter errors.
    pub fn count(
        db: &mut Adapter,
        table: &str,
        where_body: &str,
        params: &[SqlValue],
    ) -> Result<i64, SqlAdapterError> {
        let body = format!("COUNT(*) FROM {table} {where_body}");
        Ok(db
            .fetch_one(&body, params)?
            .and_then(|v| v.as_int().copied())
            .unwrap_or(0))
    }

    fn absorb(&mut self, pairs: Vec<(String, SqlValue)>) {
        self.id = pairs
            .iter()
            .find(|(k, _)| k == "id")
            .and_then(|(_, v)| v.as_int().copied());
        self.data = pairs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_preserves_first_insertion_order() {
        let mut record = Record::new("t");
        record.set("b", SqlValue::Int(1));
        record.set("a", SqlValue::Int(2));
        record.set("b", SqlValue::Int(3));
        let keys: Vec<&str> = record.data().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(record.get("b"), Some(&SqlValue::Int(3)));
    }

    #[test]
    fn filtered_respects_declared_fields() {
        let mut record = Record::new("t").with_fields(["name", "email"]);
        record.set("name", SqlValue::Text("a".into()));
        record.set("secret", SqlValue::Text("hidden".into()));
        record.set("email", SqlValue::Text("a@example.com".into()));

        let filtered = record.filtered();
        let keys: Vec<&str> = filtered.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["name", "email"]);
    }

    #[test]
    fn filtered_without_declared_fields_projects_everything() {
        let mut record = Record::new("t");
        record.set("x", SqlValue::Int(1));
        assert_eq!(record.filtered().len(), 1);
    }

    #[test]
    fn remove_and_has() {
        let mut record = Record::new("t");
        record.set("x", SqlValue::Int(1));
        assert!(record.has("x"));
        assert_eq!(record.remove("x"), Some(SqlValue::Int(1)));
        assert!(!record.has("x"));
        assert_eq!(record.remove("x"), None);
    }
}
