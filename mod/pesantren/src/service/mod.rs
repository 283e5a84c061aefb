pub mod blog;
pub mod carousel;
pub mod class;
pub mod lifecycle;
pub mod media;
pub mod query;
pub mod santri;
pub mod schedule;
mod schema;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use pondok_blob::BlobStore;
use pondok_core::{ServiceError, merge_patch, now_rfc3339};
use pondok_sql::{SqlStore, Value};

/// Pesantren service — holds the storage backends and all business logic.
///
/// Every entity lives in a JSON-document table: the full record in a `data`
/// TEXT column, with indexed columns extracted for filtering, sorting, and
/// uniqueness. The service is stateless between requests; the embedded
/// store owns all persisted state.
pub struct PesantrenService {
    pub(crate) sql: Arc<dyn SqlStore>,
    pub(crate) blob: Arc<dyn BlobStore>,
    pub(crate) media_base_url: String,
}

impl PesantrenService {
    pub fn new(
        sql: Arc<dyn SqlStore>,
        blob: Arc<dyn BlobStore>,
        media_base_url: &str,
    ) -> Result<Self, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self {
            sql,
            blob,
            media_base_url: media_base_url.trim_end_matches('/').to_string(),
        })
    }

    // ── Generic record helpers ──

    /// Insert a record as JSON into a table with indexed columns.
    /// UNIQUE violations surface as `Conflict`.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?", "?"];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (col, val) in indexes {
            cols.push(*col);
            placeholders.push("?");
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(map_store_error)?;
        Ok(())
    }

    /// Fetch a record's JSON document, addressed by any key column.
    pub(crate) fn get_doc(
        &self,
        table: &str,
        key_col: &str,
        key: &str,
    ) -> Result<serde_json::Value, ServiceError> {
        let sql = format!("SELECT data FROM {} WHERE {} = ?", table, key_col);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(key.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("{}/{}", table, key)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Fetch and deserialize a record.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        key_col: &str,
        key: &str,
    ) -> Result<T, ServiceError> {
        let doc = self.get_doc(table, key_col, key)?;
        serde_json::from_value(doc).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Rewrite a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        key_col: &str,
        key: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (col, val) in indexes {
            sets.push(format!("{} = ?", col));
            params.push(val.clone());
        }
        params.push(Value::Text(key.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            table,
            sets.join(", "),
            key_col,
        );

        let affected = self.sql.exec(&sql, &params).map_err(map_store_error)?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{}/{}", table, key)));
        }
        Ok(())
    }

    /// Remove a row entirely (purge).
    pub(crate) fn delete_row(
        &self,
        table: &str,
        key_col: &str,
        key: &str,
    ) -> Result<(), ServiceError> {
        let sql = format!("DELETE FROM {} WHERE {} = ?", table, key_col);
        let affected = self
            .sql
            .exec(&sql, &[Value::Text(key.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{}/{}", table, key)));
        }
        Ok(())
    }

    /// Count rows matching a conjunction of WHERE clauses.
    pub(crate) fn count_where(
        &self,
        table: &str,
        clauses: &[&str],
        params: &[Value],
    ) -> Result<i64, ServiceError> {
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let sql = format!("SELECT COUNT(*) AS cnt FROM {}{}", table, where_sql);
        let rows = self
            .sql
            .query(&sql, params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0))
    }

    /// Apply a JSON merge-patch to a record, shielding immutable fields.
    ///
    /// The result is re-deserialized into the model type, so a patch that
    /// breaks the schema fails with `Validation` before anything persists.
    pub(crate) fn apply_patch<T: Serialize + DeserializeOwned>(
        current: &T,
        patch: serde_json::Value,
        protected: &[&str],
    ) -> Result<T, ServiceError> {
        let mut json = serde_json::to_value(current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut patch = patch;
        if let Some(obj) = patch.as_object_mut() {
            for field in protected {
                obj.remove(*field);
            }
            obj.insert("updated_at".into(), serde_json::json!(now_rfc3339()));
        } else {
            return Err(ServiceError::Validation(
                "patch body must be a JSON object".into(),
            ));
        }

        merge_patch(&mut json, &patch);
        serde_json::from_value(json)
            .map_err(|e| ServiceError::Validation(format!("invalid patch: {}", e)))
    }

    /// Require a non-empty field, failing fast before any store call.
    pub(crate) fn required(field: &str, value: Option<&str>) -> Result<String, ServiceError> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(ServiceError::Validation(format!(
                "field '{}' is required",
                field
            ))),
        }
    }
}

/// Map a store error, recognizing uniqueness violations as conflicts.
pub(crate) fn map_store_error(e: pondok_sql::SqlError) -> ServiceError {
    match e {
        pondok_sql::SqlError::Exec(msg) if msg.contains("UNIQUE constraint") => {
            ServiceError::Conflict(msg)
        }
        other => ServiceError::Storage(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use pondok_blob::FileStore;
    use pondok_sql::SqliteStore;

    use super::PesantrenService;

    /// In-memory service for tests; the TempDir must outlive the service.
    pub(crate) fn service() -> (tempfile::TempDir, PesantrenService) {
        let dir = tempfile::tempdir().unwrap();
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let blob = Arc::new(FileStore::open(dir.path()).unwrap());
        let svc = PesantrenService::new(sql, blob, "http://localhost:8080").unwrap();
        (dir, svc)
    }
}
