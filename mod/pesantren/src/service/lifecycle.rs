use pondok_core::{ServiceError, now_rfc3339};
use pondok_sql::Value;

use super::PesantrenService;

fn is_trashed(doc: &serde_json::Value) -> bool {
    doc.get("deleted_at").map_or(false, |v| !v.is_null())
}

impl PesantrenService {
    /// Soft-delete: stamp `deleted_at`. Already-trashed records are left
    /// untouched so the original deletion time survives repeated calls.
    pub(crate) fn soft_delete_record(
        &self,
        table: &str,
        key_col: &str,
        key: &str,
    ) -> Result<serde_json::Value, ServiceError> {
        let mut doc = self.get_doc(table, key_col, key)?;
        if is_trashed(&doc) {
            return Ok(doc);
        }
        let now = now_rfc3339();
        doc["deleted_at"] = serde_json::json!(now);
        doc["updated_at"] = serde_json::json!(now);
        self.update_record(
            table,
            key_col,
            key,
            &doc,
            &[
                ("deleted_at", Value::text(&now)),
                ("updated_at", Value::text(&now)),
            ],
        )?;
        Ok(doc)
    }

    /// Restore a trashed record. Restoring an active record is a no-op
    /// success, matching the idempotency of soft delete.
    pub(crate) fn restore_record(
        &self,
        table: &str,
        key_col: &str,
        key: &str,
    ) -> Result<serde_json::Value, ServiceError> {
        let mut doc = self.get_doc(table, key_col, key)?;
        if !is_trashed(&doc) {
            return Ok(doc);
        }
        let now = now_rfc3339();
        doc["deleted_at"] = serde_json::Value::Null;
        doc["updated_at"] = serde_json::json!(now);
        self.update_record(
            table,
            key_col,
            key,
            &doc,
            &[("deleted_at", Value::Null), ("updated_at", Value::text(&now))],
        )?;
        Ok(doc)
    }

    /// Permanently remove a record. Only trashed records may be purged;
    /// an active record must go through soft delete first.
    ///
    /// The record's stored image (if any) is removed best-effort: blob
    /// cleanup failure is logged, never surfaced, since the row is gone.
    pub(crate) fn purge_record(
        &self,
        table: &str,
        key_col: &str,
        key: &str,
    ) -> Result<serde_json::Value, ServiceError> {
        let doc = self.get_doc(table, key_col, key)?;
        if !is_trashed(&doc) {
            return Err(ServiceError::Conflict(format!(
                "{}/{} is not in trash",
                table, key
            )));
        }
        self.delete_row(table, key_col, key)?;
        self.remove_owned_blob(&doc);
        Ok(doc)
    }

    /// Delete the blob behind a record's `image_url`, if it points into
    /// our own media namespace.
    pub(crate) fn remove_owned_blob(&self, doc: &serde_json::Value) {
        let Some(url) = doc.get("image_url").and_then(|v| v.as_str()) else {
            return;
        };
        let Some(key) = self.blob_key_for_url(url) else {
            return;
        };
        if let Err(e) = self.blob.delete(&key) {
            tracing::warn!(key = %key, error = %e, "failed to remove media blob");
        }
    }
}
