//! HTTP surface of the pesantren module.
//!
//! Response envelopes follow the shape the web frontend consumes:
//! `{"success": true, "data": ...}` for single records,
//! plus `pagination` and `filters` objects on list endpoints. Errors render
//! as `{"statusCode": n, "statusMessage": "..."}` via [`ServiceError`].

pub mod blog;
pub mod carousel;
pub mod class;
pub mod media;
pub mod registrant;
pub mod santri;
pub mod schedule;
pub mod upload;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use pondok_core::{ListResult, ServiceError, truthy};

use crate::service::PesantrenService;

pub(crate) type AppState = Arc<PesantrenService>;

pub fn router(service: Arc<PesantrenService>) -> Router {
    Router::new()
        .nest("/santris", santri::routes())
        .nest("/registrants", registrant::routes())
        .nest("/blogs", blog::routes())
        .nest("/classes", class::routes())
        .nest("/schedules", schedule::routes())
        .nest("/carousel", carousel::routes())
        .merge(media::routes())
        .with_state(service)
}

/// Single-record success envelope.
pub(crate) fn ok_json<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true, "data": data }))
}

/// Mutation envelope: the affected record plus a human-readable message.
pub(crate) fn ok_msg<T: Serialize>(data: T, message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true, "data": data, "message": message }))
}

/// List success envelope with pagination and the echoed filters.
pub(crate) fn list_json<T: Serialize>(
    result: ListResult<T>,
    filters: serde_json::Value,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "data": result.items,
        "pagination": {
            "page": result.page,
            "limit": result.limit,
            "total": result.total,
            "totalPages": result.total_pages,
        },
        "filters": filters,
    }))
}

/// `?force=true` on DELETE switches soft delete to permanent purge.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DeleteQuery {
    #[serde(default)]
    pub force: Option<String>,
}

impl DeleteQuery {
    pub fn is_force(&self) -> bool {
        self.force.as_deref().map(truthy).unwrap_or(false)
    }
}

/// Admin gate for handlers: unwraps the optional claims extension laid
/// down by the auth middleware and applies the shared role policy.
pub(crate) fn admin(
    claims: &Option<axum::Extension<pondok_core::Claims>>,
) -> Result<(), ServiceError> {
    pondok_core::require_admin(claims.as_ref().map(|e| &e.0))
}

/// Parse a normalized payload object into a typed input.
pub(crate) fn parse_input<T: serde::de::DeserializeOwned>(
    body: serde_json::Value,
) -> Result<T, ServiceError> {
    serde_json::from_value(body)
        .map_err(|e| ServiceError::Validation(format!("invalid payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_query_force_forms() {
        for (raw, expected) in [
            (Some("true"), true),
            (Some("1"), true),
            (Some("false"), false),
            (Some("yes"), false),
            (None, false),
        ] {
            let q = DeleteQuery {
                force: raw.map(String::from),
            };
            assert_eq!(q.is_force(), expected, "input {:?}", raw);
        }
    }

    #[test]
    fn envelopes_have_expected_shape() {
        let body = ok_json(serde_json::json!({"id": "x"})).0;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], "x");

        let result = ListResult {
            items: vec![1, 2, 3],
            total: 12,
            page: 2,
            limit: 5,
            total_pages: 3,
        };
        let body = list_json(result, serde_json::json!({"search": null})).0;
        assert_eq!(body["pagination"]["totalPages"], 3);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }
}
