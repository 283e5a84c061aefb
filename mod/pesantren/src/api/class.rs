use axum::extract::{Path, Query, Request, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};

use pondok_core::{Claims, ListParams, ListPlan, ServiceError};

use crate::service::class::{CLASS_SORTS, ClassInput};

use super::{AppState, DeleteQuery, admin, list_json, ok_json, ok_msg, parse_input, upload};

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/restore", post(restore))
}

async fn stats(State(svc): State<AppState>) -> Result<Json<serde_json::Value>, ServiceError> {
    Ok(ok_json(svc.class_stats()?))
}

async fn list(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let plan = ListPlan::build(&params, CLASS_SORTS);
    let result = svc.list_classes(&plan)?;
    let filters = serde_json::json!({
        "search": plan.search,
        "sortBy": plan.sort_label(CLASS_SORTS),
        "includeDeleted": plan.include_deleted,
    });
    Ok(list_json(result, filters))
}

/// Fetch one class plus its live member head-count.
async fn fetch(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let class = svc.get_class(&id)?;
    let members = svc.class_member_count(&id)?;
    let mut data = serde_json::to_value(class)
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    data["member_count"] = serde_json::json!(members);
    Ok(ok_json(data))
}

async fn create(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    req: Request,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    let (mut body, file) = upload::read_payload(req).await?;
    if let Some(file) = file {
        let url = svc.store_image("classes", None, &file)?;
        body["image_url"] = serde_json::json!(url);
    }
    let input: ClassInput = parse_input(body)?;
    Ok(ok_json(svc.create_class(input)?))
}

async fn update(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
    req: Request,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    let (mut patch, file) = upload::read_payload(req).await?;
    if let Some(file) = file {
        let url = svc.store_image("classes", Some(&id), &file)?;
        patch["image_url"] = serde_json::json!(url);
    }
    Ok(ok_json(svc.update_class(&id, patch)?))
}

async fn remove(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
    Query(q): Query<DeleteQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    if q.is_force() {
        let doc = svc.purge_record("classes", "id", &id)?;
        return Ok(ok_msg(doc, "class permanently deleted"));
    }
    let doc = svc.soft_delete_record("classes", "id", &id)?;
    Ok(ok_msg(doc, "class moved to trash"))
}

async fn restore(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    let doc = svc.restore_record("classes", "id", &id)?;
    Ok(ok_msg(doc, "class restored"))
}
