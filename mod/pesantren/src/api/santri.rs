use axum::extract::{Path, Query, Request, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use pondok_core::{Claims, ListParams, ListPlan, ServiceError};

use crate::service::santri::{SANTRI_SORTS, SantriInput};

use super::{AppState, DeleteQuery, admin, list_json, ok_json, ok_msg, parse_input, upload};

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/restore", post(restore))
        .route("/{id}/assign-class", put(set_class))
}

#[derive(Debug, Deserialize)]
struct SantriListQuery {
    #[serde(flatten)]
    list: ListParams,

    #[serde(default)]
    gender: Option<String>,

    #[serde(default)]
    class_id: Option<String>,
}

async fn list(
    State(svc): State<AppState>,
    Query(q): Query<SantriListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    if let Some(g) = q.gender.as_deref() {
        if g != "male" && g != "female" {
            return Err(ServiceError::Validation(format!(
                "unknown gender filter: {:?}",
                g
            )));
        }
    }
    let plan = ListPlan::build(&q.list, SANTRI_SORTS);
    let result = svc.list_santris(&plan, q.gender.as_deref(), q.class_id.as_deref())?;
    let filters = serde_json::json!({
        "search": plan.search,
        "sortBy": plan.sort_label(SANTRI_SORTS),
        "gender": q.gender,
        "classId": q.class_id,
        "includeDeleted": plan.include_deleted,
    });
    Ok(list_json(result, filters))
}

async fn stats(State(svc): State<AppState>) -> Result<Json<serde_json::Value>, ServiceError> {
    Ok(ok_json(svc.santri_stats()?))
}

async fn fetch(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    Ok(ok_json(svc.get_santri(&id)?))
}

/// Admin create: the santri lands on the roster already accepted. A body
/// carrying the id of an existing record is treated as an update instead,
/// so form-driven clients can use one endpoint for both.
async fn create(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    req: Request,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    let (mut body, file) = upload::read_payload(req).await?;

    let existing = body
        .get("id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .filter(|id| svc.get_santri(id).is_ok());

    if let Some(file) = file {
        let url = svc.store_image("santris", existing.as_deref(), &file)?;
        body["image_url"] = serde_json::json!(url);
    }

    if let Some(id) = existing {
        return Ok(ok_json(svc.update_santri(&id, body)?));
    }
    let input: SantriInput = parse_input(body)?;
    Ok(ok_json(svc.register_santri(input, true)?))
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
        let url = svc.store_image("santris", Some(&id), &file)?;
        patch["image_url"] = serde_json::json!(url);
    }
    Ok(ok_json(svc.update_santri(&id, patch)?))
}

async fn remove(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
    Query(q): Query<DeleteQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    if q.is_force() {
        let doc = svc.purge_record("santris", "id", &id)?;
        return Ok(ok_msg(doc, "santri permanently deleted"));
    }
    let doc = svc.soft_delete_record("santris", "id", &id)?;
    Ok(ok_msg(doc, "santri moved to trash"))
}

async fn restore(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    let doc = svc.restore_record("santris", "id", &id)?;
    Ok(ok_msg(doc, "santri restored"))
}

#[derive(Debug, Deserialize)]
struct AssignClassBody {
    #[serde(default)]
    class_id: Option<String>,
}

async fn set_class(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
    Json(body): Json<AssignClassBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    Ok(ok_json(svc.assign_class(&id, body.class_id)?))
}
