use axum::extract::{Path, Query, Request, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};

use pondok_core::{Claims, ListParams, ListPlan, ServiceError};

use crate::service::carousel::{CAROUSEL_SORTS, CarouselInput};

use super::{AppState, DeleteQuery, admin, list_json, ok_json, ok_msg, parse_input, upload};

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/restore", post(restore))
}

async fn list(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let plan = ListPlan::build(&params, CAROUSEL_SORTS);
    let result = svc.list_carousel(&plan)?;
    let filters = serde_json::json!({
        "search": plan.search,
        "sortBy": plan.sort_label(CAROUSEL_SORTS),
        "includeDeleted": plan.include_deleted,
    });
    Ok(list_json(result, filters))
}

async fn fetch(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    Ok(ok_json(svc.get_carousel(&id)?))
}

/// Create from a multipart upload (file part + optional title) or a JSON
/// body carrying an already-hosted image URL.
async fn create(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    req: Request,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    let (mut body, file) = upload::read_payload(req).await?;
    if let Some(file) = file {
        let url = svc.store_image("carousel", None, &file)?;
        body["image_url"] = serde_json::json!(url);
    }
    let input: CarouselInput = parse_input(body)?;
    Ok(ok_json(svc.create_carousel(input)?))
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
        let url = svc.store_image("carousel", Some(&id), &file)?;
        patch["image_url"] = serde_json::json!(url);
    }
    Ok(ok_json(svc.update_carousel(&id, patch)?))
}

async fn remove(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
    Query(q): Query<DeleteQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    if q.is_force() {
        let doc = svc.purge_record("carousel_images", "id", &id)?;
        return Ok(ok_msg(doc, "carousel image permanently deleted"));
    }
    let doc = svc.soft_delete_record("carousel_images", "id", &id)?;
    Ok(ok_msg(doc, "carousel image moved to trash"))
}

async fn restore(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    let doc = svc.restore_record("carousel_images", "id", &id)?;
    Ok(ok_msg(doc, "carousel image restored"))
}
