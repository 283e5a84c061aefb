//! Public registration and the admin registrant queue.
//!
//! POST here is the one unauthenticated write in the module: anyone may
//! register. The record stays off the santri roster until an admin
//! accepts it.

use axum::extract::{Path, Query, Request, State};
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};

use pondok_core::{Claims, ListParams, ListPlan, ServiceError};

use crate::service::santri::{SANTRI_SORTS, SantriInput};

use super::{AppState, admin, list_json, ok_json, parse_input, upload};

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(register))
        .route("/{id}", get(fetch))
        .route("/{id}/accept", patch(accept))
}

async fn register(
    State(svc): State<AppState>,
    req: Request,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (mut body, file) = upload::read_payload(req).await?;
    if let Some(file) = file {
        let url = svc.store_image("santris", None, &file)?;
        body["image_url"] = serde_json::json!(url);
    }
    let input: SantriInput = parse_input(body)?;
    Ok(ok_json(svc.register_santri(input, false)?))
}

async fn list(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    let plan = ListPlan::build(&params, SANTRI_SORTS);
    let result = svc.list_registrants(&plan)?;
    let filters = serde_json::json!({
        "search": plan.search,
        "sortBy": plan.sort_label(SANTRI_SORTS),
        "includeDeleted": plan.include_deleted,
    });
    Ok(list_json(result, filters))
}

async fn fetch(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    Ok(ok_json(svc.get_santri(&id)?))
}

async fn accept(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    Ok(ok_json(svc.accept_registrant(&id)?))
}
