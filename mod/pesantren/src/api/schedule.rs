use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use pondok_core::{Claims, ListParams, ListPlan, ServiceError};

use crate::service::schedule::{SCHEDULE_SORTS, ScheduleFilters, ScheduleInput};

use super::{AppState, DeleteQuery, admin, list_json, ok_json, ok_msg};

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/restore", post(restore))
}

#[derive(Debug, Deserialize)]
struct ScheduleListQuery {
    #[serde(flatten)]
    list: ListParams,

    #[serde(default)]
    class_id: Option<String>,

    #[serde(default)]
    date: Option<String>,
}

async fn list(
    State(svc): State<AppState>,
    Query(q): Query<ScheduleListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let plan = ListPlan::build(&q.list, SCHEDULE_SORTS);
    let filters = ScheduleFilters {
        class_id: q.class_id.clone(),
        date: q.date.clone(),
    };
    let result = svc.list_schedules(&plan, &filters)?;
    let echo = serde_json::json!({
        "search": plan.search,
        "sortBy": plan.sort_label(SCHEDULE_SORTS),
        "classId": q.class_id,
        "date": q.date,
        "includeDeleted": plan.include_deleted,
    });
    Ok(list_json(result, echo))
}

async fn stats(State(svc): State<AppState>) -> Result<Json<serde_json::Value>, ServiceError> {
    Ok(ok_json(svc.schedule_stats()?))
}

async fn fetch(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    Ok(ok_json(svc.get_schedule(&id)?))
}

async fn create(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Json(input): Json<ScheduleInput>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    Ok(ok_json(svc.create_schedule(input)?))
}

async fn update(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    Ok(ok_json(svc.update_schedule(&id, patch)?))
}

async fn remove(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
    Query(q): Query<DeleteQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    if q.is_force() {
        let doc = svc.purge_record("schedules", "id", &id)?;
        return Ok(ok_msg(doc, "schedule permanently deleted"));
    }
    let doc = svc.soft_delete_record("schedules", "id", &id)?;
    Ok(ok_msg(doc, "schedule moved to trash"))
}

async fn restore(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    let doc = svc.restore_record("schedules", "id", &id)?;
    Ok(ok_msg(doc, "schedule restored"))
}
