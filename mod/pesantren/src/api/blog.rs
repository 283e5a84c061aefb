use axum::extract::{Path, Query, Request, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use pondok_core::{Claims, ListParams, ListPlan, ServiceError};

use crate::service::blog::{BLOG_SORTS, BlogFilters, BlogInput};

use super::{AppState, DeleteQuery, admin, list_json, ok_json, ok_msg, parse_input, upload};

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/{slug}", get(read).patch(update).delete(remove))
        .route("/{slug}/restore", post(restore))
}

#[derive(Debug, Deserialize)]
struct BlogListQuery {
    #[serde(flatten)]
    list: ListParams,

    #[serde(default)]
    category: Option<String>,

    #[serde(default)]
    tag: Option<String>,

    #[serde(default)]
    author_id: Option<String>,
}

async fn list(
    State(svc): State<AppState>,
    Query(q): Query<BlogListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let plan = ListPlan::build(&q.list, BLOG_SORTS);
    let filters = BlogFilters {
        category: q.category.clone(),
        tag: q.tag.clone(),
        author_id: q.author_id.clone(),
    };
    let result = svc.list_blogs(&plan, &filters)?;
    let echo = serde_json::json!({
        "search": plan.search,
        "sortBy": plan.sort_label(BLOG_SORTS),
        "category": q.category,
        "tag": q.tag,
        "authorId": q.author_id,
        "includeDeleted": plan.include_deleted,
    });
    Ok(list_json(result, echo))
}

async fn stats(State(svc): State<AppState>) -> Result<Json<serde_json::Value>, ServiceError> {
    Ok(ok_json(svc.blog_stats()?))
}

/// Public read: resolves the slug and counts the view.
async fn read(
    State(svc): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    Ok(ok_json(svc.read_blog(&slug)?))
}

async fn create(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    req: Request,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    let (mut body, file) = upload::read_payload(req).await?;
    if let Some(file) = file {
        let url = svc.store_image("blogs", None, &file)?;
        body["image_url"] = serde_json::json!(url);
    }
    let input: BlogInput = parse_input(body)?;
    Ok(ok_json(svc.create_blog(input)?))
}

async fn update(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(slug): Path<String>,
    req: Request,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    let (mut patch, file) = upload::read_payload(req).await?;
    if let Some(file) = file {
        let url = svc.store_image("blogs", Some(&slug), &file)?;
        patch["image_url"] = serde_json::json!(url);
    }
    Ok(ok_json(svc.update_blog(&slug, patch)?))
}

async fn remove(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(slug): Path<String>,
    Query(q): Query<DeleteQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    if q.is_force() {
        let doc = svc.purge_record("blogs", "slug", &slug)?;
        return Ok(ok_msg(doc, "blog permanently deleted"));
    }
    let doc = svc.soft_delete_record("blogs", "slug", &slug)?;
    Ok(ok_msg(doc, "blog moved to trash"))
}

async fn restore(
    State(svc): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    admin(&claims)?;
    let doc = svc.restore_record("blogs", "slug", &slug)?;
    Ok(ok_msg(doc, "blog restored"))
}
