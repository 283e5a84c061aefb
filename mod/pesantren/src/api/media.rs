//! Serving stored media blobs.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use pondok_core::ServiceError;

use crate::service::media::content_type_for;

use super::AppState;

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/media/{*key}", get(serve))
}

async fn serve(
    State(svc): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ServiceError> {
    let data = svc.read_media(&key)?;
    let headers = [
        (header::CONTENT_TYPE, content_type_for(&key)),
        (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
    ];
    Ok((headers, data).into_response())
}
