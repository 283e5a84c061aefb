//! End-to-end tests over the HTTP surface: router, auth gate, envelopes,
//! and the wire error shape.

use std::sync::Arc;

use axum::Extension;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use pesantren::api;
use pesantren::service::PesantrenService;
use pondok_blob::FileStore;
use pondok_core::Claims;
use pondok_sql::SqliteStore;

const BASE: &str = "http://localhost:8080";

fn service(dir: &std::path::Path) -> Arc<PesantrenService> {
    let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
    let blob = Arc::new(FileStore::open(dir).unwrap());
    Arc::new(PesantrenService::new(sql, blob, BASE).unwrap())
}

fn claims(role: &str) -> Claims {
    Claims {
        sub: "u1".into(),
        name: Some("Tester".into()),
        email: None,
        role: Some(role.into()),
        iat: 0,
        exp: i64::MAX,
    }
}

/// Router as the anonymous public sees it.
fn public_app(svc: Arc<PesantrenService>) -> Router {
    api::router(svc)
}

/// Router behind an authenticated session with the given role.
fn app_as(svc: Arc<PesantrenService>, role: &str) -> Router {
    api::router(svc).layer(Extension(claims(role)))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn anonymous_mutation_gets_wire_error_shape() {
    let dir = tempfile::tempdir().unwrap();
    let app = public_app(service(dir.path()));

    let (status, body) = send(
        &app,
        "POST",
        "/classes",
        Some(serde_json::json!({"name": "Tahfidz A"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["statusCode"], 401);
    assert!(body["statusMessage"].is_string());
}

#[tokio::test]
async fn non_admin_role_is_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_as(service(dir.path()), "user");

    let (status, body) = send(
        &app,
        "POST",
        "/classes",
        Some(serde_json::json!({"name": "Tahfidz A"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["statusCode"], 403);
}

#[tokio::test]
async fn class_list_paginates_with_filtered_total() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(dir.path());
    let app = app_as(svc, "admin");

    for i in 1..=12 {
        let (status, _) = send(
            &app,
            "POST",
            "/classes",
            Some(serde_json::json!({"name": format!("Kelas {:02}", i)})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, "GET", "/classes?page=2&limit=5&sortBy=name_asc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["limit"], 5);
    assert_eq!(body["pagination"]["total"], 12);
    assert_eq!(body["pagination"]["totalPages"], 3);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["name"], "Kelas 06");
    assert_eq!(items[4]["name"], "Kelas 10");
    assert_eq!(body["filters"]["sortBy"], "name_asc");
}

#[tokio::test]
async fn registration_and_acceptance_flow() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(dir.path());
    let public = public_app(svc.clone());
    let admin = app_as(svc, "admin");

    // anyone may register
    let (status, body) = send(
        &public,
        "POST",
        "/registrants",
        Some(serde_json::json!({
            "full_name": "Ahmad Fauzi",
            "gender": "male",
            "address": "Jl. Melati 1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let nis = body["data"]["nis"].as_str().unwrap();
    assert_eq!(nis.len(), 13);
    assert!(body["data"]["accepted_at"].is_null());

    // the queue is admin-only
    let (status, _) = send(&public, "GET", "/registrants", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // not on the roster yet
    let (_, body) = send(&admin, "GET", "/santris", None).await;
    assert_eq!(body["pagination"]["total"], 0);

    let (status, body) = send(&admin, "PATCH", &format!("/registrants/{}/accept", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["accepted_at"].is_string());

    // acceptance is one-directional
    let (status, body) = send(&admin, "PATCH", &format!("/registrants/{}/accept", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["statusCode"], 409);

    let (_, body) = send(&admin, "GET", "/santris", None).await;
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn delete_restore_purge_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_as(service(dir.path()), "admin");

    let (_, body) = send(
        &app,
        "POST",
        "/classes",
        Some(serde_json::json!({"name": "Tahfidz A"})),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // purging an active record is refused
    let (status, _) = send(&app, "DELETE", &format!("/classes/{}?force=true", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "DELETE", &format!("/classes/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["deleted_at"].is_string());

    // hidden from the default list, visible with includeDeleted
    let (_, body) = send(&app, "GET", "/classes", None).await;
    assert_eq!(body["pagination"]["total"], 0);
    let (_, body) = send(&app, "GET", "/classes?includeDeleted=true", None).await;
    assert_eq!(body["pagination"]["total"], 1);

    let (status, body) = send(&app, "POST", &format!("/classes/{}/restore", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["deleted_at"].is_null());

    send(&app, "DELETE", &format!("/classes/{}", id), None).await;
    let (status, _) = send(&app, "DELETE", &format!("/classes/{}?force=true", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", &format!("/classes/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
}

#[tokio::test]
async fn schedule_window_is_validated_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_as(service(dir.path()), "admin");

    let (status, body) = send(
        &app,
        "POST",
        "/schedules",
        Some(serde_json::json!({
            "name": "Kajian",
            "start_at": "2025-10-01T10:00:00+00:00",
            "end_at": "2025-10-01T08:00:00+00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
}

fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                    name, f
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

#[tokio::test]
async fn multipart_upload_stores_and_serves_media() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_as(service(dir.path()), "admin");

    let boundary = "pondoktestboundary";
    let body = multipart_body(
        boundary,
        &[
            ("title", None, b"Gedung Asrama"),
            ("file", Some("Foto Gedung.png"), &[1, 2, 3]),
        ],
    );
    let req = Request::builder()
        .method("POST")
        .uri("/carousel")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let url = json["data"]["image_url"].as_str().unwrap();
    assert!(url.starts_with(&format!("{}/media/carousel/", BASE)));
    assert!(url.ends_with("-foto-gedung.png"));

    // the stored blob is served back under /media
    let path = url.strip_prefix(BASE).unwrap();
    let req = Request::builder().uri(path).body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "image/png"
    );
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), &[1, 2, 3]);
}

#[tokio::test]
async fn misnamed_file_part_is_not_an_upload() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_as(service(dir.path()), "admin");

    // a filename on a part not named `file` does not become the payload,
    // so the carousel create fails for want of an image
    let boundary = "pondoktestboundary";
    let body = multipart_body(
        boundary,
        &[
            ("title", None, b"Gedung Asrama"),
            ("avatar", Some("sneaky.png"), b"not the upload"),
        ],
    );
    let req = Request::builder()
        .method("POST")
        .uri("/carousel")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["statusCode"], 400);
}

#[tokio::test]
async fn first_file_part_wins() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_as(service(dir.path()), "admin");

    let boundary = "pondoktestboundary";
    let body = multipart_body(
        boundary,
        &[
            ("file", Some("first.png"), &[1]),
            ("file", Some("second.png"), &[9, 9]),
        ],
    );
    let req = Request::builder()
        .method("POST")
        .uri("/carousel")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let url = json["data"]["image_url"].as_str().unwrap();
    assert!(url.ends_with("-first.png"), "{url}");
}

#[tokio::test]
async fn malformed_tags_field_degrades_to_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_as(service(dir.path()), "admin");

    let boundary = "pondoktestboundary";
    let body = multipart_body(
        boundary,
        &[
            ("title", None, b"Artikel"),
            ("content", None, b"isi artikel"),
            ("tags", None, b"bukan json"),
        ],
    );
    let req = Request::builder()
        .method("POST")
        .uri("/blogs")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["data"]["tags"], serde_json::json!([]));

    // a well-formed JSON array is kept
    let body = multipart_body(
        boundary,
        &[
            ("title", None, b"Kedua"),
            ("content", None, b"isi artikel"),
            ("tags", None, br#"["ngaji","tahfidz"]"#),
        ],
    );
    let req = Request::builder()
        .method("POST")
        .uri("/blogs")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["data"]["tags"], serde_json::json!(["ngaji", "tahfidz"]));
}

#[tokio::test]
async fn blog_read_increments_views() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(dir.path());
    let public = public_app(svc.clone());
    let admin = app_as(svc, "admin");

    send(
        &admin,
        "POST",
        "/blogs",
        Some(serde_json::json!({"title": "Kajian Subuh", "content": "isi"})),
    )
    .await;

    let (status, body) = send(&public, "GET", "/blogs/kajian-subuh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["views"], 1);

    let (_, body) = send(&public, "GET", "/blogs/kajian-subuh", None).await;
    assert_eq!(body["data"]["views"], 2);
}
