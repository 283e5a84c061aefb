//! Request payload normalization.
//!
//! Create/update endpoints accept either a JSON body or a
//! `multipart/form-data` body carrying an optional file part plus text
//! fields. Both arrive here and leave as one JSON object (plus the file,
//! when present), so handlers never branch on the wire format.

use axum::body::to_bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;

use pondok_core::ServiceError;

use crate::service::media::UploadedFile;

/// Upper bound on request bodies, uploads included.
const BODY_LIMIT: usize = 20 * 1024 * 1024;

/// Fields whose multipart text value is parsed as JSON rather than kept
/// as a string. A malformed value degrades to an empty array instead of
/// failing the whole request.
const JSON_ARRAY_FIELDS: &[&str] = &["tags"];

/// Read a request body into a JSON object and an optional uploaded file.
pub(crate) async fn read_payload(
    req: Request,
) -> Result<(serde_json::Value, Option<UploadedFile>), ServiceError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        read_multipart(req).await
    } else {
        read_json(req).await.map(|body| (body, None))
    }
}

async fn read_json(req: Request) -> Result<serde_json::Value, ServiceError> {
    let bytes = to_bytes(req.into_body(), BODY_LIMIT)
        .await
        .map_err(|e| ServiceError::Validation(format!("unreadable body: {}", e)))?;
    if bytes.is_empty() {
        return Ok(serde_json::json!({}));
    }
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| ServiceError::Validation(format!("invalid JSON body: {}", e)))?;
    if !value.is_object() {
        return Err(ServiceError::Validation(
            "request body must be a JSON object".into(),
        ));
    }
    Ok(value)
}

async fn read_multipart(
    req: Request,
) -> Result<(serde_json::Value, Option<UploadedFile>), ServiceError> {
    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| ServiceError::Validation(format!("invalid multipart body: {}", e)))?;

    let mut body = serde_json::Map::new();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::Validation(format!("invalid multipart field: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        // Only the part named `file` carries the upload; the first one
        // wins. File parts under any other name are ordinary fields.
        if name.as_deref() == Some("file") {
            if let Some(filename) = filename {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::Validation(format!("unreadable file part: {}", e)))?;
                if file.is_none() {
                    file = Some(UploadedFile {
                        filename,
                        content_type: content_type.unwrap_or_else(|| "image/jpeg".into()),
                        data: data.to_vec(),
                    });
                }
                continue;
            }
        }

        let Some(name) = name else { continue };
        let text = field
            .text()
            .await
            .map_err(|e| ServiceError::Validation(format!("unreadable field '{}': {}", name, e)))?;

        if JSON_ARRAY_FIELDS.contains(&name.as_str()) {
            let parsed: serde_json::Value =
                serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!([]));
            body.insert(name, parsed);
        } else {
            body.insert(name, serde_json::json!(text));
        }
    }

    Ok((serde_json::Value::Object(body), file))
}
