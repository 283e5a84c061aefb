//! JWT validation at the HTTP edge.
//!
//! Tokens are issued by the external identity provider; this middleware
//! only validates the signature and expiry. A valid token puts
//! [`Claims`] into request extensions for the handlers' role checks; a
//! missing header passes through as an anonymous request, so public
//! endpoints need no special-casing here. Only a present-but-invalid
//! token fails at this layer.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{DecodingKey, Validation};

use pondok_core::Claims;

/// Shared JWT configuration for the middleware.
#[derive(Clone)]
pub struct JwtState {
    pub decoding_key: DecodingKey,
    pub validation: Validation,
}

impl JwtState {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

pub async fn auth_middleware(
    State(jwt_state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = token {
        match jsonwebtoken::decode::<Claims>(
            token,
            &jwt_state.decoding_key,
            &jwt_state.validation,
        ) {
            Ok(data) => {
                request.extensions_mut().insert(data.claims);
            }
            Err(e) => {
                tracing::debug!(error = %e, "rejected bearer token");
                let body = serde_json::json!({
                    "statusCode": 401,
                    "statusMessage": format!("invalid token: {}", e),
                });
                return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
            }
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    #[test]
    fn roundtrips_issued_claims() {
        let secret = "a-long-enough-test-secret";
        let claims = Claims {
            sub: "u1".into(),
            name: Some("Admin".into()),
            email: None,
            role: Some("admin".into()),
            iat: 0,
            exp: i64::MAX,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let state = JwtState::from_secret(secret);
        let decoded =
            jsonwebtoken::decode::<Claims>(&token, &state.decoding_key, &state.validation)
                .unwrap();
        assert_eq!(decoded.claims.sub, "u1");
        assert!(decoded.claims.is_admin());
    }

    #[test]
    fn wrong_secret_fails_validation() {
        let claims = Claims {
            sub: "u1".into(),
            name: None,
            email: None,
            role: None,
            iat: 0,
            exp: i64::MAX,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"first-secret-value"),
        )
        .unwrap();

        let state = JwtState::from_secret("second-secret-value");
        assert!(
            jsonwebtoken::decode::<Claims>(&token, &state.decoding_key, &state.validation)
                .is_err()
        );
    }
}
