//! Caller identity and the shared role policy.
//!
//! Token issuance, refresh, and profile management belong to the external
//! identity provider. This layer only validates a bearer token at the HTTP
//! edge (see the server binary's middleware) and carries the resulting
//! claims to handlers, which apply [`require_admin`] before any mutation.

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// The role required for mutating, admin-scoped operations.
pub const ADMIN_ROLE: &str = "admin";

/// Verified JWT claims, inserted into request extensions by the auth
/// middleware. Absent from the request means the caller is anonymous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id at the identity provider.
    pub sub: String,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Email address.
    #[serde(default)]
    pub email: Option<String>,

    /// Role from the caller's profile record ("admin", "user", ...).
    #[serde(default)]
    pub role: Option<String>,

    /// Issued at (unix timestamp).
    pub iat: i64,

    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

/// The single authorization policy for mutating endpoints.
///
/// Anonymous callers get `Unauthorized`; authenticated callers without the
/// admin role get `PermissionDenied`. Every mutating handler calls this —
/// never an ad-hoc per-endpoint check.
pub fn require_admin(claims: Option<&Claims>) -> Result<(), ServiceError> {
    match claims {
        None => Err(ServiceError::Unauthorized(
            "missing or invalid credentials".into(),
        )),
        Some(c) if c.is_admin() => Ok(()),
        Some(_) => Err(ServiceError::PermissionDenied(
            "admin role required".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Option<&str>) -> Claims {
        Claims {
            sub: "u1".into(),
            name: None,
            email: None,
            role: role.map(String::from),
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn anonymous_is_unauthorized() {
        let err = require_admin(None).unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn non_admin_is_forbidden() {
        for role in [None, Some("user"), Some("editor")] {
            let err = require_admin(Some(&claims(role))).unwrap_err();
            assert!(matches!(err, ServiceError::PermissionDenied(_)), "role {:?}", role);
        }
    }

    #[test]
    fn admin_passes() {
        assert!(require_admin(Some(&claims(Some("admin")))).is_ok());
    }
}
