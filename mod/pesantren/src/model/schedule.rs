use serde::{Deserialize, Serialize};

/// A scheduled activity, optionally bound to a class.
///
/// `start_at`/`end_at` are RFC 3339 UTC instants; the service validates
/// `start_at < end_at` on create and update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,

    pub start_at: String,

    pub end_at: String,

    pub created_at: String,

    pub updated_at: String,

    #[serde(default)]
    pub deleted_at: Option<String>,
}
