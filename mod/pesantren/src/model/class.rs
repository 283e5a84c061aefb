use serde::{Deserialize, Serialize};

/// A class (study group) santris are assigned to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Class {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    pub created_at: String,

    pub updated_at: String,

    #[serde(default)]
    pub deleted_at: Option<String>,
}
