use serde::{Deserialize, Serialize};

/// Blog post, addressed by its URL slug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Blog {
    pub id: String,

    /// Unique, sanitized URL slug.
    pub slug: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub content: String,

    /// Category, defaults to "akademik".
    pub category: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,

    /// Read counter, incremented on each public fetch by slug.
    #[serde(default)]
    pub views: i64,

    pub created_at: String,

    pub updated_at: String,

    #[serde(default)]
    pub deleted_at: Option<String>,
}
