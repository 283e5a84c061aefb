use serde::{Deserialize, Serialize};

/// A landing-page carousel image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarouselImage {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Public URL of the stored image.
    pub image_url: String,

    pub created_at: String,

    pub updated_at: String,

    #[serde(default)]
    pub deleted_at: Option<String>,
}
