use serde::Deserialize;

use pondok_core::{ListPlan, ListResult, ServiceError, new_id, now_rfc3339};
use pondok_sql::Value;

use crate::model::CarouselImage;

use super::query::ListSpec;
use super::PesantrenService;

pub const CAROUSEL_SORTS: &[(&str, &'static str, bool)] = &[
    ("newest", "created_at", false),
    ("oldest", "created_at", true),
];

const CAROUSEL_SEARCH: &[&str] = &["title"];
const CAROUSEL_PROTECTED: &[&str] = &["id", "created_at", "deleted_at"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarouselInput {
    pub title: Option<String>,
    pub image_url: Option<String>,
}

fn carousel_indexes(c: &CarouselImage) -> Vec<(&'static str, Value)> {
    vec![
        ("title", Value::opt_text(c.title.as_deref())),
        ("created_at", Value::text(&c.created_at)),
        ("updated_at", Value::text(&c.updated_at)),
        ("deleted_at", Value::opt_text(c.deleted_at.as_deref())),
    ]
}

impl PesantrenService {
    /// Create a carousel entry; the image itself must already be stored
    /// (the API layer uploads the file part before calling this).
    pub fn create_carousel(&self, input: CarouselInput) -> Result<CarouselImage, ServiceError> {
        let image_url = Self::required("image_url", input.image_url.as_deref())?;
        let now = now_rfc3339();
        let image = CarouselImage {
            id: new_id(),
            title: input.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            image_url,
            created_at: now.clone(),
            updated_at: now,
            deleted_at: None,
        };
        self.insert_record(
            "carousel_images",
            &image.id,
            &image,
            &carousel_indexes(&image),
        )?;
        Ok(image)
    }

    pub fn get_carousel(&self, id: &str) -> Result<CarouselImage, ServiceError> {
        self.get_record("carousel_images", "id", id)
    }

    pub fn update_carousel(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<CarouselImage, ServiceError> {
        let current: CarouselImage = self.get_record("carousel_images", "id", id)?;
        let updated: CarouselImage = Self::apply_patch(&current, patch, CAROUSEL_PROTECTED)?;
        self.update_record(
            "carousel_images",
            "id",
            id,
            &updated,
            &carousel_indexes(&updated),
        )?;
        Ok(updated)
    }

    pub fn list_carousel(
        &self,
        plan: &ListPlan,
    ) -> Result<ListResult<CarouselImage>, ServiceError> {
        self.run_list(&ListSpec::new("carousel_images", CAROUSEL_SEARCH), plan)
    }
}
