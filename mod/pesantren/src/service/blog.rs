use serde::{Deserialize, Serialize};

use pondok_core::{ListPlan, ListResult, ServiceError, new_id, now_rfc3339};
use pondok_sql::Value;

use crate::model::Blog;

use super::media::slugify;
use super::query::ListSpec;
use super::PesantrenService;

pub const BLOG_SORTS: &[(&str, &'static str, bool)] = &[
    ("newest", "created_at", false),
    ("oldest", "created_at", true),
    ("title_asc", "title", true),
    ("title_desc", "title", false),
];

const BLOG_SEARCH: &[&str] = &["title", "description", "content"];

/// A patch can never touch identity, the read counter, or lifecycle stamps.
const BLOG_PROTECTED: &[&str] = &["id", "views", "created_at", "deleted_at"];

const DEFAULT_CATEGORY: &str = "akademik";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogInput {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub author_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BlogFilters {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub author_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlogStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub categories: i64,
    pub total_views: i64,
}

fn blog_indexes(b: &Blog) -> Result<Vec<(&'static str, Value)>, ServiceError> {
    let tags =
        serde_json::to_string(&b.tags).map_err(|e| ServiceError::Internal(e.to_string()))?;
    Ok(vec![
        ("slug", Value::text(&b.slug)),
        ("title", Value::text(&b.title)),
        ("description", Value::opt_text(b.description.as_deref())),
        ("content", Value::text(&b.content)),
        ("category", Value::text(&b.category)),
        ("tags", Value::Text(tags)),
        ("author_id", Value::opt_text(b.author_id.as_deref())),
        ("created_at", Value::text(&b.created_at)),
        ("updated_at", Value::text(&b.updated_at)),
        ("deleted_at", Value::opt_text(b.deleted_at.as_deref())),
    ])
}

impl PesantrenService {
    /// Create a blog post. The slug is derived from the title when absent,
    /// always sanitized; a duplicate slug is a conflict.
    pub fn create_blog(&self, input: BlogInput) -> Result<Blog, ServiceError> {
        let title = Self::required("title", input.title.as_deref())?;
        let content = Self::required("content", input.content.as_deref())?;

        let slug = slugify(input.slug.as_deref().unwrap_or(&title));
        if slug.is_empty() {
            return Err(ServiceError::Validation(
                "slug has no usable characters".into(),
            ));
        }

        let category = input
            .category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.into());

        let now = now_rfc3339();
        let blog = Blog {
            id: new_id(),
            slug,
            title,
            description: input.description,
            content,
            category,
            tags: input.tags.unwrap_or_default(),
            image_url: input.image_url,
            author_id: input.author_id,
            views: 0,
            created_at: now.clone(),
            updated_at: now,
            deleted_at: None,
        };
        self.insert_record("blogs", &blog.id, &blog, &blog_indexes(&blog)?)?;
        Ok(blog)
    }

    pub fn get_blog(&self, slug: &str) -> Result<Blog, ServiceError> {
        self.get_record("blogs", "slug", slug)
    }

    /// Public read path: fetch an active post and count the view. The
    /// counter bump leaves `updated_at` alone so editorial recency is not
    /// polluted by reads.
    pub fn read_blog(&self, slug: &str) -> Result<Blog, ServiceError> {
        let mut blog: Blog = self.get_record("blogs", "slug", slug)?;
        if blog.deleted_at.is_some() {
            return Err(ServiceError::NotFound(format!("blogs/{}", slug)));
        }
        blog.views += 1;
        let json =
            serde_json::to_string(&blog).map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.sql
            .exec(
                "UPDATE blogs SET data = ? WHERE id = ?",
                &[Value::Text(json), Value::text(&blog.id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(blog)
    }

    /// Patch a blog post, addressed by its current slug. A patched slug is
    /// re-sanitized; moving onto an existing slug is a conflict.
    pub fn update_blog(
        &self,
        slug: &str,
        mut patch: serde_json::Value,
    ) -> Result<Blog, ServiceError> {
        if let Some(new_slug) = patch.get("slug").and_then(|v| v.as_str()) {
            let clean = slugify(new_slug);
            if clean.is_empty() {
                return Err(ServiceError::Validation(
                    "slug has no usable characters".into(),
                ));
            }
            patch["slug"] = serde_json::json!(clean);
        }
        let current: Blog = self.get_record("blogs", "slug", slug)?;
        let updated: Blog = Self::apply_patch(&current, patch, BLOG_PROTECTED)?;
        self.update_record("blogs", "id", &current.id, &updated, &blog_indexes(&updated)?)?;
        Ok(updated)
    }

    pub fn list_blogs(
        &self,
        plan: &ListPlan,
        filters: &BlogFilters,
    ) -> Result<ListResult<Blog>, ServiceError> {
        let mut spec = ListSpec::new("blogs", BLOG_SEARCH);
        if let Some(category) = filters.category.as_deref() {
            spec.eq.push(("category", Value::text(category)));
        }
        if let Some(author) = filters.author_id.as_deref() {
            spec.eq.push(("author_id", Value::text(author)));
        }
        if let Some(tag) = filters.tag.as_deref() {
            // tags column holds the JSON array; match any element exactly
            spec.raw.push((
                "EXISTS (SELECT 1 FROM json_each(blogs.tags) WHERE json_each.value = ?)",
                Value::text(tag),
            ));
        }
        self.run_list(&spec, plan)
    }

    pub fn blog_stats(&self) -> Result<BlogStats, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT COUNT(DISTINCT category) AS cnt FROM blogs WHERE deleted_at IS NULL",
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let categories = rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0);

        let rows = self
            .sql
            .query(
                "SELECT COALESCE(SUM(json_extract(data, '$.views')), 0) AS views \
                 FROM blogs WHERE deleted_at IS NULL",
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total_views = rows.first().and_then(|r| r.get_i64("views")).unwrap_or(0);

        Ok(BlogStats {
            total: self.count_where("blogs", &[], &[])?,
            active: self.count_where("blogs", &["deleted_at IS NULL"], &[])?,
            inactive: self.count_where("blogs", &["deleted_at IS NOT NULL"], &[])?,
            categories,
            total_views,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::service;
    use pondok_core::ListParams;

    fn post(title: &str) -> BlogInput {
        BlogInput {
            title: Some(title.into()),
            content: Some("isi artikel".into()),
            ..Default::default()
        }
    }

    fn plan() -> ListPlan {
        ListPlan::build(&ListParams::default(), BLOG_SORTS)
    }

    #[test]
    fn slug_derived_from_title() {
        let (_dir, svc) = service();
        let b = svc.create_blog(post("Kajian Subuh: Adab Menuntut Ilmu")).unwrap();
        assert_eq!(b.slug, "kajian-subuh-adab-menuntut-ilmu");
        assert_eq!(b.category, "akademik");
        assert_eq!(b.views, 0);
    }

    #[test]
    fn duplicate_slug_conflicts() {
        let (_dir, svc) = service();
        svc.create_blog(post("Sama")).unwrap();
        assert!(matches!(
            svc.create_blog(post("Sama")),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn read_counts_views_without_touching_updated_at() {
        let (_dir, svc) = service();
        let b = svc.create_blog(post("Artikel")).unwrap();

        let read = svc.read_blog("artikel").unwrap();
        assert_eq!(read.views, 1);
        assert_eq!(read.updated_at, b.updated_at);

        let again = svc.read_blog("artikel").unwrap();
        assert_eq!(again.views, 2);
    }

    #[test]
    fn trashed_post_is_not_publicly_readable() {
        let (_dir, svc) = service();
        let b = svc.create_blog(post("Artikel")).unwrap();
        svc.soft_delete_record("blogs", "id", &b.id).unwrap();
        assert!(matches!(
            svc.read_blog("artikel"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn patch_protects_views_and_sanitizes_slug() {
        let (_dir, svc) = service();
        svc.create_blog(post("Artikel")).unwrap();
        svc.read_blog("artikel").unwrap();

        let updated = svc
            .update_blog(
                "artikel",
                serde_json::json!({"slug": "Artikel BARU!", "views": 999}),
            )
            .unwrap();
        assert_eq!(updated.slug, "artikel-baru");
        assert_eq!(updated.views, 1);

        // old slug is gone, new slug resolves
        assert!(svc.get_blog("artikel").is_err());
        assert!(svc.get_blog("artikel-baru").is_ok());
    }

    #[test]
    fn tag_filter_matches_array_elements() {
        let (_dir, svc) = service();
        let mut tagged = post("Dengan Tag");
        tagged.tags = Some(vec!["ngaji".into(), "tahfidz".into()]);
        svc.create_blog(tagged).unwrap();
        svc.create_blog(post("Tanpa Tag")).unwrap();

        let filters = BlogFilters {
            tag: Some("tahfidz".into()),
            ..Default::default()
        };
        let found = svc.list_blogs(&plan(), &filters).unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].title, "Dengan Tag");

        // substring of a tag must not match
        let filters = BlogFilters {
            tag: Some("tah".into()),
            ..Default::default()
        };
        assert_eq!(svc.list_blogs(&plan(), &filters).unwrap().total, 0);
    }

    #[test]
    fn stats_count_categories_and_views() {
        let (_dir, svc) = service();
        let mut a = post("Satu");
        a.category = Some("Kegiatan".into());
        svc.create_blog(a).unwrap();
        svc.create_blog(post("Dua")).unwrap();
        svc.read_blog("dua").unwrap();
        svc.read_blog("dua").unwrap();

        let stats = svc.blog_stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.categories, 2);
        assert_eq!(stats.total_views, 2);
    }
}
