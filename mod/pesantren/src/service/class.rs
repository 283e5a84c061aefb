use serde::{Deserialize, Serialize};

use pondok_core::{ListPlan, ListResult, ServiceError, new_id, now_rfc3339};
use pondok_sql::Value;

use crate::model::Class;

use super::PesantrenService;
use super::query::ListSpec;

pub const CLASS_SORTS: &[(&str, &'static str, bool)] = &[
    ("newest", "created_at", false),
    ("oldest", "created_at", true),
    ("name_asc", "name", true),
    ("name_desc", "name", false),
];

const CLASS_SEARCH: &[&str] = &["name", "description"];
const CLASS_PROTECTED: &[&str] = &["id", "created_at", "deleted_at"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub scheduled: i64,
    pub unscheduled: i64,
}

fn class_indexes(c: &Class) -> Vec<(&'static str, Value)> {
    vec![
        ("name", Value::text(&c.name)),
        ("description", Value::opt_text(c.description.as_deref())),
        ("created_at", Value::text(&c.created_at)),
        ("updated_at", Value::text(&c.updated_at)),
        ("deleted_at", Value::opt_text(c.deleted_at.as_deref())),
    ]
}

impl PesantrenService {
    pub fn create_class(&self, input: ClassInput) -> Result<Class, ServiceError> {
        let name = Self::required("name", input.name.as_deref())?;
        let now = now_rfc3339();
        let class = Class {
            id: new_id(),
            name,
            description: input.description,
            image_url: input.image_url,
            created_at: now.clone(),
            updated_at: now,
            deleted_at: None,
        };
        self.insert_record("classes", &class.id, &class, &class_indexes(&class))?;
        Ok(class)
    }

    pub fn get_class(&self, id: &str) -> Result<Class, ServiceError> {
        self.get_record("classes", "id", id)
    }

    pub fn update_class(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Class, ServiceError> {
        let current: Class = self.get_record("classes", "id", id)?;
        let updated: Class = Self::apply_patch(&current, patch, CLASS_PROTECTED)?;
        self.update_record("classes", "id", id, &updated, &class_indexes(&updated))?;
        Ok(updated)
    }

    pub fn list_classes(&self, plan: &ListPlan) -> Result<ListResult<Class>, ServiceError> {
        self.run_list(&ListSpec::new("classes", CLASS_SEARCH), plan)
    }

    /// Aggregate class counts; `scheduled` counts active classes with at
    /// least one active schedule attached.
    pub fn class_stats(&self) -> Result<ClassStats, ServiceError> {
        let total = self.count_where("classes", &[], &[])?;
        let active = self.count_where("classes", &["deleted_at IS NULL"], &[])?;
        let scheduled = self.count_where(
            "classes",
            &[
                "deleted_at IS NULL",
                "EXISTS (SELECT 1 FROM schedules \
                 WHERE schedules.class_id = classes.id \
                 AND schedules.deleted_at IS NULL)",
            ],
            &[],
        )?;
        Ok(ClassStats {
            total,
            active,
            inactive: total - active,
            scheduled,
            unscheduled: active - scheduled,
        })
    }

    /// Santri head-count per class, active rows only.
    pub fn class_member_count(&self, id: &str) -> Result<i64, ServiceError> {
        self.count_where(
            "santris",
            &[
                "class_id = ?",
                "accepted_at IS NOT NULL",
                "deleted_at IS NULL",
            ],
            &[Value::text(id)],
        )
    }
}
