use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pondok_core::{ListPlan, ListResult, ServiceError, new_id, now_rfc3339};
use pondok_sql::Value;

use crate::model::Schedule;

use super::query::ListSpec;
use super::PesantrenService;

pub const SCHEDULE_SORTS: &[(&str, &'static str, bool)] = &[
    ("newest", "created_at", false),
    ("oldest", "created_at", true),
    ("start_time", "start_at", true),
    ("end_time", "end_at", true),
    ("name_asc", "name", true),
];

const SCHEDULE_SEARCH: &[&str] = &["name", "description"];
const SCHEDULE_PROTECTED: &[&str] = &["id", "created_at", "deleted_at"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub class_id: Option<String>,
    pub start_at: Option<String>,
    pub end_at: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleFilters {
    pub class_id: Option<String>,
    /// Calendar date (YYYY-MM-DD, UTC) restricting results to one day.
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub today: i64,
    pub upcoming: i64,
}

fn schedule_indexes(s: &Schedule) -> Vec<(&'static str, Value)> {
    vec![
        ("name", Value::text(&s.name)),
        ("description", Value::opt_text(s.description.as_deref())),
        ("class_id", Value::opt_text(s.class_id.as_deref())),
        ("start_at", Value::text(&s.start_at)),
        ("end_at", Value::text(&s.end_at)),
        ("created_at", Value::text(&s.created_at)),
        ("updated_at", Value::text(&s.updated_at)),
        ("deleted_at", Value::opt_text(s.deleted_at.as_deref())),
    ]
}

/// Parse an RFC 3339 instant and re-render it in UTC. Stored instants are
/// all `+00:00` strings, so lexicographic comparison in SQL matches time
/// order regardless of the offset the client sent.
fn normalize_instant(field: &str, raw: &str) -> Result<String, ServiceError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc).to_rfc3339())
        .map_err(|_| {
            ServiceError::Validation(format!("field '{}' is not an RFC 3339 instant", field))
        })
}

fn validate_window(start: &str, end: &str) -> Result<(), ServiceError> {
    if start >= end {
        return Err(ServiceError::Validation(
            "start_at must be before end_at".into(),
        ));
    }
    Ok(())
}

fn day_bounds(date: &str) -> Result<(String, String), ServiceError> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| ServiceError::Validation(format!("invalid date filter: {:?}", date)))?;
    let start = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ServiceError::Validation(format!("invalid date filter: {:?}", date)))?
        .and_utc();
    let end = start + Duration::days(1);
    Ok((start.to_rfc3339(), end.to_rfc3339()))
}

impl PesantrenService {
    pub fn create_schedule(&self, input: ScheduleInput) -> Result<Schedule, ServiceError> {
        let name = Self::required("name", input.name.as_deref())?;
        let start_at = normalize_instant(
            "start_at",
            &Self::required("start_at", input.start_at.as_deref())?,
        )?;
        let end_at = normalize_instant(
            "end_at",
            &Self::required("end_at", input.end_at.as_deref())?,
        )?;
        validate_window(&start_at, &end_at)?;

        if let Some(class_id) = input.class_id.as_deref() {
            self.get_class(class_id).map_err(|e| match e {
                ServiceError::NotFound(_) => {
                    ServiceError::Validation(format!("class {} does not exist", class_id))
                }
                other => other,
            })?;
        }

        let now = now_rfc3339();
        let schedule = Schedule {
            id: new_id(),
            name,
            description: input.description,
            class_id: input.class_id,
            start_at,
            end_at,
            created_at: now.clone(),
            updated_at: now,
            deleted_at: None,
        };
        self.insert_record(
            "schedules",
            &schedule.id,
            &schedule,
            &schedule_indexes(&schedule),
        )?;
        Ok(schedule)
    }

    pub fn get_schedule(&self, id: &str) -> Result<Schedule, ServiceError> {
        self.get_record("schedules", "id", id)
    }

    pub fn update_schedule(
        &self,
        id: &str,
        mut patch: serde_json::Value,
    ) -> Result<Schedule, ServiceError> {
        for field in ["start_at", "end_at"] {
            if let Some(raw) = patch.get(field).and_then(|v| v.as_str()) {
                patch[field] = serde_json::json!(normalize_instant(field, raw)?);
            }
        }
        let current: Schedule = self.get_record("schedules", "id", id)?;
        let updated: Schedule = Self::apply_patch(&current, patch, SCHEDULE_PROTECTED)?;
        validate_window(&updated.start_at, &updated.end_at)?;
        self.update_record(
            "schedules",
            "id",
            id,
            &updated,
            &schedule_indexes(&updated),
        )?;
        Ok(updated)
    }

    pub fn list_schedules(
        &self,
        plan: &ListPlan,
        filters: &ScheduleFilters,
    ) -> Result<ListResult<Schedule>, ServiceError> {
        let mut spec = ListSpec::new("schedules", SCHEDULE_SEARCH);
        if let Some(class_id) = filters.class_id.as_deref() {
            spec.eq.push(("class_id", Value::text(class_id)));
        }
        if let Some(date) = filters.date.as_deref() {
            let (day_start, day_end) = day_bounds(date)?;
            spec.raw.push(("start_at >= ?", Value::Text(day_start)));
            spec.raw.push(("start_at < ?", Value::Text(day_end)));
        }
        self.run_list(&spec, plan)
    }

    pub fn schedule_stats(&self) -> Result<ScheduleStats, ServiceError> {
        let now = Utc::now();
        let today = now.date_naive().format("%Y-%m-%d").to_string();
        let (day_start, day_end) = day_bounds(&today)?;
        let live = "deleted_at IS NULL";

        Ok(ScheduleStats {
            total: self.count_where("schedules", &[], &[])?,
            active: self.count_where("schedules", &[live], &[])?,
            inactive: self.count_where("schedules", &["deleted_at IS NOT NULL"], &[])?,
            today: self.count_where(
                "schedules",
                &[live, "start_at >= ?", "start_at < ?"],
                &[Value::Text(day_start), Value::Text(day_end)],
            )?,
            upcoming: self.count_where(
                "schedules",
                &[live, "start_at >= ?"],
                &[Value::Text(now.to_rfc3339())],
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::service;
    use pondok_core::ListParams;

    fn event(name: &str, start: &str, end: &str) -> ScheduleInput {
        ScheduleInput {
            name: Some(name.into()),
            start_at: Some(start.into()),
            end_at: Some(end.into()),
            ..Default::default()
        }
    }

    fn plan() -> ListPlan {
        ListPlan::build(&ListParams::default(), SCHEDULE_SORTS)
    }

    #[test]
    fn window_must_be_forward() {
        let (_dir, svc) = service();
        let backwards = event(
            "Kajian",
            "2025-10-01T10:00:00+00:00",
            "2025-10-01T08:00:00+00:00",
        );
        assert!(matches!(
            svc.create_schedule(backwards),
            Err(ServiceError::Validation(_))
        ));

        let empty = event(
            "Kajian",
            "2025-10-01T08:00:00+00:00",
            "2025-10-01T08:00:00+00:00",
        );
        assert!(matches!(
            svc.create_schedule(empty),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn instants_normalize_to_utc() {
        let (_dir, svc) = service();
        let s = svc
            .create_schedule(event(
                "Kajian",
                "2025-10-01T15:00:00+07:00",
                "2025-10-01T17:00:00+07:00",
            ))
            .unwrap();
        assert_eq!(s.start_at, "2025-10-01T08:00:00+00:00");
        assert_eq!(s.end_at, "2025-10-01T10:00:00+00:00");
    }

    #[test]
    fn malformed_instant_is_rejected() {
        let (_dir, svc) = service();
        let bad = event("Kajian", "tomorrow", "2025-10-01T10:00:00+00:00");
        assert!(matches!(
            svc.create_schedule(bad),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn date_filter_selects_one_day() {
        let (_dir, svc) = service();
        svc.create_schedule(event(
            "Senin",
            "2025-10-06T01:00:00+00:00",
            "2025-10-06T02:00:00+00:00",
        ))
        .unwrap();
        svc.create_schedule(event(
            "Selasa",
            "2025-10-07T01:00:00+00:00",
            "2025-10-07T02:00:00+00:00",
        ))
        .unwrap();

        let filters = ScheduleFilters {
            date: Some("2025-10-06".into()),
            ..Default::default()
        };
        let found = svc.list_schedules(&plan(), &filters).unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].name, "Senin");

        let filters = ScheduleFilters {
            date: Some("06-10-2025".into()),
            ..Default::default()
        };
        assert!(matches!(
            svc.list_schedules(&plan(), &filters),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn patch_revalidates_window() {
        let (_dir, svc) = service();
        let s = svc
            .create_schedule(event(
                "Kajian",
                "2025-10-01T08:00:00+00:00",
                "2025-10-01T10:00:00+00:00",
            ))
            .unwrap();

        assert!(matches!(
            svc.update_schedule(&s.id, serde_json::json!({"end_at": "2025-10-01T07:00:00+00:00"})),
            Err(ServiceError::Validation(_))
        ));

        let moved = svc
            .update_schedule(&s.id, serde_json::json!({"end_at": "2025-10-01T18:00:00+07:00"}))
            .unwrap();
        assert_eq!(moved.end_at, "2025-10-01T11:00:00+00:00");
    }

    #[test]
    fn class_reference_is_checked() {
        let (_dir, svc) = service();
        let mut bad = event(
            "Kajian",
            "2025-10-01T08:00:00+00:00",
            "2025-10-01T10:00:00+00:00",
        );
        bad.class_id = Some("missing".into());
        assert!(matches!(
            svc.create_schedule(bad),
            Err(ServiceError::Validation(_))
        ));
    }
}
