use chrono::Datelike;
use serde::{Deserialize, Serialize};

use pondok_core::{ListPlan, ListResult, ServiceError, new_id, now_rfc3339};
use pondok_sql::Value;

use crate::model::{Gender, Santri};
use crate::nis::{self, NisError};

use super::query::ListSpec;
use super::{PesantrenService, map_store_error};

/// Sort keys accepted for santri and registrant lists.
pub const SANTRI_SORTS: &[(&str, &'static str, bool)] = &[
    ("newest", "created_at", false),
    ("oldest", "created_at", true),
    ("name_asc", "full_name", true),
    ("name_desc", "full_name", false),
];

/// How many times registration retries after losing an NIS race to a
/// concurrent insert.
const NIS_INSERT_ATTEMPTS: u32 = 3;

const SANTRI_SEARCH: &[&str] = &["full_name", "nis", "address"];

/// Fields a patch can never change on a santri record.
const SANTRI_PROTECTED: &[&str] = &["id", "nis", "created_at", "accepted_at", "deleted_at"];

/// Incoming santri payload, shared by public registration and admin create.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SantriInput {
    pub full_name: Option<String>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub class_id: Option<String>,
    pub birth_place_date: Option<String>,
    pub phone_number: Option<String>,
    pub nik: Option<String>,
    pub no_kk: Option<String>,
    pub nisn: Option<String>,
    pub no_kip: Option<String>,
    pub no_pkh: Option<String>,
    pub no_kks: Option<String>,
    pub rt_rw: Option<String>,
    pub kecamatan: Option<String>,
    pub kabupaten: Option<String>,
    pub provinsi: Option<String>,
    pub kode_pos: Option<String>,
    pub pendidikan_sd: Option<String>,
    pub pendidikan_smp: Option<String>,
    pub pendidikan_sma: Option<String>,
    pub pendidikan_non_formal: Option<String>,
    pub hafal_quran: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SantriStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub registrants: i64,
    pub male: i64,
    pub female: i64,
}

fn nis_error(e: NisError) -> ServiceError {
    match e {
        NisError::SequenceExhausted => {
            ServiceError::Conflict("nis sequence exhausted for this month".into())
        }
        NisError::InvalidFormat(s) => {
            ServiceError::Internal(format!("stored nis is malformed: {}", s))
        }
    }
}

fn santri_indexes(s: &Santri) -> Vec<(&'static str, Value)> {
    vec![
        ("nis", Value::text(&s.nis)),
        ("full_name", Value::text(&s.full_name)),
        ("gender", Value::text(s.gender.as_str())),
        ("address", Value::text(&s.address)),
        ("class_id", Value::opt_text(s.class_id.as_deref())),
        ("accepted_at", Value::opt_text(s.accepted_at.as_deref())),
        ("created_at", Value::text(&s.created_at)),
        ("updated_at", Value::text(&s.updated_at)),
        ("deleted_at", Value::opt_text(s.deleted_at.as_deref())),
    ]
}

impl PesantrenService {
    /// Next free NIS sequence for a month prefix: last issued code + 1.
    ///
    /// Zero-padded codes order lexicographically, so MAX(nis) under the
    /// prefix carries the highest sequence. Soft-deleted rows keep their
    /// NIS reserved; a lookup failure propagates rather than silently
    /// restarting the sequence.
    pub fn next_nis_sequence_for(&self, prefix: &str) -> Result<u32, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT MAX(nis) AS last FROM santris WHERE nis LIKE ?",
                &[Value::Text(format!("{}%", prefix))],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        match rows.first().and_then(|r| r.get_str("last")) {
            Some(last) => Ok(nis::extract_sequence(last).map_err(nis_error)? + 1),
            None => Ok(1),
        }
    }

    /// Next free NIS sequence for the current month.
    pub fn next_nis_sequence(&self) -> Result<u32, ServiceError> {
        let now = chrono::Utc::now();
        self.next_nis_sequence_for(&nis::month_prefix(now.year(), now.month()))
    }

    /// Create a santri record, allocating the next NIS for the current
    /// month. `accepted` distinguishes admin create (already on the
    /// roster) from public registration (pending registrant).
    ///
    /// Allocation is read-then-insert; the UNIQUE index on `nis` is the
    /// arbiter under concurrency, and a lost race retries with a fresh
    /// sequence a bounded number of times.
    pub fn register_santri(
        &self,
        input: SantriInput,
        accepted: bool,
    ) -> Result<Santri, ServiceError> {
        let full_name = Self::required("full_name", input.full_name.as_deref())?;
        let gender = input
            .gender
            .ok_or_else(|| ServiceError::Validation("field 'gender' is required".into()))?;
        let address = Self::required("address", input.address.as_deref())?;

        if let Some(class_id) = input.class_id.as_deref() {
            self.require_active_class(class_id)?;
        }

        let now = chrono::Utc::now();
        let prefix = nis::month_prefix(now.year(), now.month());

        let mut last_err = ServiceError::Internal("nis allocation did not run".into());
        for _ in 0..NIS_INSERT_ATTEMPTS {
            let seq = self.next_nis_sequence_for(&prefix)?;
            let code = nis::generate_nis(seq, now.year(), now.month()).map_err(nis_error)?;

            let stamp = now_rfc3339();
            let santri = Santri {
                id: new_id(),
                nis: code,
                full_name: full_name.clone(),
                gender,
                address: address.clone(),
                image_url: input.image_url.clone(),
                class_id: input.class_id.clone(),
                birth_place_date: input.birth_place_date.clone(),
                phone_number: input.phone_number.clone(),
                nik: input.nik.clone(),
                no_kk: input.no_kk.clone(),
                nisn: input.nisn.clone(),
                no_kip: input.no_kip.clone(),
                no_pkh: input.no_pkh.clone(),
                no_kks: input.no_kks.clone(),
                rt_rw: input.rt_rw.clone(),
                kecamatan: input.kecamatan.clone(),
                kabupaten: input.kabupaten.clone(),
                provinsi: input.provinsi.clone(),
                kode_pos: input.kode_pos.clone(),
                pendidikan_sd: input.pendidikan_sd.clone(),
                pendidikan_smp: input.pendidikan_smp.clone(),
                pendidikan_sma: input.pendidikan_sma.clone(),
                pendidikan_non_formal: input.pendidikan_non_formal.clone(),
                hafal_quran: input.hafal_quran.clone(),
                accepted_at: accepted.then(|| stamp.clone()),
                created_at: stamp.clone(),
                updated_at: stamp,
                deleted_at: None,
            };

            match self.insert_record("santris", &santri.id, &santri, &santri_indexes(&santri)) {
                Ok(()) => return Ok(santri),
                Err(ServiceError::Conflict(msg)) => {
                    tracing::debug!(nis = %santri.nis, "nis race lost, retrying");
                    last_err = ServiceError::Conflict(msg);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err)
    }

    pub fn get_santri(&self, id: &str) -> Result<Santri, ServiceError> {
        self.get_record("santris", "id", id)
    }

    /// Patch a santri. NIS, acceptance state, and lifecycle stamps are
    /// immutable through this path.
    pub fn update_santri(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Santri, ServiceError> {
        let current: Santri = self.get_record("santris", "id", id)?;
        let updated: Santri = Self::apply_patch(&current, patch, SANTRI_PROTECTED)?;

        if updated.class_id != current.class_id {
            if let Some(class_id) = updated.class_id.as_deref() {
                self.require_active_class(class_id)?;
            }
        }

        self.update_record("santris", "id", id, &updated, &santri_indexes(&updated))?;
        Ok(updated)
    }

    /// Assign a santri to a class (or unassign with None).
    pub fn assign_class(
        &self,
        id: &str,
        class_id: Option<String>,
    ) -> Result<Santri, ServiceError> {
        let mut santri: Santri = self.get_record("santris", "id", id)?;
        if let Some(class_id) = class_id.as_deref() {
            self.require_active_class(class_id)?;
        }
        santri.class_id = class_id;
        santri.updated_at = now_rfc3339();
        self.update_record("santris", "id", id, &santri, &santri_indexes(&santri))?;
        Ok(santri)
    }

    /// List accepted santris. Pending registrants never appear here.
    pub fn list_santris(
        &self,
        plan: &ListPlan,
        gender: Option<&str>,
        class_id: Option<&str>,
    ) -> Result<ListResult<Santri>, ServiceError> {
        let mut spec = ListSpec::new("santris", SANTRI_SEARCH);
        spec.raw_no_param.push("accepted_at IS NOT NULL");
        if let Some(g) = gender {
            spec.eq.push(("gender", Value::text(g)));
        }
        if let Some(c) = class_id {
            spec.eq.push(("class_id", Value::text(c)));
        }
        self.run_list(&spec, plan)
    }

    /// List pending registrants.
    pub fn list_registrants(&self, plan: &ListPlan) -> Result<ListResult<Santri>, ServiceError> {
        let mut spec = ListSpec::new("santris", SANTRI_SEARCH);
        spec.raw_no_param.push("accepted_at IS NULL");
        self.run_list(&spec, plan)
    }

    /// Accept a pending registrant into the roster. One-directional: a
    /// second accept is a conflict, enforced by the guarded UPDATE even
    /// under concurrent calls.
    pub fn accept_registrant(&self, id: &str) -> Result<Santri, ServiceError> {
        let mut santri: Santri = self.get_record("santris", "id", id)?;
        if santri.accepted_at.is_some() {
            return Err(ServiceError::Conflict(format!(
                "registrant {} is already accepted",
                id
            )));
        }

        let now = now_rfc3339();
        santri.accepted_at = Some(now.clone());
        santri.updated_at = now.clone();
        let json = serde_json::to_string(&santri)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let affected = self
            .sql
            .exec(
                "UPDATE santris SET data = ?, accepted_at = ?, updated_at = ? \
                 WHERE id = ? AND accepted_at IS NULL",
                &[
                    Value::Text(json),
                    Value::text(&now),
                    Value::text(&now),
                    Value::text(id),
                ],
            )
            .map_err(map_store_error)?;
        if affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "registrant {} is already accepted",
                id
            )));
        }
        Ok(santri)
    }

    pub fn santri_stats(&self) -> Result<SantriStats, ServiceError> {
        let accepted = "accepted_at IS NOT NULL";
        let live = "deleted_at IS NULL";
        Ok(SantriStats {
            total: self.count_where("santris", &[accepted], &[])?,
            active: self.count_where("santris", &[accepted, live], &[])?,
            inactive: self.count_where("santris", &[accepted, "deleted_at IS NOT NULL"], &[])?,
            registrants: self.count_where("santris", &["accepted_at IS NULL", live], &[])?,
            male: self.count_where(
                "santris",
                &[accepted, live, "gender = ?"],
                &[Value::text("male")],
            )?,
            female: self.count_where(
                "santris",
                &[accepted, live, "gender = ?"],
                &[Value::text("female")],
            )?,
        })
    }

    fn require_active_class(&self, class_id: &str) -> Result<(), ServiceError> {
        let doc = self.get_doc("classes", "id", class_id).map_err(|e| match e {
            ServiceError::NotFound(_) => {
                ServiceError::Validation(format!("class {} does not exist", class_id))
            }
            other => other,
        })?;
        if doc.get("deleted_at").map_or(false, |v| !v.is_null()) {
            return Err(ServiceError::Validation(format!(
                "class {} is in trash",
                class_id
            )));
        }
        Ok(())
    }
}
