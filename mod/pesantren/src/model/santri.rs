use serde::{Deserialize, Serialize};

/// Santri gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Santri — a student/resident record in the roster.
///
/// `accepted_at == None` marks a pending registrant; acceptance sets the
/// timestamp and is one-directional. `deleted_at` drives the soft-delete
/// lifecycle shared by every entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Santri {
    pub id: String,

    /// Unique student code, format `YYYY.MM.SSSSS`.
    pub nis: String,

    pub full_name: String,

    pub gender: Gender,

    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Reference to the class this santri is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,

    // ── Demographic / administrative fields ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_place_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nik: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_kk: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nisn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_kip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_pkh: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_kks: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rt_rw: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kecamatan: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kabupaten: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provinsi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kode_pos: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pendidikan_sd: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pendidikan_smp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pendidikan_sma: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pendidikan_non_formal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hafal_quran: Option<String>,

    /// Set when the registrant is accepted into the roster.
    #[serde(default)]
    pub accepted_at: Option<String>,

    pub created_at: String,

    pub updated_at: String,

    #[serde(default)]
    pub deleted_at: Option<String>,
}
