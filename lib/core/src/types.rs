use serde::Deserialize;

/// Default page size when the request supplies none.
pub const DEFAULT_LIMIT: i64 = 10;

/// Hard cap on the page size to keep result sets bounded.
pub const MAX_LIMIT: i64 = 100;

/// Raw list/query parameters as they arrive on the wire.
///
/// Everything is an optional string: clients send query parameters, and
/// malformed values (`page=abc`, `limit=-3`) must clamp to defaults rather
/// than fail the request. [`ListPlan::build`] performs the normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: Option<String>,

    #[serde(default)]
    pub limit: Option<String>,

    /// Case-insensitive substring search.
    #[serde(default)]
    pub search: Option<String>,

    /// Sort key, enumerated per resource. Unknown values fall back to newest.
    #[serde(default, rename = "sortBy")]
    pub sort_by: Option<String>,

    /// Include soft-deleted rows. Accepts the truthy forms "true" and "1".
    #[serde(default, rename = "includeDeleted")]
    pub include_deleted: Option<String>,
}

/// A single ORDER BY term. Columns come from the per-resource sort table,
/// never from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: &'static str,
    pub ascending: bool,
}

impl SortOrder {
    /// Default ordering: newest first.
    pub const NEWEST: SortOrder = SortOrder {
        column: "created_at",
        ascending: false,
    };
}

/// A validated, normalized query plan derived from [`ListParams`].
#[derive(Debug, Clone)]
pub struct ListPlan {
    pub page: i64,
    pub limit: i64,
    pub include_deleted: bool,
    pub search: Option<String>,
    pub order: SortOrder,
}

impl ListPlan {
    /// Normalize raw parameters against a per-resource sort table.
    ///
    /// `sorts` maps a `sortBy` key to `(column, ascending)`; an absent or
    /// unrecognized key falls back to `created_at DESC`.
    pub fn build(params: &ListParams, sorts: &[(&str, &'static str, bool)]) -> ListPlan {
        let page = parse_clamped(params.page.as_deref(), 1);
        let limit = parse_clamped(params.limit.as_deref(), DEFAULT_LIMIT).min(MAX_LIMIT);

        let include_deleted = params
            .include_deleted
            .as_deref()
            .map(truthy)
            .unwrap_or(false);

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        let order = params
            .sort_by
            .as_deref()
            .and_then(|key| {
                sorts
                    .iter()
                    .find(|(k, _, _)| *k == key)
                    .map(|(_, column, ascending)| SortOrder {
                        column,
                        ascending: *ascending,
                    })
            })
            .unwrap_or(SortOrder::NEWEST);

        ListPlan {
            page,
            limit,
            include_deleted,
            search,
            order,
        }
    }

    /// Zero-based row offset of the first row on this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// The sort key that was applied, for echoing back in responses.
    pub fn sort_label(&self, sorts: &[(&str, &'static str, bool)]) -> String {
        sorts
            .iter()
            .find(|(_, column, ascending)| {
                *column == self.order.column && *ascending == self.order.ascending
            })
            .map(|(key, _, _)| (*key).to_string())
            .unwrap_or_else(|| "newest".to_string())
    }
}

/// Result of a paginated list query.
#[derive(Debug, Clone)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> ListResult<T> {
    pub fn new(items: Vec<T>, total: i64, plan: &ListPlan) -> Self {
        ListResult {
            items,
            total,
            page: plan.page,
            limit: plan.limit,
            total_pages: total_pages(total, plan.limit),
        }
    }
}

/// `ceil(total / limit)`; zero when the result set is empty.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Lenient boolean parsing for query parameters: "true" and "1" (in any
/// case) are true, everything else is false.
pub fn truthy(value: &str) -> bool {
    let v = value.trim();
    v.eq_ignore_ascii_case("true") || v == "1"
}

fn parse_clamped(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Merge a JSON patch into a base value.
///
/// For each key in `patch`:
/// - If the value is `null`, the key is removed from `base`.
/// - Otherwise, the key is set to the patch value.
///
/// This follows RFC 7386 (JSON Merge Patch) semantics.
pub fn merge_patch(base: &mut serde_json::Value, patch: &serde_json::Value) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            if value.is_null() {
                base_obj.remove(key);
            } else if value.is_object() {
                let entry = base_obj
                    .entry(key.clone())
                    .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
                merge_patch(entry, value);
            } else {
                base_obj.insert(key.clone(), value.clone());
            }
        }
    } else {
        *base = patch.clone();
    }
}
