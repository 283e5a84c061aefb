use serde::de::DeserializeOwned;

use pondok_core::{ListPlan, ListResult, ServiceError};
use pondok_sql::Value;

use super::PesantrenService;

/// A declarative list query over one record table.
///
/// Handlers fill in the static shape (table, searchable columns) and the
/// per-request filters; [`PesantrenService::run_list`] assembles the WHERE
/// clause. Column names always come from code, never from user input —
/// only bind parameters carry request data.
pub(crate) struct ListSpec<'a> {
    pub table: &'a str,
    /// Columns matched by the case-insensitive search term, OR-ed together.
    pub search_fields: &'a [&'a str],
    /// Exact-match filters.
    pub eq: Vec<(&'static str, Value)>,
    /// Extra clauses with exactly one bind parameter each.
    pub raw: Vec<(&'static str, Value)>,
    /// Extra clauses with no parameters.
    pub raw_no_param: Vec<&'static str>,
}

impl<'a> ListSpec<'a> {
    pub fn new(table: &'a str, search_fields: &'a [&'a str]) -> Self {
        ListSpec {
            table,
            search_fields,
            eq: Vec::new(),
            raw: Vec::new(),
            raw_no_param: Vec::new(),
        }
    }
}

impl PesantrenService {
    /// Execute a paginated list: one COUNT over the full predicate, then
    /// one page SELECT with the same predicate. `total` therefore always
    /// reflects the filtered set, not the page.
    pub(crate) fn run_list<T: DeserializeOwned>(
        &self,
        spec: &ListSpec<'_>,
        plan: &ListPlan,
    ) -> Result<ListResult<T>, ServiceError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if !plan.include_deleted {
            clauses.push("deleted_at IS NULL".into());
        }
        for clause in &spec.raw_no_param {
            clauses.push((*clause).into());
        }
        for (clause, value) in &spec.raw {
            clauses.push((*clause).into());
            params.push(value.clone());
        }
        for (col, value) in &spec.eq {
            clauses.push(format!("{} = ?", col));
            params.push(value.clone());
        }
        if let Some(term) = &plan.search {
            let pattern = format!("%{}%", term.to_lowercase());
            let ors: Vec<String> = spec
                .search_fields
                .iter()
                .map(|field| {
                    params.push(Value::Text(pattern.clone()));
                    format!("LOWER({}) LIKE ?", field)
                })
                .collect();
            clauses.push(format!("({})", ors.join(" OR ")));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) AS cnt FROM {}{}", spec.table, where_sql);
        let rows = self
            .sql
            .query(&count_sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0);

        let page_sql = format!(
            "SELECT data FROM {}{} ORDER BY {} {} LIMIT ? OFFSET ?",
            spec.table,
            where_sql,
            plan.order.column,
            if plan.order.ascending { "ASC" } else { "DESC" },
        );
        params.push(Value::Integer(plan.limit));
        params.push(Value::Integer(plan.offset()));

        let rows = self
            .sql
            .query(&page_sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let item =
                serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))?;
            items.push(item);
        }

        Ok(ListResult::new(items, total, plan))
    }
}
