use crate::error::SqlError;

/// A dynamically-typed SQL parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Text value from anything string-like.
    pub fn text(s: impl Into<String>) -> Value {
        Value::Text(s.into())
    }

    /// Text value from an optional string, mapping `None` to SQL NULL.
    pub fn opt_text(s: Option<&str>) -> Value {
        match s {
            Some(s) => Value::Text(s.to_string()),
            None => Value::Null,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// A row returned from a SQL query — column name to value.
#[derive(Debug, Clone)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    /// Get a column value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a text column value by name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get an integer column value by name.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }
}

/// SqlStore provides a SQL execution interface backed by an embedded
/// database. Record tables keep the full JSON document in a `data` column
/// with extracted columns for filtering and uniqueness; this trait stays
/// agnostic of that convention.
pub trait SqlStore: Send + Sync {
    /// Execute a query and return rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SqlError>;

    /// Execute a statement (INSERT/UPDATE/DELETE) and return affected row count.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SqlError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_accessors() {
        let row = Row {
            columns: vec![
                ("name".into(), Value::Text("Ahmad".into())),
                ("cnt".into(), Value::Integer(3)),
                ("gone".into(), Value::Null),
            ],
        };
        assert_eq!(row.get_str("name"), Some("Ahmad"));
        assert_eq!(row.get_i64("cnt"), Some(3));
        assert_eq!(row.get_str("cnt"), None);
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get("gone"), Some(&Value::Null));
    }

    #[test]
    fn value_helpers() {
        assert_eq!(Value::opt_text(None), Value::Null);
        assert_eq!(Value::opt_text(Some("x")), Value::Text("x".into()));
        assert_eq!(Value::from(7), Value::Integer(7));
    }
}
