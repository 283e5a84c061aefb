use thiserror::Error;

/// Failures surfaced by a `SqlStore` backend.
#[derive(Error, Debug)]
pub enum SqlError {
    /// Opening the database or applying connection pragmas failed.
    #[error("sql open error: {0}")]
    Open(String),

    /// A read statement failed to prepare, bind, or map rows.
    #[error("sql query error: {0}")]
    Query(String),

    /// A write statement failed; constraint violations surface here with
    /// the engine's message intact (e.g. "UNIQUE constraint failed").
    #[error("sql exec error: {0}")]
    Exec(String),
}
