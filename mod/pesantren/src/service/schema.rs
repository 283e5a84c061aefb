use pondok_core::ServiceError;
use pondok_sql::SqlStore;

/// DDL for the pesantren record tables. Every table keeps the full JSON
/// document in `data` plus extracted columns used by filters, sorts, and
/// UNIQUE constraints.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS santris (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        nis TEXT NOT NULL UNIQUE,
        full_name TEXT NOT NULL,
        gender TEXT NOT NULL,
        address TEXT NOT NULL,
        class_id TEXT,
        accepted_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_santris_deleted ON santris (deleted_at)",
    "CREATE INDEX IF NOT EXISTS idx_santris_gender ON santris (gender)",
    "CREATE INDEX IF NOT EXISTS idx_santris_class ON santris (class_id)",
    "CREATE TABLE IF NOT EXISTS blogs (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        description TEXT,
        content TEXT NOT NULL,
        category TEXT NOT NULL,
        tags TEXT NOT NULL DEFAULT '[]',
        author_id TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_blogs_deleted ON blogs (deleted_at)",
    "CREATE INDEX IF NOT EXISTS idx_blogs_category ON blogs (category)",
    "CREATE TABLE IF NOT EXISTS classes (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_classes_deleted ON classes (deleted_at)",
    "CREATE TABLE IF NOT EXISTS schedules (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        class_id TEXT,
        start_at TEXT NOT NULL,
        end_at TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_schedules_deleted ON schedules (deleted_at)",
    "CREATE INDEX IF NOT EXISTS idx_schedules_start ON schedules (start_at)",
    "CREATE TABLE IF NOT EXISTS carousel_images (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        title TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_carousel_deleted ON carousel_images (deleted_at)",
];

pub(crate) fn init_schema(sql: &dyn SqlStore) -> Result<(), ServiceError> {
    for ddl in SCHEMA {
        sql.exec(ddl, &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
    }
    Ok(())
}
