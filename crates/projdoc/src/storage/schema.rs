//! `SQLite` schema definitions for projdoc.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the documentation table.
///
/// `seq` preserves first-insertion order; `id` is the opaque record identity.
pub const CREATE_DOCUMENTATION_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS documentation (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    project_id TEXT NOT NULL,
    developer_id TEXT NOT NULL,
    project_name TEXT,
    developer_name TEXT,
    description TEXT NOT NULL DEFAULT '',
    purpose TEXT NOT NULL DEFAULT '',
    location TEXT NOT NULL DEFAULT '',
    dependencies TEXT NOT NULL DEFAULT '',
    thoughts TEXT NOT NULL DEFAULT '',
    challenges TEXT NOT NULL DEFAULT '',
    assumptions TEXT NOT NULL DEFAULT '',
    approach TEXT NOT NULL DEFAULT '',
    alternatives TEXT NOT NULL DEFAULT '',
    solution TEXT NOT NULL DEFAULT '',
    summary TEXT NOT NULL DEFAULT '',
    architecture TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create an index on the (project, developer) pair.
pub const CREATE_PAIR_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_documentation_pair ON documentation(project_id, developer_id)
";

/// SQL statement to create the name registry table.
///
/// `name_key` is the trimmed, lower-cased name used for uniqueness.
pub const CREATE_REGISTRY_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS registry (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    name_key TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (kind, name_key)
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Column list shared by every record `SELECT`, in `row_to_record` order.
pub const RECORD_COLUMNS: &str = "id, project_id, developer_id, project_name, developer_name, \
    description, purpose, location, dependencies, thoughts, challenges, assumptions, approach, \
    alternatives, solution, summary, architecture, created_at, updated_at";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_DOCUMENTATION_TABLE,
    CREATE_PAIR_INDEX,
    CREATE_REGISTRY_TABLE,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_documentation_table_has_every_content_column() {
        for field in Field::ALL {
            let column = format!("{} TEXT NOT NULL", field.key());
            assert!(
                CREATE_DOCUMENTATION_TABLE.contains(&column),
                "missing column {column}"
            );
        }
    }

    #[test]
    fn test_record_columns_in_field_order() {
        let columns: Vec<&str> = RECORD_COLUMNS.split(',').map(str::trim).collect();
        assert_eq!(columns.len(), 19);
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(columns[5 + i], field.key());
        }
    }

    #[test]
    fn test_registry_table_structure() {
        assert!(CREATE_REGISTRY_TABLE.contains("UNIQUE (kind, name_key)"));
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
    }
}
