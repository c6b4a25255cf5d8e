//! `SQLite` storage backend.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::schema::RECORD_COLUMNS;
use super::{
    clean_name, migrations, mint_id, name_key, NameRegistry, RecordFilter, RecordStore,
    RegistryEntry, RegistryKind,
};
use crate::error::{Error, Result};
use crate::record::{DocumentationRecord, Field, RecordContent};

/// Durable record store backed by `SQLite`.
///
/// Records keep the position of their first insertion; updates rewrite every
/// column except `created_at`.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<DocumentationRecord> {
        let mut content = RecordContent::default();
        for (offset, field) in Field::ALL.iter().enumerate() {
            let value: String = row.get(5 + offset)?;
            content.set(*field, value);
        }

        Ok(DocumentationRecord {
            id: row.get(0)?,
            project_id: row.get(1)?,
            developer_id: row.get(2)?,
            project_name: row.get(3)?,
            developer_name: row.get(4)?,
            content,
            created_at: parse_timestamp(row, 17)?,
            updated_at: parse_timestamp(row, 18)?,
        })
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<RegistryEntry> {
        Ok(RegistryEntry {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: parse_timestamp(row, 2)?,
        })
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl RecordStore for SqliteStore {
    fn get(&self, id: &str) -> Result<Option<DocumentationRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM documentation WHERE id = ?1"),
                [id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn find_by_pair(
        &self,
        project_id: &str,
        developer_id: &str,
    ) -> Result<Option<DocumentationRecord>> {
        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM documentation \
                     WHERE project_id = ?1 AND developer_id = ?2 \
                     ORDER BY updated_at DESC, seq DESC LIMIT 1"
                ),
                [project_id, developer_id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn upsert(&mut self, record: DocumentationRecord) -> Result<DocumentationRecord> {
        let c = &record.content;
        self.conn.execute(
            r"
            INSERT INTO documentation (
                id, project_id, developer_id, project_name, developer_name,
                description, purpose, location, dependencies, thoughts, challenges,
                assumptions, approach, alternatives, solution, summary, architecture,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            ON CONFLICT(id) DO UPDATE SET
                project_id = excluded.project_id,
                developer_id = excluded.developer_id,
                project_name = excluded.project_name,
                developer_name = excluded.developer_name,
                description = excluded.description,
                purpose = excluded.purpose,
                location = excluded.location,
                dependencies = excluded.dependencies,
                thoughts = excluded.thoughts,
                challenges = excluded.challenges,
                assumptions = excluded.assumptions,
                approach = excluded.approach,
                alternatives = excluded.alternatives,
                solution = excluded.solution,
                summary = excluded.summary,
                architecture = excluded.architecture,
                updated_at = excluded.updated_at
            ",
            params![
                record.id,
                record.project_id,
                record.developer_id,
                record.project_name,
                record.developer_name,
                c.get(Field::Description),
                c.get(Field::Purpose),
                c.get(Field::Location),
                c.get(Field::Dependencies),
                c.get(Field::Thoughts),
                c.get(Field::Challenges),
                c.get(Field::Assumptions),
                c.get(Field::Approach),
                c.get(Field::Alternatives),
                c.get(Field::Solution),
                c.get(Field::Summary),
                c.get(Field::Architecture),
                format_timestamp(record.created_at),
                format_timestamp(record.updated_at),
            ],
        )?;
        debug!(id = %record.id, "Upserted record");

        self.get(&record.id)?
            .ok_or_else(|| Error::internal(format!("record {} vanished after upsert", record.id)))
    }

    fn scan(&self, filter: &RecordFilter) -> Result<Vec<DocumentationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM documentation \
             WHERE (?1 IS NULL OR project_id = ?1) ORDER BY seq"
        ))?;

        let records = stmt
            .query_map([filter.project_id.as_deref()], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documentation", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl NameRegistry for SqliteStore {
    fn register(&mut self, kind: RegistryKind, name: &str) -> Result<RegistryEntry> {
        let name = clean_name(kind, name)?;
        let key = name_key(name);
        let kind_str = kind.to_string();

        let existing = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM registry WHERE kind = ?1 AND name_key = ?2",
                [kind_str.as_str(), key.as_str()],
                Self::row_to_entry,
            )
            .optional()?;
        if let Some(entry) = existing {
            return Ok(entry);
        }

        let entry = RegistryEntry {
            id: mint_id(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.conn.execute(
            "INSERT INTO registry (id, kind, name, name_key, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.id,
                kind_str,
                entry.name,
                key,
                format_timestamp(entry.created_at)
            ],
        )?;
        info!(%kind, id = %entry.id, name = %entry.name, "Registered name");
        Ok(entry)
    }

    fn lookup(&self, kind: RegistryKind, id: &str) -> Result<Option<RegistryEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM registry WHERE kind = ?1 AND id = ?2",
                [kind.to_string().as_str(), id],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn list(&self, kind: RegistryKind) -> Result<Vec<RegistryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, created_at FROM registry WHERE kind = ?1 ORDER BY name_key, name",
        )?;
        let entries = stmt
            .query_map([kind.to_string()], Self::row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
