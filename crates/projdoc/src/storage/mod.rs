//! Storage layer for projdoc.
//!
//! The engine talks to storage through two narrow traits:
//!
//! - [`RecordStore`]: documentation records keyed by identity, with lookup,
//!   upsert, and ordered scan.
//! - [`NameRegistry`]: the project and developer name registries that supply
//!   display names and alphabetical ordering.
//!
//! Two backends implement both: [`MemoryStore`] for tests and ephemeral runs,
//! and [`SqliteStore`] for durable storage.

pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::DocumentationRecord;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Mint a fresh opaque identifier.
#[must_use]
pub fn mint_id() -> String {
    ulid::Ulid::new().to_string()
}

/// Restricts which records a [`RecordStore::scan`] returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Only records for this project.
    pub project_id: Option<String>,
}

impl RecordFilter {
    /// A filter that matches every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter that matches one project.
    #[must_use]
    pub fn project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
        }
    }

    /// Whether `record` passes this filter.
    #[must_use]
    pub fn matches(&self, record: &DocumentationRecord) -> bool {
        self.project_id
            .as_deref()
            .map_or(true, |p| record.project_id == p)
    }
}

/// Key-value collection of documentation records.
///
/// Writes are visible to later reads on the same store. `scan` returns records
/// in first-insertion order; an update keeps the record's original position.
pub trait RecordStore {
    /// Get a record by its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing collection is unavailable.
    fn get(&self, id: &str) -> Result<Option<DocumentationRecord>>;

    /// Get the current record for a (project, developer) pair.
    ///
    /// When several records share the pair, the most recently updated wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing collection is unavailable.
    fn find_by_pair(
        &self,
        project_id: &str,
        developer_id: &str,
    ) -> Result<Option<DocumentationRecord>>;

    /// Insert or replace the record stored under `record.id`.
    ///
    /// An existing record keeps its `created_at`. Returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing collection is unavailable.
    fn upsert(&mut self, record: DocumentationRecord) -> Result<DocumentationRecord>;

    /// All records passing `filter`, in first-insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing collection is unavailable.
    fn scan(&self, filter: &RecordFilter) -> Result<Vec<DocumentationRecord>>;

    /// Total number of stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing collection is unavailable.
    fn count(&self) -> Result<usize> {
        Ok(self.scan(&RecordFilter::all())?.len())
    }
}

/// Which name registry an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryKind {
    /// Projects being documented.
    Project,
    /// Contributors writing documentation.
    Developer,
}

impl std::fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Developer => write!(f, "developer"),
        }
    }
}

/// A named entry in a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    /// Opaque identifier.
    pub id: String,
    /// Display name, trimmed.
    pub name: String,
    /// When the entry was registered.
    pub created_at: DateTime<Utc>,
}

/// Project and developer name registries.
pub trait NameRegistry {
    /// Register `name`, or return the entry that already carries it.
    ///
    /// Names are trimmed and compared case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, or a store error if the
    /// backing collection is unavailable.
    fn register(&mut self, kind: RegistryKind, name: &str) -> Result<RegistryEntry>;

    /// Look up an entry by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing collection is unavailable.
    fn lookup(&self, kind: RegistryKind, id: &str) -> Result<Option<RegistryEntry>>;

    /// All entries, sorted alphabetically.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing collection is unavailable.
    fn list(&self, kind: RegistryKind) -> Result<Vec<RegistryEntry>>;
}

/// Case-folded key used for name uniqueness and ordering.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trim a registry name, rejecting blanks.
///
/// # Errors
///
/// Returns a validation error if nothing remains after trimming.
pub fn clean_name(kind: RegistryKind, name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(crate::error::Error::validation(format!(
            "{kind} name is required"
        )));
    }
    Ok(trimmed)
}

/// Sort entries alphabetically, case-insensitive first, then exact name.
pub fn sort_entries(entries: &mut [RegistryEntry]) {
    entries.sort_by(|a, b| {
        name_key(&a.name)
            .cmp(&name_key(&b.name))
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PartialRecord;

    fn entry(name: &str) -> RegistryEntry {
        RegistryEntry {
            id: mint_id(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_mint_id_is_unique() {
        assert_ne!(mint_id(), mint_id());
        assert_eq!(mint_id().len(), 26);
    }

    #[test]
    fn test_filter_matches() {
        let now = Utc::now();
        let record = PartialRecord::for_pair("p1", "d1")
            .into_record("r".to_string(), now, now)
            .unwrap();
        assert!(RecordFilter::all().matches(&record));
        assert!(RecordFilter::project("p1").matches(&record));
        assert!(!RecordFilter::project("p2").matches(&record));
    }

    #[test]
    fn test_sort_entries_case_insensitive() {
        let mut entries = vec![entry("beta"), entry("Alpha"), entry("alpha"), entry("Gamma")];
        sort_entries(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "alpha", "beta", "Gamma"]);
    }

    #[test]
    fn test_name_key_trims_and_folds() {
        assert_eq!(name_key("  Apollo "), "apollo");
    }

    #[test]
    fn test_registry_kind_display() {
        assert_eq!(RegistryKind::Project.to_string(), "project");
        assert_eq!(RegistryKind::Developer.to_string(), "developer");
    }
}
