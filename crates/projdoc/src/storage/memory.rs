//! In-memory storage backend.

use std::collections::HashMap;

use chrono::Utc;
use tracing::debug;

use super::{
    clean_name, mint_id, name_key, sort_entries, NameRegistry, RecordFilter, RecordStore,
    RegistryEntry, RegistryKind,
};
use crate::error::Result;
use crate::record::DocumentationRecord;

/// Insertion-ordered, process-local store.
///
/// Nothing survives the process. Useful for tests and for one-off report runs
/// fed entirely from a client batch.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<DocumentationRecord>,
    index: HashMap<String, usize>,
    projects: Vec<RegistryEntry>,
    developers: Vec<RegistryEntry>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self, kind: RegistryKind) -> &Vec<RegistryEntry> {
        match kind {
            RegistryKind::Project => &self.projects,
            RegistryKind::Developer => &self.developers,
        }
    }

    fn entries_mut(&mut self, kind: RegistryKind) -> &mut Vec<RegistryEntry> {
        match kind {
            RegistryKind::Project => &mut self.projects,
            RegistryKind::Developer => &mut self.developers,
        }
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, id: &str) -> Result<Option<DocumentationRecord>> {
        Ok(self.index.get(id).map(|&pos| self.records[pos].clone()))
    }

    fn find_by_pair(
        &self,
        project_id: &str,
        developer_id: &str,
    ) -> Result<Option<DocumentationRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.matches_pair(project_id, developer_id))
            .max_by_key(|r| r.updated_at)
            .cloned())
    }

    fn upsert(&mut self, mut record: DocumentationRecord) -> Result<DocumentationRecord> {
        if let Some(&pos) = self.index.get(&record.id) {
            record.created_at = self.records[pos].created_at;
            self.records[pos] = record.clone();
            debug!(id = %record.id, "Updated record in memory");
        } else {
            self.index.insert(record.id.clone(), self.records.len());
            self.records.push(record.clone());
            debug!(id = %record.id, "Inserted record in memory");
        }
        Ok(record)
    }

    fn scan(&self, filter: &RecordFilter) -> Result<Vec<DocumentationRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}

impl NameRegistry for MemoryStore {
    fn register(&mut self, kind: RegistryKind, name: &str) -> Result<RegistryEntry> {
        let name = clean_name(kind, name)?;
        let key = name_key(name);
        if let Some(existing) = self.entries(kind).iter().find(|e| name_key(&e.name) == key) {
            return Ok(existing.clone());
        }

        let entry = RegistryEntry {
            id: mint_id(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.entries_mut(kind).push(entry.clone());
        debug!(%kind, id = %entry.id, "Registered name in memory");
        Ok(entry)
    }

    fn lookup(&self, kind: RegistryKind, id: &str) -> Result<Option<RegistryEntry>> {
        Ok(self.entries(kind).iter().find(|e| e.id == id).cloned())
    }

    fn list(&self, kind: RegistryKind) -> Result<Vec<RegistryEntry>> {
        let mut entries = self.entries(kind).clone();
        sort_entries(&mut entries);
        Ok(entries)
    }
}
