//! The documentation service.
//!
//! [`DocumentationService`] is the boundary the CLI (or any other transport)
//! talks to. It ties identity resolution, the record store, the merge step and
//! the report compiler together. Every report is fully resolved and rendered
//! in memory before it is handed back, so a failure never leaves a partial
//! document behind.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::identity::{self, Resolution};
use crate::merge::{self, Scope};
use crate::record::{DocumentationRecord, PartialRecord};
use crate::report::{layout, CompiledReport, ReportCompiler};
use crate::storage::{NameRegistry, RecordFilter, RecordStore, RegistryEntry, RegistryKind};

/// Source of "now" for record timestamps.
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Record writes, lookups and report compilation over one store.
pub struct DocumentationService<S> {
    store: S,
    compiler: ReportCompiler,
    clock: Clock,
}

impl<S> std::fmt::Debug for DocumentationService<S>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentationService")
            .field("store", &self.store)
            .field("compiler", &self.compiler)
            .finish_non_exhaustive()
    }
}

impl<S> DocumentationService<S>
where
    S: RecordStore + NameRegistry,
{
    /// Create a service over `store` using the report settings in `report`.
    pub fn new(store: S, report: &ReportConfig) -> Self {
        Self {
            store,
            compiler: report.compiler(),
            clock: Box::new(Utc::now),
        }
    }

    /// Replace the clock used to stamp records.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the service and return its store.
    pub fn into_store(self) -> S {
        self.store
    }

    fn registry_name(&self, kind: RegistryKind, id: &str) -> Result<Option<String>> {
        Ok(self.store.lookup(kind, id)?.map(|entry| entry.name))
    }

    /// Fill display names the candidate left out from the registries.
    fn fill_names(
        &self,
        candidate: &mut PartialRecord,
        project_id: &str,
        developer_id: &str,
    ) -> Result<()> {
        if candidate.project_name.is_none() {
            candidate.project_name = self.registry_name(RegistryKind::Project, project_id)?;
        }
        if candidate.developer_name.is_none() {
            candidate.developer_name = self.registry_name(RegistryKind::Developer, developer_id)?;
        }
        Ok(())
    }

    /// Create a record or update the one the candidate resolves to.
    ///
    /// Missing display names are filled from the registries. On update the
    /// stored `projectId`/`developerId` are kept even if the payload names
    /// different ones; in that case the stored display names are kept too.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either foreign key is missing, or a
    /// store error if the write fails.
    pub fn create_or_update_record(
        &mut self,
        mut candidate: PartialRecord,
    ) -> Result<DocumentationRecord> {
        let resolution = identity::resolve(&self.store, &candidate)?;
        let now = (self.clock)();

        let (project_id, developer_id) = candidate.require_pair()?;
        let (project_id, developer_id) = (project_id.to_string(), developer_id.to_string());

        let record = match resolution {
            Resolution::Existing(existing) => {
                if existing.matches_pair(&project_id, &developer_id) {
                    self.fill_names(&mut candidate, &existing.project_id, &existing.developer_id)?;
                } else {
                    warn!(
                        id = %existing.id,
                        stored_project = %existing.project_id,
                        stored_developer = %existing.developer_id,
                        project_id,
                        developer_id,
                        "Ignoring association change on existing record"
                    );
                    // Labels sent for the other pair would misattribute the record.
                    candidate.project_name = None;
                    candidate.developer_name = None;
                }
                candidate.overlay(&existing, now)
            }
            Resolution::New { id, caller_supplied } => {
                debug!(%id, caller_supplied, "Creating record");
                self.fill_names(&mut candidate, &project_id, &developer_id)?;
                candidate.into_record(id, now, now)?
            }
        };

        let stored = self.store.upsert(record)?;
        info!(
            id = %stored.id,
            project_id = %stored.project_id,
            developer_id = %stored.developer_id,
            answered = stored.content.answered(),
            "Saved documentation record"
        );
        Ok(stored)
    }

    /// The current record for a (project, developer) pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for blank ids, [`Error::NotFound`] if no
    /// record exists, or a store error.
    pub fn get_record(&self, project_id: &str, developer_id: &str) -> Result<DocumentationRecord> {
        let (project_id, developer_id) =
            PartialRecord::for_pair(project_id, developer_id).require_pair().map(
                |(p, d)| (p.to_string(), d.to_string()),
            )?;
        self.store
            .find_by_pair(&project_id, &developer_id)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "record for project {project_id} and developer {developer_id}"
                ))
            })
    }

    /// All records, or those of one project, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a store error if the scan fails.
    pub fn list_records(&self, project_id: Option<&str>) -> Result<Vec<DocumentationRecord>> {
        let filter = match project_id.map(str::trim).filter(|p| !p.is_empty()) {
            Some(project_id) => RecordFilter::project(project_id),
            None => RecordFilter::all(),
        };
        self.store.scan(&filter)
    }

    /// Drop batch entries whose id names a stored record of another project.
    ///
    /// A stored record's project never changes, so such an entry is that
    /// record's copy and belongs to the other project's report.
    fn exclude_foreign(
        &self,
        project_id: &str,
        incoming: Vec<PartialRecord>,
    ) -> Result<Vec<PartialRecord>> {
        let mut kept = Vec::with_capacity(incoming.len());
        for candidate in incoming {
            if let Some(id) = candidate.explicit_id() {
                if let Some(stored) = self.store.get(id)? {
                    if stored.project_id != project_id {
                        debug!(
                            id,
                            stored_project = %stored.project_id,
                            "Skipping incoming record owned by another project"
                        );
                        continue;
                    }
                }
            }
            kept.push(candidate);
        }
        Ok(kept)
    }

    /// Compile the report for one project, merging in a client-held batch.
    ///
    /// The display name comes from `display_name`, then the project registry,
    /// then the records themselves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the project has no resolvable name and
    /// no records, or a store/PDF error.
    pub fn compile_single_project_report(
        &self,
        project_id: &str,
        display_name: Option<&str>,
        incoming: Vec<PartialRecord>,
    ) -> Result<CompiledReport> {
        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(Error::validation("projectId is required"));
        }

        let stored = self.store.scan(&RecordFilter::project(project_id))?;
        let incoming = self.exclude_foreign(project_id, incoming)?;
        let records = merge::merge(
            stored,
            incoming,
            &Scope::Project(project_id.to_string()),
            (self.clock)(),
        );

        let name = match display_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => Some(name.to_string()),
            None => self.registry_name(RegistryKind::Project, project_id)?,
        }
        .or_else(|| {
            records
                .iter()
                .find_map(|r| r.project_name.clone().filter(|n| !n.trim().is_empty()))
        })
        .or_else(|| (!records.is_empty()).then(|| project_id.to_string()))
        .ok_or_else(|| Error::not_found(format!("project {project_id}")))?;

        self.compiler.single_project(&name, &records)
    }

    /// Compile the report across every project, merging in a client-held batch.
    ///
    /// # Errors
    ///
    /// Returns a store or PDF error.
    pub fn compile_global_report(&self, incoming: Vec<PartialRecord>) -> Result<CompiledReport> {
        let stored = self.store.scan(&RecordFilter::all())?;
        let records = merge::merge(stored, incoming, &Scope::Global, (self.clock)());
        let registry = self.store.list(RegistryKind::Project)?;
        let groups = layout::group_by_project(records, &registry);
        self.compiler.global(&groups)
    }

    /// Register a project name, returning the existing entry on a repeat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name, or a store error.
    pub fn register_project(&mut self, name: &str) -> Result<RegistryEntry> {
        self.store.register(RegistryKind::Project, name)
    }

    /// Register a developer name, returning the existing entry on a repeat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name, or a store error.
    pub fn register_developer(&mut self, name: &str) -> Result<RegistryEntry> {
        self.store.register(RegistryKind::Developer, name)
    }

    /// Registered projects, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns a store error if the listing fails.
    pub fn projects(&self) -> Result<Vec<RegistryEntry>> {
        self.store.list(RegistryKind::Project)
    }

    /// Registered developers, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns a store error if the listing fails.
    pub fn developers(&self) -> Result<Vec<RegistryEntry>> {
        self.store.list(RegistryKind::Developer)
    }
}
