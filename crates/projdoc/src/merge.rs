//! Reconciliation of a client-held batch with stored records.
//!
//! Before a report is compiled, the client may send its locally cached
//! records, which can be newer than what the store holds. [`merge`] folds that
//! batch over the stored records left to right:
//!
//! - an incoming record that shares a resolved identity with a working record
//!   replaces it in place (the client copy wins);
//! - otherwise it is appended, but only if it belongs to the report's [`Scope`].
//!
//! Identity follows the same tiers as [`crate::identity`]: an explicit `id`
//! matches by id only; without one, the (project, developer) pair is used.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::record::{DocumentationRecord, PartialRecord};
use crate::storage::mint_id;

/// The set of records a report draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// One project's records.
    Project(String),
    /// Every record.
    Global,
}

impl Scope {
    /// Whether a record for `project_id` belongs to this scope.
    #[must_use]
    pub fn admits(&self, project_id: &str) -> bool {
        match self {
            Self::Project(id) => id == project_id,
            Self::Global => true,
        }
    }
}

fn position_of(working: &[DocumentationRecord], incoming: &PartialRecord) -> Option<usize> {
    if let Some(id) = incoming.explicit_id() {
        return working.iter().position(|r| r.id == id);
    }
    let (project_id, developer_id) = (incoming.project_id()?, incoming.developer_id()?);
    working
        .iter()
        .enumerate()
        .filter(|(_, r)| r.matches_pair(project_id, developer_id))
        .max_by_key(|(_, r)| r.updated_at)
        .map(|(pos, _)| pos)
}

/// Merge `incoming` over `store_records` for `scope`.
///
/// Replaced records keep their position; appended records follow in input
/// order. When several incoming records share an identity, the last one wins.
/// `now` stamps incoming records that carry no timestamps of their own.
/// Entries that cannot be placed (no identity, or outside the scope) are
/// skipped.
#[must_use]
pub fn merge(
    store_records: Vec<DocumentationRecord>,
    incoming: Vec<PartialRecord>,
    scope: &Scope,
    now: DateTime<Utc>,
) -> Vec<DocumentationRecord> {
    let mut working = store_records;

    for candidate in incoming {
        if let Some(pos) = position_of(&working, &candidate) {
            let updated_at = candidate.updated_at.unwrap_or(now);
            let replaced = candidate.overlay(&working[pos], updated_at);
            debug!(id = %replaced.id, "Incoming record replaces stored copy");
            working[pos] = replaced;
            continue;
        }

        let Ok((project_id, _)) = candidate.require_pair() else {
            warn!(id = ?candidate.explicit_id(), "Skipping incoming record without projectId/developerId");
            continue;
        };
        if !scope.admits(project_id) {
            debug!(project_id, "Skipping incoming record outside report scope");
            continue;
        }

        let id = candidate.explicit_id().map_or_else(mint_id, str::to_string);
        let created_at = candidate.created_at.unwrap_or(now);
        let updated_at = candidate.updated_at.unwrap_or(now);
        match candidate.into_record(id, created_at, updated_at) {
            Ok(record) => {
                debug!(id = %record.id, "Appending incoming record");
                working.push(record);
            }
            Err(e) => warn!(error = %e, "Skipping incoming record"),
        }
    }

    working
}
