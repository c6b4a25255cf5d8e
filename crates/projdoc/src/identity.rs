//! Identity resolution for incoming writes.
//!
//! Decides whether a submitted [`PartialRecord`] updates an existing record or
//! creates a new one:
//!
//! 1. An explicit `id` that exists in the store resolves to that record.
//! 2. An explicit `id` that does not exist is accepted as a new identity.
//! 3. Without an `id`, the (project, developer) pair is looked up; a hit
//!    resolves to that record, a miss mints a fresh identifier.

use tracing::trace;

use crate::error::Result;
use crate::record::{DocumentationRecord, PartialRecord};
use crate::storage::{mint_id, RecordStore};

/// Outcome of resolving a candidate record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The candidate updates this stored record.
    Existing(DocumentationRecord),
    /// The candidate creates a record under this identifier.
    New {
        /// Caller-supplied or freshly minted identifier.
        id: String,
        /// Whether the identifier came from the caller.
        caller_supplied: bool,
    },
}

impl Resolution {
    /// The resolved identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Existing(record) => &record.id,
            Self::New { id, .. } => id,
        }
    }

    /// Whether the candidate resolved to a stored record.
    #[must_use]
    pub fn is_update(&self) -> bool {
        matches!(self, Self::Existing(_))
    }
}

/// Resolve the identity of `candidate` against `store`.
///
/// # Errors
///
/// Returns a validation error if `projectId` or `developerId` is missing, and
/// propagates store failures.
pub fn resolve<S>(store: &S, candidate: &PartialRecord) -> Result<Resolution>
where
    S: RecordStore + ?Sized,
{
    let (project_id, developer_id) = candidate.require_pair()?;

    if let Some(id) = candidate.explicit_id() {
        return Ok(match store.get(id)? {
            Some(existing) => {
                trace!(%id, "Resolved by explicit id");
                Resolution::Existing(existing)
            }
            None => {
                trace!(%id, "Accepting caller-supplied id");
                Resolution::New {
                    id: id.to_string(),
                    caller_supplied: true,
                }
            }
        });
    }

    Ok(match store.find_by_pair(project_id, developer_id)? {
        Some(existing) => {
            trace!(id = %existing.id, project_id, developer_id, "Resolved by pair");
            Resolution::Existing(existing)
        }
        None => Resolution::New {
            id: mint_id(),
            caller_supplied: false,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Utc;

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        let now = Utc::now();
        store
            .upsert(
                PartialRecord::for_pair("p1", "d1")
                    .into_record("r1".to_string(), now, now)
                    .unwrap(),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_explicit_existing_id_updates() {
        let store = seeded();
        let mut candidate = PartialRecord::for_pair("p9", "d9");
        candidate.id = Some("r1".to_string());

        let resolution = resolve(&store, &candidate).unwrap();
        assert!(resolution.is_update());
        assert_eq!(resolution.id(), "r1");
    }

    #[test]
    fn test_explicit_unknown_id_is_accepted() {
        let store = seeded();
        let mut candidate = PartialRecord::for_pair("p1", "d1");
        candidate.id = Some("client-made".to_string());

        let resolution = resolve(&store, &candidate).unwrap();
        assert_eq!(
            resolution,
            Resolution::New {
                id: "client-made".to_string(),
                caller_supplied: true,
            }
        );
    }

    #[test]
    fn test_pair_lookup_fills_in_id() {
        let store = seeded();
        let resolution = resolve(&store, &PartialRecord::for_pair("p1", "d1")).unwrap();
        assert!(resolution.is_update());
        assert_eq!(resolution.id(), "r1");
    }

    #[test]
    fn test_unknown_pair_mints_id() {
        let store = seeded();
        let resolution = resolve(&store, &PartialRecord::for_pair("p1", "d2")).unwrap();
        match resolution {
            Resolution::New {
                id,
                caller_supplied,
            } => {
                assert!(!caller_supplied);
                assert_ne!(id, "r1");
                assert!(!id.is_empty());
            }
            Resolution::Existing(_) => panic!("expected a new identity"),
        }
    }

    #[test]
    fn test_missing_pair_is_rejected_even_with_id() {
        let store = seeded();
        let candidate = PartialRecord {
            id: Some("r1".to_string()),
            project_id: Some("p1".to_string()),
            ..PartialRecord::default()
        };
        let err = resolve(&store, &candidate).unwrap_err();
        assert!(err.is_validation_error());
    }
}
