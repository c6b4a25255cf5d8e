//! Report structure as an ordered list of draw instructions.
//!
//! Everything here is pure: given a title and the records to show, it
//! produces the [`DrawOp`] sequence a renderer interprets. Report shape can be
//! tested without any PDF machinery.

use std::collections::HashMap;

use crate::record::{DocumentationRecord, Section};
use crate::storage::RegistryEntry;

/// Heading used when a record has no developer name.
pub const UNKNOWN_CONTRIBUTOR: &str = "Unknown";

/// Body text printed for an unanswered field.
pub const DEFAULT_PLACEHOLDER: &str = "(No response provided)";

/// Sentence printed when a single-project report has no records.
pub const EMPTY_PROJECT_NOTICE: &str = "No documentation available for this project.";

/// Sentence printed when the global report has no records.
pub const EMPTY_GLOBAL_NOTICE: &str = "No documentation has been recorded for any project yet.";

/// Title of the global report.
pub const GLOBAL_TITLE: &str = "Full System Documentation";

/// Vertical gap between blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gap {
    /// Between a field body and the next label.
    Small,
    /// After headings and sections.
    Medium,
    /// Below the title and between records of one project.
    Large,
}

/// One rendering instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    /// Centered document title.
    Title(String),
    /// Start a new page.
    PageBreak,
    /// Project name opening a global-report section.
    ProjectHeading(String),
    /// Underlined contributor line opening a record block.
    ContributorHeading(String),
    /// One of the three fixed section headings.
    SectionTitle(String),
    /// Bold field label.
    FieldLabel(String),
    /// Field answer, or the placeholder.
    FieldBody(String),
    /// Explanatory sentence for an empty report.
    Notice(String),
    /// Vertical whitespace.
    Spacing(Gap),
}

/// Records of one project, ready for the global report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGroup {
    /// Project identifier.
    pub project_id: String,
    /// Heading printed for the group.
    pub name: String,
    /// Records in merged order.
    pub records: Vec<DocumentationRecord>,
}

/// Title of a single-project report.
#[must_use]
pub fn project_title(project_name: &str) -> String {
    format!("{project_name} - Documentation")
}

/// Plan a single-project report.
#[must_use]
pub fn single_project(
    project_name: &str,
    records: &[DocumentationRecord],
    placeholder: &str,
) -> Vec<DrawOp> {
    let mut ops = vec![
        DrawOp::Title(project_title(project_name)),
        DrawOp::Spacing(Gap::Large),
    ];

    if records.is_empty() {
        ops.push(DrawOp::Notice(EMPTY_PROJECT_NOTICE.to_string()));
        return ops;
    }

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            ops.push(DrawOp::PageBreak);
        }
        record_block(record, placeholder, &mut ops);
    }
    ops
}

/// Plan the global report. Groups without records are skipped.
#[must_use]
pub fn global(groups: &[ProjectGroup], placeholder: &str) -> Vec<DrawOp> {
    let mut ops = vec![
        DrawOp::Title(GLOBAL_TITLE.to_string()),
        DrawOp::Spacing(Gap::Large),
    ];

    let mut rendered = 0;
    for group in groups.iter().filter(|g| !g.records.is_empty()) {
        if rendered > 0 {
            ops.push(DrawOp::PageBreak);
        }
        ops.push(DrawOp::ProjectHeading(group.name.clone()));
        ops.push(DrawOp::Spacing(Gap::Medium));
        for (i, record) in group.records.iter().enumerate() {
            if i > 0 {
                ops.push(DrawOp::Spacing(Gap::Large));
            }
            record_block(record, placeholder, &mut ops);
        }
        rendered += 1;
    }

    if rendered == 0 {
        ops.push(DrawOp::Notice(EMPTY_GLOBAL_NOTICE.to_string()));
    }
    ops
}

fn record_block(record: &DocumentationRecord, placeholder: &str, ops: &mut Vec<DrawOp>) {
    let contributor = record
        .developer_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNKNOWN_CONTRIBUTOR);
    ops.push(DrawOp::ContributorHeading(format!(
        "Contributor: {contributor}"
    )));
    ops.push(DrawOp::Spacing(Gap::Medium));

    for section in Section::ALL {
        ops.push(DrawOp::SectionTitle(section.title().to_string()));
        for field in section.fields() {
            let value = record.content.get(*field).trim();
            let body = if value.is_empty() { placeholder } else { value };
            ops.push(DrawOp::FieldLabel(field.label().to_string()));
            ops.push(DrawOp::FieldBody(body.to_string()));
            ops.push(DrawOp::Spacing(Gap::Small));
        }
        ops.push(DrawOp::Spacing(Gap::Medium));
    }
}

/// Group merged records by project.
///
/// When `registry` is non-empty its (alphabetical) order drives iteration, and
/// projects it does not know follow in first-seen order. Without a registry,
/// groups appear in first-seen order. Records keep their relative order inside
/// a group.
#[must_use]
pub fn group_by_project(
    records: Vec<DocumentationRecord>,
    registry: &[RegistryEntry],
) -> Vec<ProjectGroup> {
    let mut first_seen: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<DocumentationRecord>> = HashMap::new();
    for record in records {
        if !buckets.contains_key(&record.project_id) {
            first_seen.push(record.project_id.clone());
        }
        buckets
            .entry(record.project_id.clone())
            .or_default()
            .push(record);
    }

    let registry_names: HashMap<&str, &str> = registry
        .iter()
        .map(|e| (e.id.as_str(), e.name.as_str()))
        .collect();

    let mut order: Vec<String> = registry
        .iter()
        .filter(|e| buckets.contains_key(&e.id))
        .map(|e| e.id.clone())
        .collect();
    order.extend(
        first_seen
            .into_iter()
            .filter(|id| !registry_names.contains_key(id.as_str())),
    );

    order
        .into_iter()
        .filter_map(|project_id| {
            let records = buckets.remove(&project_id)?;
            let name = registry_names
                .get(project_id.as_str())
                .map(|n| (*n).to_string())
                .or_else(|| {
                    records
                        .iter()
                        .filter_map(|r| r.project_name.as_deref())
                        .map(str::trim)
                        .find(|n| !n.is_empty())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| project_id.clone());
            Some(ProjectGroup {
                project_id,
                name,
                records,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Field, PartialRecord};
    use chrono::Utc;

    fn record(id: &str, project: &str, developer: Option<&str>) -> DocumentationRecord {
        let now = Utc::now();
        let mut draft = PartialRecord::for_pair(project, "dev");
        draft.developer_name = developer.map(str::to_string);
        for field in Field::ALL {
            draft.content.set(field, format!("{} answer", field.key()));
        }
        draft.into_record(id.to_string(), now, now).unwrap()
    }

    fn entry(id: &str, name: &str) -> RegistryEntry {
        RegistryEntry {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    fn count(ops: &[DrawOp], pred: impl Fn(&DrawOp) -> bool) -> usize {
        ops.iter().filter(|op| pred(op)).count()
    }

    #[test]
    fn test_single_project_one_block_per_record() {
        let records = vec![record("a", "p1", Some("Ada")), record("b", "p1", Some("Bob"))];
        let ops = single_project("Apollo", &records, DEFAULT_PLACEHOLDER);

        assert_eq!(ops[0], DrawOp::Title("Apollo - Documentation".to_string()));
        assert_eq!(
            count(&ops, |op| matches!(op, DrawOp::ContributorHeading(_))),
            2
        );
        assert_eq!(count(&ops, |op| matches!(op, DrawOp::PageBreak)), 1);
        assert_eq!(count(&ops, |op| matches!(op, DrawOp::FieldLabel(_))), 24);
    }

    #[test]
    fn test_no_page_break_before_first_record() {
        let ops = single_project("Apollo", &[record("a", "p1", None)], DEFAULT_PLACEHOLDER);
        assert!(!ops.contains(&DrawOp::PageBreak));
    }

    #[test]
    fn test_unknown_contributor_fallback() {
        let ops = single_project("Apollo", &[record("a", "p1", Some("  "))], DEFAULT_PLACEHOLDER);
        assert!(ops.contains(&DrawOp::ContributorHeading(
            "Contributor: Unknown".to_string()
        )));
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let ops = single_project("Apollo", &[record("a", "p1", None)], DEFAULT_PLACEHOLDER);
        let titles: Vec<&str> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::SectionTitle(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            titles,
            vec!["Basic Information", "Development Process", "Technical Details"]
        );
    }

    #[test]
    fn test_empty_field_renders_placeholder() {
        let mut rec = record("a", "p1", Some("Ada"));
        rec.content.set(Field::Thoughts, "   ");
        let ops = single_project("Apollo", &[rec], DEFAULT_PLACEHOLDER);

        let label = ops
            .iter()
            .position(|op| *op == DrawOp::FieldLabel("Thoughts".to_string()))
            .unwrap();
        assert_eq!(
            ops[label + 1],
            DrawOp::FieldBody(DEFAULT_PLACEHOLDER.to_string())
        );
        assert!(!ops.contains(&DrawOp::FieldBody(String::new())));
    }

    #[test]
    fn test_custom_placeholder() {
        let mut rec = record("a", "p1", None);
        rec.content.set(Field::Summary, "");
        let ops = single_project("Apollo", &[rec], "-");
        assert!(ops.contains(&DrawOp::FieldBody("-".to_string())));
    }

    #[test]
    fn test_empty_project_renders_notice_only() {
        let ops = single_project("Apollo", &[], DEFAULT_PLACEHOLDER);
        assert_eq!(
            ops.last(),
            Some(&DrawOp::Notice(EMPTY_PROJECT_NOTICE.to_string()))
        );
        assert_eq!(
            count(&ops, |op| matches!(op, DrawOp::ContributorHeading(_))),
            0
        );
        assert_eq!(count(&ops, |op| matches!(op, DrawOp::SectionTitle(_))), 0);
    }

    #[test]
    fn test_grouping_is_contiguous_first_seen() {
        let records = vec![
            record("a", "p2", None),
            record("b", "p1", None),
            record("c", "p2", None),
            record("d", "p1", None),
        ];
        let groups = group_by_project(records, &[]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].project_id, "p2");
        let ids: Vec<&str> = groups[0].records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(groups[1].project_id, "p1");
    }

    #[test]
    fn test_grouping_prefers_registry_order_and_names() {
        let records = vec![
            record("a", "p-zeta", None),
            record("b", "p-unregistered", None),
            record("c", "p-alpha", None),
        ];
        let registry = vec![
            entry("p-alpha", "Alpha"),
            entry("p-empty", "Beta"),
            entry("p-zeta", "Zeta"),
        ];
        let groups = group_by_project(records, &registry);

        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta", "p-unregistered"]);
    }

    #[test]
    fn test_group_name_falls_back_to_record_label() {
        let mut rec = record("a", "p1", None);
        rec.project_name = Some("Apollo".to_string());
        let groups = group_by_project(vec![rec], &[]);
        assert_eq!(groups[0].name, "Apollo");
    }

    #[test]
    fn test_global_one_section_per_project() {
        let records = vec![
            record("a", "p1", Some("Ada")),
            record("b", "p2", Some("Bob")),
            record("c", "p1", Some("Cy")),
        ];
        let groups = group_by_project(records, &[]);
        let ops = global(&groups, DEFAULT_PLACEHOLDER);

        assert_eq!(ops[0], DrawOp::Title(GLOBAL_TITLE.to_string()));
        let headings: Vec<&str> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::ProjectHeading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(headings, vec!["p1", "p2"]);
        assert_eq!(count(&ops, |op| matches!(op, DrawOp::PageBreak)), 1);
        assert_eq!(
            count(&ops, |op| matches!(op, DrawOp::ContributorHeading(_))),
            3
        );
    }

    #[test]
    fn test_global_skips_empty_groups() {
        let groups = vec![
            ProjectGroup {
                project_id: "p0".to_string(),
                name: "Empty".to_string(),
                records: Vec::new(),
            },
            ProjectGroup {
                project_id: "p1".to_string(),
                name: "Full".to_string(),
                records: vec![record("a", "p1", None)],
            },
        ];
        let ops = global(&groups, DEFAULT_PLACEHOLDER);
        assert!(!ops.contains(&DrawOp::ProjectHeading("Empty".to_string())));
        assert!(!ops.contains(&DrawOp::PageBreak));
    }

    #[test]
    fn test_global_empty_renders_notice() {
        let ops = global(&[], DEFAULT_PLACEHOLDER);
        assert_eq!(
            ops.last(),
            Some(&DrawOp::Notice(EMPTY_GLOBAL_NOTICE.to_string()))
        );
    }
}
