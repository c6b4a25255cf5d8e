//! End-to-end flow through the public API: save, resave, report.

use lopdf::Document;

use projdoc::config::ReportConfig;
use projdoc::record::{Field, PartialRecord};
use projdoc::{DocumentationService, MemoryStore, RecordStore, SqliteStore};

fn filled(project: &str, developer: &str, description: &str) -> PartialRecord {
    let mut draft = PartialRecord::for_pair(project, developer);
    draft.developer_name = Some("Ada".to_string());
    for field in Field::ALL {
        draft.content.set(field, format!("answer for {}", field.key()));
    }
    draft.content.set(Field::Description, description);
    draft
}

// Parentheses are escaped inside PDF literal strings, so match the bare text.
const PLACEHOLDER_TEXT: &str = "No response provided";

fn occurrences(haystack: &[u8], needle: &str) -> usize {
    haystack
        .windows(needle.len())
        .filter(|w| *w == needle.as_bytes())
        .count()
}

#[test]
fn resave_then_single_project_report() {
    let mut service = DocumentationService::new(MemoryStore::new(), &ReportConfig::default());

    let first = service
        .create_or_update_record(filled("p1", "d1", "X"))
        .unwrap();
    let second = service
        .create_or_update_record(filled("p1", "d1", "Y"))
        .unwrap();

    assert_eq!(first.id, second.id);
    let records = service.list_records(Some("p1")).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].content.get(Field::Description), "Y");

    let report = service
        .compile_single_project_report("p1", Some("Project One"), Vec::new())
        .unwrap();
    assert_eq!(report.file_name, "Project_One_Documentation.pdf");
    assert_eq!(report.record_count, 1);
    assert_eq!(occurrences(&report.bytes, "Contributor: Ada"), 1);
    assert_eq!(occurrences(&report.bytes, PLACEHOLDER_TEXT), 0);

    let doc = Document::load_mem(&report.bytes).unwrap();
    assert!(!doc.get_pages().is_empty());
}

#[test]
fn empty_thoughts_renders_placeholder() {
    let mut service = DocumentationService::new(MemoryStore::new(), &ReportConfig::default());
    let mut draft = filled("p1", "d1", "X");
    draft.content.set(Field::Thoughts, "");
    service.create_or_update_record(draft).unwrap();

    let report = service
        .compile_single_project_report("p1", Some("Project One"), Vec::new())
        .unwrap();
    assert_eq!(occurrences(&report.bytes, PLACEHOLDER_TEXT), 1);
}

#[test]
fn records_survive_reopening_sqlite_store() {
    let path = std::env::temp_dir().join(format!(
        "projdoc_flow_{}_{}.db",
        std::process::id(),
        ulid::Ulid::new()
    ));

    let id = {
        let store = SqliteStore::open(&path).unwrap();
        let mut service = DocumentationService::new(store, &ReportConfig::default());
        let project = service.register_project("Apollo").unwrap();
        service
            .create_or_update_record(filled(&project.id, "d1", "X"))
            .unwrap()
            .id
    };

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.count().unwrap(), 1);
    let service = DocumentationService::new(store, &ReportConfig::default());
    let projects = service.projects().unwrap();
    assert_eq!(projects.len(), 1);

    let record = service.get_record(&projects[0].id, "d1").unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.project_name.as_deref(), Some("Apollo"));

    let report = service.compile_global_report(Vec::new()).unwrap();
    assert_eq!(report.file_name, "Full_System_Documentation.pdf");
    assert_eq!(report.record_count, 1);

    drop(service);
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
