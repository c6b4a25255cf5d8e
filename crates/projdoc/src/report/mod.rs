//! Report compilation.
//!
//! A report is built in two steps: [`layout`] turns records into a pure
//! [`DrawOp`] plan, and [`pdf`] interprets that plan into bytes. Both report
//! modes share the per-record block, so every contributor section has the
//! same shape regardless of how complete it is.

pub mod layout;
pub mod pdf;

use tracing::info;

use crate::error::Result;
use crate::record::DocumentationRecord;

pub use layout::{DrawOp, Gap, ProjectGroup};
pub use pdf::PageSetup;

/// File name used when delivering the global report.
pub const GLOBAL_REPORT_FILE_NAME: &str = "Full_System_Documentation.pdf";

/// File name used when delivering a single-project report.
///
/// Each whitespace character and path separator becomes an underscore.
#[must_use]
pub fn report_file_name(project_name: &str) -> String {
    let stem: String = project_name
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{stem}_Documentation.pdf")
}

/// A rendered report ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledReport {
    /// Suggested download name.
    pub file_name: String,
    /// The PDF document.
    pub bytes: Vec<u8>,
    /// Number of contributor blocks in the report.
    pub record_count: usize,
}

/// Renders record sets into PDF reports.
#[derive(Debug, Clone)]
pub struct ReportCompiler {
    placeholder: String,
    page: PageSetup,
}

impl Default for ReportCompiler {
    fn default() -> Self {
        Self::new(layout::DEFAULT_PLACEHOLDER, PageSetup::default())
    }
}

impl ReportCompiler {
    /// Create a compiler with the given placeholder text and page geometry.
    #[must_use]
    pub fn new(placeholder: impl Into<String>, page: PageSetup) -> Self {
        Self {
            placeholder: placeholder.into(),
            page,
        }
    }

    /// Placeholder printed for unanswered fields.
    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Compile the report for one project.
    ///
    /// # Errors
    ///
    /// Returns an error if the PDF backend fails.
    pub fn single_project(
        &self,
        project_name: &str,
        records: &[DocumentationRecord],
    ) -> Result<CompiledReport> {
        let ops = layout::single_project(project_name, records, &self.placeholder);
        let bytes = pdf::render(&layout::project_title(project_name), &ops, self.page)?;
        info!(
            project = project_name,
            records = records.len(),
            bytes = bytes.len(),
            "Compiled project report"
        );
        Ok(CompiledReport {
            file_name: report_file_name(project_name),
            bytes,
            record_count: records.len(),
        })
    }

    /// Compile the report across all projects.
    ///
    /// # Errors
    ///
    /// Returns an error if the PDF backend fails.
    pub fn global(&self, groups: &[ProjectGroup]) -> Result<CompiledReport> {
        let ops = layout::global(groups, &self.placeholder);
        let bytes = pdf::render(layout::GLOBAL_TITLE, &ops, self.page)?;
        let record_count = groups.iter().map(|g| g.records.len()).sum();
        info!(
            projects = groups.iter().filter(|g| !g.records.is_empty()).count(),
            records = record_count,
            bytes = bytes.len(),
            "Compiled global report"
        );
        Ok(CompiledReport {
            file_name: GLOBAL_REPORT_FILE_NAME.to_string(),
            bytes,
            record_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PartialRecord;
    use chrono::Utc;

    #[test]
    fn test_report_file_name() {
        assert_eq!(report_file_name("Apollo"), "Apollo_Documentation.pdf");
        assert_eq!(
            report_file_name("Mission Control Center"),
            "Mission_Control_Center_Documentation.pdf"
        );
        assert_eq!(report_file_name("A  B"), "A__B_Documentation.pdf");
        assert_eq!(report_file_name("Tab\tName"), "Tab_Name_Documentation.pdf");
        assert_eq!(report_file_name("a/b"), "a_b_Documentation.pdf");
    }

    #[test]
    fn test_single_project_report() {
        let now = Utc::now();
        let mut draft = PartialRecord::for_pair("p1", "d1");
        draft.developer_name = Some("Ada".to_string());
        let record = draft.into_record("r1".to_string(), now, now).unwrap();

        let report = ReportCompiler::default()
            .single_project("Apollo", &[record])
            .unwrap();
        assert_eq!(report.file_name, "Apollo_Documentation.pdf");
        assert_eq!(report.record_count, 1);
        assert!(report.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_global_report_file_name() {
        let report = ReportCompiler::default().global(&[]).unwrap();
        assert_eq!(report.file_name, GLOBAL_REPORT_FILE_NAME);
        assert_eq!(report.record_count, 0);
    }

    #[test]
    fn test_custom_placeholder_is_kept() {
        let compiler = ReportCompiler::new("n/a", PageSetup::default());
        assert_eq!(compiler.placeholder(), "n/a");
    }
}
