//! Core documentation record types.
//!
//! A [`DocumentationRecord`] is one contributor's write-up for one project.
//! Its twelve free-text answers live in [`RecordContent`] and are grouped into
//! three fixed [`Section`]s for rendering. Clients submit [`PartialRecord`]s,
//! which may lack the store-assigned `id` and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// One of the three fixed content groupings of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// What the work is and where it lives.
    BasicInformation,
    /// How the contributor got there.
    DevelopmentProcess,
    /// What was built.
    TechnicalDetails,
}

impl Section {
    /// All sections in report order.
    pub const ALL: [Section; 3] = [
        Section::BasicInformation,
        Section::DevelopmentProcess,
        Section::TechnicalDetails,
    ];

    /// Heading printed above the section.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::BasicInformation => "Basic Information",
            Self::DevelopmentProcess => "Development Process",
            Self::TechnicalDetails => "Technical Details",
        }
    }

    /// Fields rendered in this section, in order.
    #[must_use]
    pub fn fields(self) -> &'static [Field] {
        match self {
            Self::BasicInformation => &[
                Field::Description,
                Field::Purpose,
                Field::Location,
                Field::Dependencies,
            ],
            Self::DevelopmentProcess => &[
                Field::Thoughts,
                Field::Challenges,
                Field::Assumptions,
                Field::Approach,
                Field::Alternatives,
            ],
            Self::TechnicalDetails => &[Field::Solution, Field::Summary, Field::Architecture],
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// A single free-text content field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// What the component is.
    Description,
    /// Why it exists.
    Purpose,
    /// Where it lives in the codebase.
    Location,
    /// What it relies on.
    Dependencies,
    /// Initial thoughts on the problem.
    Thoughts,
    /// Obstacles encountered.
    Challenges,
    /// Assumptions made along the way.
    Assumptions,
    /// The approach taken.
    Approach,
    /// Alternatives considered.
    Alternatives,
    /// The final solution.
    Solution,
    /// Short summary.
    Summary,
    /// Architectural notes.
    Architecture,
}

impl Field {
    /// All fields in report order.
    pub const ALL: [Field; 12] = [
        Field::Description,
        Field::Purpose,
        Field::Location,
        Field::Dependencies,
        Field::Thoughts,
        Field::Challenges,
        Field::Assumptions,
        Field::Approach,
        Field::Alternatives,
        Field::Solution,
        Field::Summary,
        Field::Architecture,
    ];

    /// Wire and column name of the field.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Purpose => "purpose",
            Self::Location => "location",
            Self::Dependencies => "dependencies",
            Self::Thoughts => "thoughts",
            Self::Challenges => "challenges",
            Self::Assumptions => "assumptions",
            Self::Approach => "approach",
            Self::Alternatives => "alternatives",
            Self::Solution => "solution",
            Self::Summary => "summary",
            Self::Architecture => "architecture",
        }
    }

    /// Bold label printed above the field body.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::Purpose => "Purpose",
            Self::Location => "Location",
            Self::Dependencies => "Dependencies",
            Self::Thoughts => "Thoughts",
            Self::Challenges => "Challenges",
            Self::Assumptions => "Assumptions",
            Self::Approach => "Approach",
            Self::Alternatives => "Alternatives Considered",
            Self::Solution => "Solution",
            Self::Summary => "Summary",
            Self::Architecture => "Architecture",
        }
    }

    /// The section this field belongs to.
    #[must_use]
    pub fn section(self) -> Section {
        match self {
            Self::Description | Self::Purpose | Self::Location | Self::Dependencies => {
                Section::BasicInformation
            }
            Self::Thoughts
            | Self::Challenges
            | Self::Assumptions
            | Self::Approach
            | Self::Alternatives => Section::DevelopmentProcess,
            Self::Solution | Self::Summary | Self::Architecture => Section::TechnicalDetails,
        }
    }
}

/// The twelve free-text answers of a record.
///
/// Missing and `null` values deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordContent {
    #[serde(deserialize_with = "null_as_empty")]
    description: String,
    #[serde(deserialize_with = "null_as_empty")]
    purpose: String,
    #[serde(deserialize_with = "null_as_empty")]
    location: String,
    #[serde(deserialize_with = "null_as_empty")]
    dependencies: String,
    #[serde(deserialize_with = "null_as_empty")]
    thoughts: String,
    #[serde(deserialize_with = "null_as_empty")]
    challenges: String,
    #[serde(deserialize_with = "null_as_empty")]
    assumptions: String,
    #[serde(deserialize_with = "null_as_empty")]
    approach: String,
    #[serde(deserialize_with = "null_as_empty")]
    alternatives: String,
    #[serde(deserialize_with = "null_as_empty")]
    solution: String,
    #[serde(deserialize_with = "null_as_empty")]
    summary: String,
    #[serde(deserialize_with = "null_as_empty")]
    architecture: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl RecordContent {
    /// Get the value of a field.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Description => &self.description,
            Field::Purpose => &self.purpose,
            Field::Location => &self.location,
            Field::Dependencies => &self.dependencies,
            Field::Thoughts => &self.thoughts,
            Field::Challenges => &self.challenges,
            Field::Assumptions => &self.assumptions,
            Field::Approach => &self.approach,
            Field::Alternatives => &self.alternatives,
            Field::Solution => &self.solution,
            Field::Summary => &self.summary,
            Field::Architecture => &self.architecture,
        }
    }

    /// Set the value of a field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Description => &mut self.description,
            Field::Purpose => &mut self.purpose,
            Field::Location => &mut self.location,
            Field::Dependencies => &mut self.dependencies,
            Field::Thoughts => &mut self.thoughts,
            Field::Challenges => &mut self.challenges,
            Field::Assumptions => &mut self.assumptions,
            Field::Approach => &mut self.approach,
            Field::Alternatives => &mut self.alternatives,
            Field::Solution => &mut self.solution,
            Field::Summary => &mut self.summary,
            Field::Architecture => &mut self.architecture,
        };
        *slot = value.into();
    }

    /// Builder-style variant of [`RecordContent::set`].
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Number of fields with a non-blank answer.
    #[must_use]
    pub fn answered(&self) -> usize {
        Field::ALL
            .iter()
            .filter(|f| !self.get(**f).trim().is_empty())
            .count()
    }
}

/// A persisted documentation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationRecord {
    /// Store-assigned identifier, stable across updates.
    pub id: String,

    /// Project this record documents.
    pub project_id: String,

    /// Contributor who wrote it.
    pub developer_id: String,

    /// Project name captured at write time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// Developer name captured at write time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_name: Option<String>,

    /// The free-text answers.
    #[serde(flatten)]
    pub content: RecordContent,

    /// Set once, on first creation.
    pub created_at: DateTime<Utc>,

    /// Set on every write.
    pub updated_at: DateTime<Utc>,
}

impl DocumentationRecord {
    /// Whether this record belongs to the given (project, developer) pair.
    #[must_use]
    pub fn matches_pair(&self, project_id: &str, developer_id: &str) -> bool {
        self.project_id == project_id && self.developer_id == developer_id
    }
}

/// A record as submitted by a client.
///
/// Every key is optional on the wire; [`PartialRecord::require_pair`] enforces
/// the write precondition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRecord {
    /// Explicit identity, if the client has one cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Project foreign key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Developer foreign key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_id: Option<String>,

    /// Project display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// Developer display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_name: Option<String>,

    /// The free-text answers.
    #[serde(flatten)]
    pub content: RecordContent,

    /// Creation time, when echoed back by a client cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Last write time, when echoed back by a client cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl PartialRecord {
    /// Start a draft for a (project, developer) pair.
    #[must_use]
    pub fn for_pair(project_id: impl Into<String>, developer_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            developer_id: Some(developer_id.into()),
            ..Self::default()
        }
    }

    /// The explicit id, ignoring blank strings.
    #[must_use]
    pub fn explicit_id(&self) -> Option<&str> {
        non_blank(self.id.as_ref())
    }

    /// The project id, ignoring blank strings.
    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        non_blank(self.project_id.as_ref())
    }

    /// The developer id, ignoring blank strings.
    #[must_use]
    pub fn developer_id(&self) -> Option<&str> {
        non_blank(self.developer_id.as_ref())
    }

    /// Both foreign keys, or a validation error naming the missing ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either key is absent or blank.
    pub fn require_pair(&self) -> Result<(&str, &str)> {
        match (self.project_id(), self.developer_id()) {
            (Some(project), Some(developer)) => Ok((project, developer)),
            (None, Some(_)) => Err(Error::validation("projectId is required")),
            (Some(_), None) => Err(Error::validation("developerId is required")),
            (None, None) => Err(Error::validation(
                "projectId and developerId are required",
            )),
        }
    }

    /// Overlay this draft onto an existing record.
    ///
    /// Identity, foreign keys and `created_at` come from `existing`. Content is
    /// replaced wholesale; display labels are replaced only when supplied.
    #[must_use]
    pub fn overlay(self, existing: &DocumentationRecord, updated_at: DateTime<Utc>) -> DocumentationRecord {
        DocumentationRecord {
            id: existing.id.clone(),
            project_id: existing.project_id.clone(),
            developer_id: existing.developer_id.clone(),
            project_name: self.project_name.or_else(|| existing.project_name.clone()),
            developer_name: self
                .developer_name
                .or_else(|| existing.developer_name.clone()),
            content: self.content,
            created_at: existing.created_at,
            updated_at,
        }
    }

    /// Turn this draft into a fresh record under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either foreign key is missing.
    pub fn into_record(
        self,
        id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<DocumentationRecord> {
        let (project_id, developer_id) = self.require_pair()?;
        let (project_id, developer_id) = (project_id.to_string(), developer_id.to_string());
        Ok(DocumentationRecord {
            id,
            project_id,
            developer_id,
            project_name: self.project_name,
            developer_name: self.developer_name,
            content: self.content,
            created_at,
            updated_at,
        })
    }
}

impl From<DocumentationRecord> for PartialRecord {
    fn from(record: DocumentationRecord) -> Self {
        Self {
            id: Some(record.id),
            project_id: Some(record.project_id),
            developer_id: Some(record.developer_id),
            project_name: record.project_name,
            developer_name: record.developer_name,
            content: record.content,
            created_at: Some(record.created_at),
            updated_at: Some(record.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_cover_every_field_once() {
        let mut seen: Vec<Field> = Section::ALL
            .iter()
            .flat_map(|s| s.fields().iter().copied())
            .collect();
        assert_eq!(seen.len(), 12);
        seen.dedup();
        assert_eq!(seen, Field::ALL.to_vec());
    }

    #[test]
    fn test_field_section_agrees_with_section_fields() {
        for section in Section::ALL {
            for field in section.fields() {
                assert_eq!(field.section(), section);
            }
        }
    }

    #[test]
    fn test_section_titles() {
        assert_eq!(Section::BasicInformation.to_string(), "Basic Information");
        assert_eq!(Section::DevelopmentProcess.title(), "Development Process");
        assert_eq!(Section::TechnicalDetails.title(), "Technical Details");
    }

    #[test]
    fn test_content_get_set() {
        let mut content = RecordContent::default();
        assert_eq!(content.get(Field::Thoughts), "");
        content.set(Field::Thoughts, "started with a spike");
        assert_eq!(content.get(Field::Thoughts), "started with a spike");
        assert_eq!(content.answered(), 1);
    }

    #[test]
    fn test_content_deserializes_null_and_missing() {
        let json = r#"{"description": "X", "purpose": null}"#;
        let content: RecordContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.get(Field::Description), "X");
        assert_eq!(content.get(Field::Purpose), "");
        assert_eq!(content.get(Field::Architecture), "");
    }

    #[test]
    fn test_partial_record_camel_case_wire_format() {
        let json = r#"{
            "projectId": "p1",
            "developerId": "d1",
            "developerName": "Ada",
            "description": "X",
            "thoughts": "hmm"
        }"#;
        let draft: PartialRecord = serde_json::from_str(json).unwrap();
        assert_eq!(draft.project_id(), Some("p1"));
        assert_eq!(draft.developer_name.as_deref(), Some("Ada"));
        assert_eq!(draft.content.get(Field::Thoughts), "hmm");
        assert!(draft.explicit_id().is_none());
    }

    #[test]
    fn test_blank_id_is_ignored() {
        let mut draft = PartialRecord::for_pair("p1", "d1");
        draft.id = Some("   ".to_string());
        assert!(draft.explicit_id().is_none());
    }

    #[test]
    fn test_require_pair_messages() {
        let err = PartialRecord::default().require_pair().unwrap_err();
        assert!(err.to_string().contains("projectId and developerId"));

        let mut draft = PartialRecord::for_pair("p1", "");
        let err = draft.require_pair().unwrap_err();
        assert!(err.to_string().contains("developerId"));

        draft.developer_id = Some("d1".to_string());
        assert_eq!(draft.require_pair().unwrap(), ("p1", "d1"));
    }

    #[test]
    fn test_overlay_keeps_identity_and_created_at() {
        let t0 = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let t1 = DateTime::parse_from_rfc3339("2024-02-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let existing = PartialRecord {
            developer_name: Some("Ada".to_string()),
            ..PartialRecord::for_pair("p1", "d1")
        }
        .into_record("r1".to_string(), t0, t0)
        .unwrap();

        let mut draft = PartialRecord::for_pair("p2", "d2");
        draft.content.set(Field::Summary, "new");
        let updated = draft.overlay(&existing, t1);

        assert_eq!(updated.id, "r1");
        assert_eq!(updated.project_id, "p1");
        assert_eq!(updated.developer_id, "d1");
        assert_eq!(updated.developer_name.as_deref(), Some("Ada"));
        assert_eq!(updated.content.get(Field::Summary), "new");
        assert_eq!(updated.created_at, t0);
        assert_eq!(updated.updated_at, t1);
    }

    #[test]
    fn test_record_serialization_flattens_content() {
        let now = Utc::now();
        let record = PartialRecord::for_pair("p1", "d1")
            .into_record("r1".to_string(), now, now)
            .unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["projectId"], "p1");
        assert_eq!(value["description"], "");
        assert!(value.get("content").is_none());
        assert!(value.get("projectName").is_none());
    }
}
