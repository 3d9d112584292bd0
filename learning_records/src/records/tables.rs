//! Row types for each table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Confidence, Relation, StudentId};

/// Separator used by the `completed_topics` column.
pub const TOPIC_SEPARATOR: char = ';';

/// A directed edge in the topic graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRelation {
    pub topic: String,
    #[serde(default)]
    pub relation: Relation,
    #[serde(default)]
    pub related_topic: String,
}

impl TopicRelation {
    pub fn new(topic: impl Into<String>, relation: Relation, related_topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            relation,
            related_topic: related_topic.into(),
        }
    }
}

/// Raw `student_data` row as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRow {
    pub student_id: StudentId,
    #[serde(default)]
    pub completed_topics: Option<String>,
}

/// A student and the topics they have completed, in recorded order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_id: StudentId,
    pub completed_topics: Vec<String>,
}

impl StudentRecord {
    pub fn new<I, S>(student_id: StudentId, completed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            student_id,
            completed_topics: completed.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether the student has completed a topic.
    pub fn has_completed(&self, topic: &str) -> bool {
        self.completed_topics.iter().any(|t| t == topic)
    }
}

impl From<StudentRow> for StudentRecord {
    fn from(row: StudentRow) -> Self {
        let completed_topics = row
            .completed_topics
            .as_deref()
            .map(split_topics)
            .unwrap_or_default();
        Self {
            student_id: row.student_id,
            completed_topics,
        }
    }
}

/// Split a delimited topic list, dropping blank entries.
pub fn split_topics(raw: &str) -> Vec<String> {
    raw.split(TOPIC_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Confidence of one student in one topic.
///
/// At most one entry exists per `(student_id, topic)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceEntry {
    pub student_id: StudentId,
    pub topic: String,
    pub confidence: Confidence,
}

impl ConfidenceEntry {
    pub fn new(student_id: StudentId, topic: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            student_id,
            topic: topic.into(),
            confidence,
        }
    }
}

/// Raw `resources` row after header normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceRow {
    pub topic: String,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
}

/// Learning links for a topic. Missing links are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resource {
    pub topic: String,
    pub youtube: String,
    pub docs: String,
}

impl Resource {
    pub fn new(topic: impl Into<String>, youtube: &str, docs: &str) -> Self {
        Self {
            topic: topic.into(),
            youtube: normalize_url(youtube),
            docs: normalize_url(docs),
        }
    }
}

impl From<ResourceRow> for Resource {
    fn from(row: ResourceRow) -> Self {
        Self::new(
            row.topic,
            row.youtube.as_deref().unwrap_or_default(),
            row.docs.as_deref().unwrap_or_default(),
        )
    }
}

/// Make a link absolute: blank stays blank, bare hosts get `https://`.
pub fn normalize_url(raw: &str) -> String {
    let url = raw.trim();
    if url.is_empty() {
        return String::new();
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    format!("https://{}", url.trim_start_matches('/'))
}

/// One day of a study plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlanEntry {
    /// Serialized as an ISO 8601 date (`YYYY-MM-DD`).
    pub date: NaiveDate,
    pub topic: String,
    pub hours: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_topics() {
        assert_eq!(split_topics("A;B; C"), vec!["A", "B", "C"]);
        assert_eq!(split_topics("A;;B;"), vec!["A", "B"]);
        assert!(split_topics("").is_empty());
    }

    #[test]
    fn test_student_row_conversion() {
        let record = StudentRecord::from(StudentRow {
            student_id: StudentId(3),
            completed_topics: Some("Variables;Loops".to_string()),
        });
        assert_eq!(record.completed_topics, vec!["Variables", "Loops"]);
        assert!(record.has_completed("Loops"));
        assert!(!record.has_completed("Functions"));

        let empty = StudentRecord::from(StudentRow {
            student_id: StudentId(4),
            completed_topics: None,
        });
        assert!(empty.completed_topics.is_empty());
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url(""), "");
        assert_eq!(normalize_url("   "), "");
        assert_eq!(normalize_url("https://docs.rs"), "https://docs.rs");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("youtube.com/watch?v=1"), "https://youtube.com/watch?v=1");
        assert_eq!(normalize_url("//cdn.example.com/a"), "https://cdn.example.com/a");
    }

    #[test]
    fn test_resource_from_row_fills_blanks() {
        let resource = Resource::from(ResourceRow {
            topic: "Loops".to_string(),
            youtube: Some("youtu.be/x".to_string()),
            docs: None,
        });
        assert_eq!(resource.youtube, "https://youtu.be/x");
        assert_eq!(resource.docs, "");
    }
}
