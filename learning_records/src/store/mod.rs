//! Tabular store - the in-memory tables and the backends that persist them.

mod files;

pub use files::*;

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::records::{
    Confidence, ConfidenceEntry, Resource, StudentId, StudentRecord, StudyPlanEntry, TopicRelation,
};

/// Every table the tracker works with, held in memory.
///
/// Rows keep their storage order; lookups are linear scans since the tables
/// are small.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TabularStore {
    /// Edges of the topic graph. Read-only after load.
    pub topic_relations: Vec<TopicRelation>,

    /// One row per student. Maintained outside the tracker.
    pub students: Vec<StudentRecord>,

    /// Confidence history, in insertion order.
    pub history: Vec<ConfidenceEntry>,

    /// Learning links per topic. Read-only after load.
    pub resources: Vec<Resource>,

    /// The most recently generated study plan.
    pub study_plan: Vec<StudyPlanEntry>,
}

impl TabularStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All student ids in table order.
    pub fn list_students(&self) -> Vec<StudentId> {
        self.students.iter().map(|s| s.student_id).collect()
    }

    /// Get a student record by ID.
    pub fn student(&self, id: StudentId) -> Option<&StudentRecord> {
        self.students.iter().find(|s| s.student_id == id)
    }

    /// Completed topics of a student; empty for unknown students.
    pub fn completed_topics(&self, id: StudentId) -> &[String] {
        self.student(id)
            .map(|s| s.completed_topics.as_slice())
            .unwrap_or(&[])
    }

    /// Check if a student has completed a topic.
    pub fn is_completed(&self, id: StudentId, topic: &str) -> bool {
        self.student(id).is_some_and(|s| s.has_completed(topic))
    }

    /// Confidence entries of one student, in table order.
    pub fn history_for(&self, id: StudentId) -> Vec<&ConfidenceEntry> {
        self.history.iter().filter(|e| e.student_id == id).collect()
    }

    /// Recorded confidence for a topic, if any.
    pub fn confidence(&self, id: StudentId, topic: &str) -> Option<Confidence> {
        self.history
            .iter()
            .find(|e| e.student_id == id && e.topic == topic)
            .map(|e| e.confidence)
    }

    /// Get a mutable confidence entry.
    pub fn confidence_mut(&mut self, id: StudentId, topic: &str) -> Option<&mut ConfidenceEntry> {
        self.history
            .iter_mut()
            .find(|e| e.student_id == id && e.topic == topic)
    }

    /// Append a confidence entry. Callers are responsible for uniqueness.
    pub fn append_confidence(&mut self, entry: ConfidenceEntry) {
        self.history.push(entry);
    }

    /// Links for a topic, if the topic has a resource row.
    pub fn resource(&self, topic: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.topic == topic)
    }

    /// Replace the study plan wholesale.
    pub fn replace_study_plan(&mut self, plan: Vec<StudyPlanEntry>) {
        self.study_plan = plan;
    }
}

/// A backend the tables are loaded from and written back to.
///
/// History and study plan are always written whole; there is no partial
/// update.
pub trait Storage: Send + Sync {
    /// Load every table. The study plan is optional and loads as empty when
    /// absent; any other missing table is an error.
    fn load(&self) -> Result<TabularStore>;

    /// Overwrite the confidence history.
    fn save_history(&self, history: &[ConfidenceEntry]) -> Result<()>;

    /// Overwrite the study plan.
    fn save_study_plan(&self, plan: &[StudyPlanEntry]) -> Result<()>;

    /// Read the persisted study plan. `None` means no plan was generated yet.
    fn load_study_plan(&self) -> Result<Option<Vec<StudyPlanEntry>>>;
}

/// In-process storage, for embedding the tracker and for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: Mutex<TabularStore>,
    plan_saved: Mutex<bool>,
}

impl MemoryStorage {
    /// Create storage seeded with the given tables.
    pub fn new(tables: TabularStore) -> Self {
        let plan_saved = !tables.study_plan.is_empty();
        Self {
            tables: Mutex::new(tables),
            plan_saved: Mutex::new(plan_saved),
        }
    }

    /// Snapshot of the persisted tables.
    pub fn snapshot(&self) -> Result<TabularStore> {
        self.load()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<TabularStore> {
        self.tables
            .lock()
            .map(|t| t.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn save_history(&self, history: &[ConfidenceEntry]) -> Result<()> {
        let mut tables = self.tables.lock().map_err(|_| StoreError::Poisoned)?;
        tables.history = history.to_vec();
        Ok(())
    }

    fn save_study_plan(&self, plan: &[StudyPlanEntry]) -> Result<()> {
        let mut tables = self.tables.lock().map_err(|_| StoreError::Poisoned)?;
        let mut saved = self.plan_saved.lock().map_err(|_| StoreError::Poisoned)?;
        tables.study_plan = plan.to_vec();
        *saved = true;
        Ok(())
    }

    fn load_study_plan(&self) -> Result<Option<Vec<StudyPlanEntry>>> {
        let tables = self.tables.lock().map_err(|_| StoreError::Poisoned)?;
        let saved = self.plan_saved.lock().map_err(|_| StoreError::Poisoned)?;
        Ok((*saved).then(|| tables.study_plan.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Relation;

    fn sample_store() -> TabularStore {
        let mut store = TabularStore::new();
        store.topic_relations = vec![TopicRelation::new("Loops", Relation::Prerequisite, "Variables")];
        store.students = vec![
            StudentRecord::new(StudentId(1), ["Variables", "Loops"]),
            StudentRecord::new(StudentId(2), Vec::<String>::new()),
        ];
        store.history = vec![
            ConfidenceEntry::new(StudentId(1), "Variables", Confidence::new(70)),
            ConfidenceEntry::new(StudentId(2), "Variables", Confidence::new(20)),
            ConfidenceEntry::new(StudentId(1), "Loops", Confidence::new(55)),
        ];
        store.resources = vec![Resource::new("Loops", "youtu.be/loops", "")];
        store
    }

    #[test]
    fn test_completed_topics_for_unknown_student() {
        let store = sample_store();
        assert_eq!(store.completed_topics(StudentId(1)), ["Variables", "Loops"]);
        assert!(store.completed_topics(StudentId(99)).is_empty());
        assert!(!store.is_completed(StudentId(99), "Loops"));
    }

    #[test]
    fn test_history_for_keeps_table_order() {
        let store = sample_store();
        let topics: Vec<_> = store
            .history_for(StudentId(1))
            .into_iter()
            .map(|e| e.topic.as_str())
            .collect();
        assert_eq!(topics, vec!["Variables", "Loops"]);
    }

    #[test]
    fn test_confidence_lookup() {
        let store = sample_store();
        assert_eq!(store.confidence(StudentId(2), "Variables"), Some(Confidence::new(20)));
        assert_eq!(store.confidence(StudentId(2), "Loops"), None);
    }

    #[test]
    fn test_resource_lookup() {
        let store = sample_store();
        assert_eq!(store.resource("Loops").unwrap().youtube, "https://youtu.be/loops");
        assert!(store.resource("Recursion").is_none());
    }

    #[test]
    fn test_memory_storage_plan_absent_until_saved() {
        let storage = MemoryStorage::new(sample_store());
        assert!(storage.load_study_plan().unwrap().is_none());

        let plan = vec![StudyPlanEntry {
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            topic: "Loops".to_string(),
            hours: 2,
        }];
        storage.save_study_plan(&plan).unwrap();
        assert_eq!(storage.load_study_plan().unwrap(), Some(plan));
    }

    #[test]
    fn test_memory_storage_save_history_overwrites() {
        let storage = MemoryStorage::new(sample_store());
        let history = vec![ConfidenceEntry::new(StudentId(5), "Sets", Confidence::new(60))];
        storage.save_history(&history).unwrap();
        assert_eq!(storage.snapshot().unwrap().history, history);
    }
}
