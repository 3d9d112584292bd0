//! Tracker - the shared entry point over one store.
//!
//! The tracker owns the in-memory tables behind a read/write lock. Every
//! operation that can change history or the study plan takes the write lock
//! and persists before releasing it, so concurrent callers never lose each
//! other's updates.

use learning_records::{
    Confidence, ConfidenceEntry, StoreError, Storage, StudentId, StudyPlanEntry, TabularStore,
};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::confidence::{self, ConfidenceSource, RandomSource};
use crate::config::TrackerConfig;
use crate::error::Result;
use crate::export::CalendarExport;
use crate::planner::{PlanRequest, StudyPlanBuilder};
use crate::progress::ProgressReport;
use crate::recommend::{AdaptiveTransform, Recommendation, RecommendationEngine, TopicScore};
use crate::topic_graph::TopicGraph;

struct TrackerState {
    store: TabularStore,
    source: Box<dyn ConfidenceSource>,
}

/// Learning-progress tracker over a storage backend.
pub struct Tracker<S: Storage> {
    storage: S,
    config: TrackerConfig,
    graph: TopicGraph,
    engine: RecommendationEngine,
    adaptive: AdaptiveTransform,
    planner: StudyPlanBuilder,
    state: RwLock<TrackerState>,
}

impl<S: Storage> Tracker<S> {
    /// Load all tables and build the topic graph.
    pub fn open(storage: S, config: TrackerConfig) -> Result<Self> {
        let source = RandomSource::new(&config.confidence);
        Self::with_source(storage, config, source)
    }

    /// Like [`Tracker::open`] with an explicit confidence source.
    pub fn with_source(
        storage: S,
        config: TrackerConfig,
        source: impl ConfidenceSource + 'static,
    ) -> Result<Self> {
        let store = storage.load()?;
        let graph: TopicGraph = store.topic_relations.iter().cloned().collect();
        if graph.is_empty() {
            warn!("Topic graph is empty, recommendations will be empty");
        }
        info!(
            edges = graph.edge_count(),
            students = store.students.len(),
            "Tracker ready"
        );

        Ok(Self {
            engine: RecommendationEngine::new(config.thresholds),
            adaptive: AdaptiveTransform::new(config.thresholds),
            planner: StudyPlanBuilder::new(config.planner.layout),
            storage,
            config,
            graph,
            state: RwLock::new(TrackerState {
                store,
                source: Box::new(source),
            }),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn graph(&self) -> &TopicGraph {
        &self.graph
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, TrackerState>> {
        Ok(self.state.read().map_err(|_| StoreError::Poisoned)?)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, TrackerState>> {
        Ok(self.state.write().map_err(|_| StoreError::Poisoned)?)
    }

    /// Persist history, restoring `previous` in memory if the write fails so
    /// memory never holds entries the store does not.
    fn save_history_or_restore(
        &self,
        store: &mut TabularStore,
        previous: Vec<ConfidenceEntry>,
    ) -> Result<()> {
        if let Err(e) = self.storage.save_history(&store.history) {
            warn!(error = %e, "Failed to persist history, discarding unsaved changes");
            store.history = previous;
            return Err(e.into());
        }
        Ok(())
    }

    /// Score missing completed topics and persist history if anything changed.
    fn ensure_locked(&self, state: &mut TrackerState, student: StudentId) -> Result<()> {
        let TrackerState { store, source } = state;
        let previous = store.history.clone();
        let created = confidence::ensure_confidence_scores(store, student, source.as_mut());
        if created > 0 {
            info!(%student, created, "Created confidence entries");
            self.save_history_or_restore(store, previous)?;
        }
        Ok(())
    }

    /// Student ids in table order.
    pub fn list_students(&self) -> Result<Vec<StudentId>> {
        Ok(self.read()?.store.list_students())
    }

    /// Make sure every completed topic has a confidence entry and return the
    /// student's entries in table order.
    pub fn ensure_confidence_scores(&self, student: StudentId) -> Result<Vec<ConfidenceEntry>> {
        let mut state = self.write()?;
        self.ensure_locked(&mut state, student)?;
        Ok(state.store.history_for(student).into_iter().cloned().collect())
    }

    /// Ranked recommendations for a student, weakest first.
    pub fn next_recommendations(&self, student: StudentId) -> Result<Vec<Recommendation>> {
        let mut state = self.write()?;
        self.ensure_locked(&mut state, student)?;
        let recommendations = self.engine.next_recommendations(&self.graph, &state.store, student);
        debug!(%student, count = recommendations.len(), "Computed recommendations");
        Ok(recommendations)
    }

    /// Apply the adaptive transform to any topic list.
    pub fn adapt<T: TopicScore>(&self, student: StudentId, input: &[T]) -> Result<Vec<Recommendation>> {
        let state = self.read()?;
        Ok(self.adaptive.adapt(&self.graph, &state.store, student, input))
    }

    /// Recommendations followed by the adaptive transform.
    pub fn adaptive_recommendations(&self, student: StudentId) -> Result<Vec<Recommendation>> {
        let mut state = self.write()?;
        self.ensure_locked(&mut state, student)?;
        let base = self.engine.next_recommendations(&self.graph, &state.store, student);
        Ok(self.adaptive.adapt(&self.graph, &state.store, student, &base))
    }

    /// Recommendations relabeled for review instead of redirected.
    pub fn review_recommendations(&self, student: StudentId) -> Result<Vec<Recommendation>> {
        let base = self.next_recommendations(student)?;
        Ok(self.adaptive.relabel_for_review(base))
    }

    /// Strengths, weaknesses, average and badges for a student.
    pub fn progress(&self, student: StudentId) -> Result<ProgressReport> {
        let entries = self.ensure_confidence_scores(student)?;
        Ok(ProgressReport::from_entries(student, entries, &self.config.thresholds))
    }

    /// Record a study session's gain for a topic and persist history.
    pub fn record_study(&self, student: StudentId, topic: &str, gain: u32) -> Result<Confidence> {
        let mut state = self.write()?;
        let previous = state.store.history.clone();
        let confidence = confidence::apply_gain(&mut state.store, student, topic, gain);
        self.save_history_or_restore(&mut state.store, previous)?;
        info!(%student, topic, gain, %confidence, "Recorded study session");
        Ok(confidence)
    }

    /// What a topic's confidence might become after one more session.
    pub fn expected_confidence_gain(&self, student: StudentId, topic: &str) -> Result<Confidence> {
        let mut state = self.write()?;
        self.ensure_locked(&mut state, student)?;
        let TrackerState { store, source } = &mut *state;
        Ok(confidence::expected_gain(store, student, topic, source.as_mut()))
    }

    /// Build a study plan, replace the current one and persist it.
    pub fn create_plan(&self, request: &PlanRequest) -> Result<Vec<StudyPlanEntry>> {
        let plan = self.planner.build(request)?;
        let mut state = self.write()?;
        self.storage.save_study_plan(&plan)?;
        state.store.replace_study_plan(plan.clone());
        info!(entries = plan.len(), start = %request.start, "Created study plan");
        Ok(plan)
    }

    /// The plan held in memory, empty if none was generated.
    pub fn current_plan(&self) -> Result<Vec<StudyPlanEntry>> {
        Ok(self.read()?.store.study_plan.clone())
    }

    /// The plan as persisted. `None` means no plan was generated yet.
    pub fn stored_plan(&self) -> Result<Option<Vec<StudyPlanEntry>>> {
        Ok(self.storage.load_study_plan()?)
    }

    /// Export the persisted plan through a calendar collaborator.
    pub fn export_plan(&self, exporter: &dyn CalendarExport) -> Result<Option<Vec<u8>>> {
        match self.stored_plan()? {
            Some(plan) => Ok(Some(exporter.export(&plan)?)),
            None => Ok(None),
        }
    }
}
