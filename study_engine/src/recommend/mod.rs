//! Recommendations - picks the topics a student should study next.
//!
//! Candidate selection works in three steps:
//! 1. **Scan**: Walk every topic relation once, skipping completed sources
//! 2. **Redirect**: Weak topics whose prerequisite is still open point at the prerequisite
//! 3. **Rank**: Attach confidence and links, weakest first
//!
//! The adaptive transform in [`adaptive`] post-processes that list.

mod adaptive;

pub use adaptive::*;

use learning_records::{Confidence, Relation, StudentId, TabularStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::config::Thresholds;
use crate::topic_graph::TopicGraph;

/// Why a topic ended up in a recommendation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Study the topic itself.
    Focus,
    /// Redirected to a prerequisite of a weak topic.
    Prerequisite,
    /// Redirected to a follow-up of a strong topic.
    Advanced,
    /// Already strong, revisit occasionally.
    Review,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Focus => write!(f, "focus"),
            Strategy::Prerequisite => write!(f, "prerequisite"),
            Strategy::Advanced => write!(f, "advanced"),
            Strategy::Review => write!(f, "review"),
        }
    }
}

/// A suggested topic with its current confidence and learning links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub topic: String,
    pub confidence: Confidence,
    pub youtube: String,
    pub docs: String,
    /// Topic this record was redirected from by the adaptive transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapted_from: Option<String>,
    pub strategy: Strategy,
}

impl Recommendation {
    /// Build a record for a topic, defaulting missing data to zero confidence
    /// and empty links.
    pub fn lookup(store: &TabularStore, student: StudentId, topic: &str, strategy: Strategy) -> Self {
        let (youtube, docs) = store
            .resource(topic)
            .map(|r| (r.youtube.clone(), r.docs.clone()))
            .unwrap_or_default();
        Self {
            topic: topic.to_string(),
            confidence: store.confidence(student, topic).unwrap_or_default(),
            youtube,
            docs,
            adapted_from: None,
            strategy,
        }
    }
}

/// Produces ranked topic suggestions from the topic graph.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    thresholds: Thresholds,
}

impl RecommendationEngine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Collect candidate topics for a student.
    ///
    /// For every edge whose source is not completed:
    /// - a weak source with an open prerequisite adds the prerequisite
    /// - any non-prerequisite edge, or one whose prerequisite is done, adds the source
    pub fn candidate_topics(
        &self,
        graph: &TopicGraph,
        store: &TabularStore,
        student: StudentId,
    ) -> BTreeSet<String> {
        let mut candidates = BTreeSet::new();

        for edge in graph.edges() {
            if store.is_completed(student, &edge.topic) {
                continue;
            }

            let confidence = store.confidence(student, &edge.topic).unwrap_or_default();
            let related_done = store.is_completed(student, &edge.related_topic);
            let is_prerequisite = edge.relation == Relation::Prerequisite;

            if is_prerequisite
                && self.thresholds.is_weak(confidence)
                && !related_done
                && !edge.related_topic.is_empty()
            {
                debug!(
                    topic = %edge.topic,
                    prerequisite = %edge.related_topic,
                    %confidence,
                    "Redirecting weak topic to prerequisite"
                );
                candidates.insert(edge.related_topic.clone());
            }

            if !is_prerequisite || related_done {
                candidates.insert(edge.topic.clone());
            }
        }

        candidates
    }

    /// Ranked recommendations, weakest first; ties ordered by topic name.
    ///
    /// Expects confidence scores to have been ensured for the student.
    pub fn next_recommendations(
        &self,
        graph: &TopicGraph,
        store: &TabularStore,
        student: StudentId,
    ) -> Vec<Recommendation> {
        let mut recommendations: Vec<_> = self
            .candidate_topics(graph, store, student)
            .iter()
            .map(|topic| Recommendation::lookup(store, student, topic, Strategy::Focus))
            .collect();

        // Candidates arrive sorted by name, so a stable sort keeps name order
        // among equal confidences.
        recommendations.sort_by_key(|r| r.confidence);
        recommendations
    }
}
