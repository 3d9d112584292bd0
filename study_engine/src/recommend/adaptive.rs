//! Adaptive transform - redirects recommendations along the topic graph.

use learning_records::{Confidence, Relation, StudentId, TabularStore};
use std::collections::HashSet;
use tracing::debug;

use super::{Recommendation, Strategy};
use crate::config::Thresholds;
use crate::topic_graph::TopicGraph;

/// Anything that names a topic and may carry a known confidence.
pub trait TopicScore {
    fn topic(&self) -> &str;

    /// Confidence supplied with the input. When `None` it is looked up.
    fn known_confidence(&self) -> Option<Confidence> {
        None
    }
}

impl TopicScore for Recommendation {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn known_confidence(&self) -> Option<Confidence> {
        Some(self.confidence)
    }
}

impl TopicScore for String {
    fn topic(&self) -> &str {
        self
    }
}

impl TopicScore for &str {
    fn topic(&self) -> &str {
        self
    }
}

impl TopicScore for (String, Confidence) {
    fn topic(&self) -> &str {
        &self.0
    }

    fn known_confidence(&self) -> Option<Confidence> {
        Some(self.1)
    }
}

/// Redirects weak topics to prerequisites and strong topics to advanced
/// follow-ups.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveTransform {
    thresholds: Thresholds,
}

impl AdaptiveTransform {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Choose the topic and strategy for one input topic.
    pub fn redirect<'a>(
        &self,
        graph: &'a TopicGraph,
        topic: &'a str,
        confidence: Confidence,
    ) -> (&'a str, Strategy) {
        let target = if self.thresholds.is_weak(confidence) {
            graph
                .first_related(topic, Relation::Prerequisite)
                .map(|t| (t, Strategy::Prerequisite))
        } else if self.thresholds.is_strong(confidence) {
            graph
                .first_related(topic, Relation::Advanced)
                .map(|t| (t, Strategy::Advanced))
        } else {
            None
        };
        target.unwrap_or((topic, Strategy::Focus))
    }

    /// Transform a recommendation list, in input order.
    ///
    /// A record whose resulting topic was already emitted is dropped, so the
    /// output is never longer than the input and has no duplicate topics.
    /// Missing graph rows, history or resources fall back to the input
    /// topic, zero confidence and empty links.
    pub fn adapt<T: TopicScore>(
        &self,
        graph: &TopicGraph,
        store: &TabularStore,
        student: StudentId,
        input: &[T],
    ) -> Vec<Recommendation> {
        let mut emitted: HashSet<&str> = HashSet::new();
        let mut output = Vec::with_capacity(input.len());

        for item in input {
            let base = item.topic();
            let confidence = item
                .known_confidence()
                .unwrap_or_else(|| store.confidence(student, base).unwrap_or_default());

            let (topic, strategy) = self.redirect(graph, base, confidence);
            if !emitted.insert(topic) {
                debug!(from = %base, topic = %topic, "Dropping duplicate adapted topic");
                continue;
            }

            let mut record = Recommendation::lookup(store, student, topic, strategy);
            record.adapted_from = Some(base.to_string());
            output.push(record);
        }

        output
    }

    /// Relabel without redirecting: weakest first, strong topics marked for
    /// review and the rest for focus.
    pub fn relabel_for_review(&self, mut recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
        recommendations.sort_by_key(|r| r.confidence);
        for record in &mut recommendations {
            record.strategy = if self.thresholds.is_strong(record.confidence) {
                Strategy::Review
            } else {
                Strategy::Focus
            };
        }
        recommendations
    }
}
