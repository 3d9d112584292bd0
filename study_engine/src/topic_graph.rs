//! Topic Graph - directed prerequisite/advanced relations between topics.

use learning_records::{Relation, TopicRelation};
use std::collections::HashMap;

/// Index over the topic relation table.
///
/// Edges keep their table order, which decides which relation wins when a
/// topic has several of the same kind.
#[derive(Debug, Clone, Default)]
pub struct TopicGraph {
    /// All edges in table order.
    edges: Vec<TopicRelation>,

    /// Index: source topic -> positions in `edges`.
    by_source: HashMap<String, Vec<usize>>,
}

impl TopicGraph {
    /// Create a new empty topic graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from relation rows.
    pub fn from_relations(relations: impl IntoIterator<Item = TopicRelation>) -> Self {
        let mut graph = Self::new();
        for relation in relations {
            graph.add_relation(relation);
        }
        graph
    }

    /// Add an edge after the existing ones.
    pub fn add_relation(&mut self, relation: TopicRelation) {
        let index = self.edges.len();
        self.by_source
            .entry(relation.topic.clone())
            .or_default()
            .push(index);
        self.edges.push(relation);
    }

    /// All edges in table order.
    pub fn edges(&self) -> &[TopicRelation] {
        &self.edges
    }

    /// Edges leaving a topic, in table order.
    pub fn outgoing<'a>(&'a self, topic: &str) -> impl Iterator<Item = &'a TopicRelation> + 'a {
        self.by_source
            .get(topic)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&i| &self.edges[i])
    }

    /// The first related topic of the given kind, skipping blank targets.
    pub fn first_related(&self, topic: &str, relation: Relation) -> Option<&str> {
        self.outgoing(topic)
            .find(|e| e.relation == relation && !e.related_topic.is_empty())
            .map(|e| e.related_topic.as_str())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl FromIterator<TopicRelation> for TopicGraph {
    fn from_iter<I: IntoIterator<Item = TopicRelation>>(iter: I) -> Self {
        Self::from_relations(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> TopicGraph {
        TopicGraph::from_relations([
            TopicRelation::new("Loops", Relation::Prerequisite, "Variables"),
            TopicRelation::new("Loops", Relation::Advanced, "Recursion"),
            TopicRelation::new("Loops", Relation::Prerequisite, "Conditionals"),
            TopicRelation::new("Recursion", Relation::Other, "Trees"),
            TopicRelation::new("Sorting", Relation::Prerequisite, ""),
        ])
    }

    #[test]
    fn test_first_related_uses_table_order() {
        let graph = sample_graph();
        assert_eq!(graph.first_related("Loops", Relation::Prerequisite), Some("Variables"));
        assert_eq!(graph.first_related("Loops", Relation::Advanced), Some("Recursion"));
        assert_eq!(graph.first_related("Recursion", Relation::Advanced), None);
        assert_eq!(graph.first_related("Unknown", Relation::Prerequisite), None);
    }

    #[test]
    fn test_blank_targets_are_ignored() {
        let graph = sample_graph();
        assert_eq!(graph.first_related("Sorting", Relation::Prerequisite), None);
        assert_eq!(graph.outgoing("Sorting").count(), 1);
    }

    #[test]
    fn test_edges_keep_table_order() {
        let graph = sample_graph();
        let targets: Vec<_> = graph.outgoing("Loops").map(|e| e.related_topic.as_str()).collect();
        assert_eq!(targets, vec!["Variables", "Recursion", "Conditionals"]);
        assert_eq!(graph.edges()[3].topic, "Recursion");
        assert_eq!(graph.edge_count(), 5);
        assert!(!graph.is_empty());
        assert!(TopicGraph::new().is_empty());
    }
}
