//! Record definitions for the tracker's tables.

mod confidence;
mod tables;

pub use confidence::*;
pub use tables::*;

use serde::{Deserialize, Serialize};

/// Identifier of a student, validated by the auth collaborator before it
/// reaches the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub i64);

impl StudentId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl From<i64> for StudentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StudentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// How two topics in the topic graph relate.
///
/// Parsed case-insensitively; unknown labels collapse to [`Relation::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Relation {
    /// The related topic must be learned before the source topic.
    Prerequisite,
    /// The related topic builds on the source topic.
    Advanced,
    #[default]
    Other,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Prerequisite => "prerequisite",
            Relation::Advanced => "advanced",
            Relation::Other => "other",
        }
    }
}

impl From<&str> for Relation {
    fn from(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "prerequisite" => Relation::Prerequisite,
            "advanced" => Relation::Advanced,
            _ => Relation::Other,
        }
    }
}

impl From<String> for Relation {
    fn from(label: String) -> Self {
        Relation::from(label.as_str())
    }
}

impl From<Relation> for String {
    fn from(relation: Relation) -> Self {
        relation.as_str().to_string()
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
