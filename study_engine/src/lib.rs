//! # Study Engine
//!
//! Turns a student's recorded confidence into study advice. This crate reads
//! the tables kept by `learning_records`, walks the topic graph and produces
//! ranked topic suggestions, adaptive redirections and study plans.
//!
//! ## Core Components
//!
//! - **topic_graph**: Index over prerequisite/advanced relations between topics
//! - **confidence**: Ensures every completed topic has a confidence score
//! - **recommend**: Candidate selection and the adaptive transform
//! - **planner**: Lays topics out over calendar days
//! - **progress**: Strengths, weaknesses, badges and list helpers
//! - **tracker**: Shared entry point that owns the store and serializes writes

pub mod config;
pub mod confidence;
pub mod error;
pub mod export;
pub mod planner;
pub mod progress;
pub mod recommend;
pub mod topic_graph;
pub mod tracker;

pub use config::*;
pub use confidence::*;
pub use error::*;
pub use export::*;
pub use planner::*;
pub use progress::*;
pub use recommend::*;
pub use topic_graph::*;
pub use tracker::*;
