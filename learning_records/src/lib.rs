//! # Learning Records
//!
//! The record book of the study tracker. Holds the tables a student's
//! learning progress is derived from (topic relations, completed topics,
//! confidence history, learning resources and the current study plan) and
//! the storage backends that load and persist them.
//!
//! This crate is the single source of truth for tabular state and does not
//! contain any recommendation logic.

pub mod error;
pub mod records;
pub mod store;

pub use error::*;
pub use records::*;
pub use store::*;
