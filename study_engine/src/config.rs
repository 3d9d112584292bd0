//! Tracker configuration, read from TOML.
//!
//! Every section and field is optional:
//!
//! ```toml
//! [data]
//! dir = "data"
//!
//! [thresholds]
//! weak_below = 50
//! strong_from = 80
//!
//! [confidence]
//! seed = 7
//!
//! [planner]
//! layout = "weekly_reset"
//! ```

use learning_records::{Confidence, DataPaths};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TrackerError};
use crate::planner::PlanLayout;

/// Complete tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrackerConfig {
    pub data: DataPaths,
    pub thresholds: Thresholds,
    pub confidence: ConfidenceConfig,
    pub planner: PlannerConfig,
}

impl TrackerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: TrackerConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| TrackerError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.thresholds.weak_below > self.thresholds.strong_from {
            return Err(TrackerError::Config(format!(
                "weak_below ({}) must not exceed strong_from ({})",
                self.thresholds.weak_below, self.thresholds.strong_from
            )));
        }
        let c = &self.confidence;
        if c.initial_min > c.initial_max || c.initial_max > 100 {
            return Err(TrackerError::Config(format!(
                "initial confidence range {}..={} must lie within 0..=100",
                c.initial_min, c.initial_max
            )));
        }
        if c.gain_min > c.gain_max {
            return Err(TrackerError::Config(format!(
                "gain range {}..={} is empty",
                c.gain_min, c.gain_max
            )));
        }
        Ok(())
    }
}

/// Confidence cut-offs shared by the engine, the adaptive transform and
/// progress reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Below this a topic is weak and gets redirected to its prerequisite.
    pub weak_below: u8,
    /// From this up a topic is strong and may advance.
    pub strong_from: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            weak_below: 50,
            strong_from: 80,
        }
    }
}

impl Thresholds {
    pub fn is_weak(&self, confidence: Confidence) -> bool {
        confidence.value() < self.weak_below
    }

    pub fn is_strong(&self, confidence: Confidence) -> bool {
        confidence.value() >= self.strong_from
    }
}

/// Ranges for generated confidence values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Lowest initial confidence for a completed topic.
    pub initial_min: u8,
    /// Highest initial confidence for a completed topic.
    pub initial_max: u8,
    /// Smallest gain from one study session.
    pub gain_min: u32,
    /// Largest gain from one study session.
    pub gain_max: u32,
    /// Seed for reproducible runs. Entropy is used when absent.
    pub seed: Option<u64>,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            initial_min: 50,
            initial_max: 100,
            gain_min: 5,
            gain_max: 15,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlannerConfig {
    pub layout: PlanLayout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TrackerConfig::from_toml_str("").unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.thresholds.weak_below, 50);
        assert_eq!(config.thresholds.strong_from, 80);
        assert_eq!(config.data.history, "history.csv");
        assert_eq!(config.planner.layout, PlanLayout::Sequential);
    }

    #[test]
    fn test_partial_config() {
        let config = TrackerConfig::from_toml_str(
            r#"
            [data]
            dir = "/srv/tracker"

            [confidence]
            seed = 42

            [planner]
            layout = "weekly_reset"
            "#,
        )
        .unwrap();

        assert_eq!(config.data.dir, PathBuf::from("/srv/tracker"));
        assert_eq!(config.data.students, "student_data.csv");
        assert_eq!(config.confidence.seed, Some(42));
        assert_eq!(config.confidence.initial_min, 50);
        assert_eq!(config.planner.layout, PlanLayout::WeeklyReset);
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let err = TrackerConfig::from_toml_str("[thresholds]\nweak_below = 90\nstrong_from = 80\n");
        assert!(matches!(err, Err(TrackerError::Config(_))));

        let err = TrackerConfig::from_toml_str("[confidence]\ninitial_min = 60\ninitial_max = 40\n");
        assert!(matches!(err, Err(TrackerError::Config(_))));

        let err = TrackerConfig::from_toml_str("[planner]\nlayout = \"zigzag\"\n");
        assert!(matches!(err, Err(TrackerError::ConfigParse(_))));
    }

    #[test]
    fn test_threshold_checks() {
        let thresholds = Thresholds::default();
        assert!(thresholds.is_weak(Confidence::new(49)));
        assert!(!thresholds.is_weak(Confidence::new(50)));
        assert!(thresholds.is_strong(Confidence::new(80)));
        assert!(!thresholds.is_strong(Confidence::new(79)));
    }
}
