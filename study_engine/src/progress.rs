//! Progress reports, badges and helpers for presenting recommendation lists.

use learning_records::{Confidence, ConfidenceEntry, StudentId};
use serde::{Deserialize, Serialize};

use crate::config::Thresholds;
use crate::error::ValidationError;

/// Confidence from which a student counts as a high achiever.
pub const HIGH_ACHIEVER_FROM: u8 = 90;

/// Strengths needed for the consistency badge.
pub const CONSISTENCY_STRENGTHS: usize = 3;

/// Default page size for recommendation lists.
pub const DEFAULT_PER_PAGE: usize = 5;

/// Where a confidence value falls relative to the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    Weak,
    Moderate,
    Strong,
}

impl ConfidenceBand {
    pub fn of(confidence: Confidence, thresholds: &Thresholds) -> Self {
        if thresholds.is_weak(confidence) {
            ConfidenceBand::Weak
        } else if thresholds.is_strong(confidence) {
            ConfidenceBand::Strong
        } else {
            ConfidenceBand::Moderate
        }
    }
}

/// Filter for recommendation lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceFilter {
    #[default]
    All,
    Weak,
    Moderate,
    Strong,
}

impl ConfidenceFilter {
    pub fn matches(&self, confidence: Confidence, thresholds: &Thresholds) -> bool {
        let band = ConfidenceBand::of(confidence, thresholds);
        match self {
            ConfidenceFilter::All => true,
            ConfidenceFilter::Weak => band == ConfidenceBand::Weak,
            ConfidenceFilter::Moderate => band == ConfidenceBand::Moderate,
            ConfidenceFilter::Strong => band == ConfidenceBand::Strong,
        }
    }
}

impl std::str::FromStr for ConfidenceFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ConfidenceFilter::All),
            "weak" => Ok(ConfidenceFilter::Weak),
            "moderate" => Ok(ConfidenceFilter::Moderate),
            "strong" => Ok(ConfidenceFilter::Strong),
            _ => Err(ValidationError::UnknownFilter(s.to_string())),
        }
    }
}

/// Achievement badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Badge {
    /// At least three strong topics.
    ConsistencyStar,
    /// Some progress recorded and nothing weak.
    ImprovementBadge,
    /// At least one topic at 90 or above.
    HighAchiever,
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Badge::ConsistencyStar => write!(f, "Consistency Star"),
            Badge::ImprovementBadge => write!(f, "Improvement Badge"),
            Badge::HighAchiever => write!(f, "High Achiever"),
        }
    }
}

/// Badges earned by a set of confidence values.
pub fn badges<I>(confidences: I, thresholds: &Thresholds) -> Vec<Badge>
where
    I: IntoIterator<Item = Confidence>,
{
    let mut total = 0;
    let mut strong = 0;
    let mut weak = 0;
    let mut best = Confidence::MIN;

    for confidence in confidences {
        total += 1;
        if thresholds.is_strong(confidence) {
            strong += 1;
        }
        if thresholds.is_weak(confidence) {
            weak += 1;
        }
        best = best.max(confidence);
    }

    let mut earned = Vec::new();
    if strong >= CONSISTENCY_STRENGTHS {
        earned.push(Badge::ConsistencyStar);
    }
    if total > 0 && weak == 0 {
        earned.push(Badge::ImprovementBadge);
    }
    if best.value() >= HIGH_ACHIEVER_FROM {
        earned.push(Badge::HighAchiever);
    }
    earned
}

/// Summary of a student's confidence history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub student_id: StudentId,
    pub entries: Vec<ConfidenceEntry>,
    /// Mean confidence rounded to two decimals, 0 without entries.
    pub average: f64,
    pub strengths: Vec<ConfidenceEntry>,
    pub weaknesses: Vec<ConfidenceEntry>,
    pub badges: Vec<Badge>,
}

impl ProgressReport {
    pub fn from_entries(student_id: StudentId, entries: Vec<ConfidenceEntry>, thresholds: &Thresholds) -> Self {
        let average = if entries.is_empty() {
            0.0
        } else {
            let sum: f64 = entries.iter().map(|e| f64::from(e.confidence.value())).sum();
            (sum / entries.len() as f64 * 100.0).round() / 100.0
        };
        let strengths = entries
            .iter()
            .filter(|e| thresholds.is_strong(e.confidence))
            .cloned()
            .collect();
        let weaknesses = entries
            .iter()
            .filter(|e| thresholds.is_weak(e.confidence))
            .cloned()
            .collect();
        let badges = badges(entries.iter().map(|e| e.confidence), thresholds);

        Self {
            student_id,
            entries,
            average,
            strengths,
            weaknesses,
            badges,
        }
    }
}

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Slice out a page. Page and page size below 1 are raised to 1; a page past
/// the end is empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total = items.len();
    let start = (page - 1).saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);

    Page {
        items: items[start..end].to_vec(),
        page,
        per_page,
        total,
        total_pages: total.div_ceil(per_page),
    }
}
