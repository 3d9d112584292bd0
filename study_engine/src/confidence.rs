//! Confidence tracking - lazily scores completed topics and applies gains.

use learning_records::{Confidence, ConfidenceEntry, StudentId, TabularStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use tracing::debug;

use crate::config::ConfidenceConfig;

/// Source of generated confidence values.
///
/// Injected so tests and reproducible runs can pin the values.
pub trait ConfidenceSource: Send + Sync {
    /// Confidence for a completed topic that has no score yet.
    fn initial_confidence(&mut self) -> Confidence;

    /// Expected gain from one study session.
    fn study_gain(&mut self) -> u32;
}

/// Pseudo-random confidence values from a seedable generator.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
    initial: RangeInclusive<u8>,
    gain: RangeInclusive<u32>,
}

impl RandomSource {
    /// Create a source from configuration, seeded if a seed is set.
    pub fn new(config: &ConfidenceConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let initial_max = config.initial_max.min(100);
        Self {
            rng,
            initial: config.initial_min.min(initial_max)..=initial_max,
            gain: config.gain_min.min(config.gain_max)..=config.gain_max,
        }
    }

    /// Default ranges with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(&ConfidenceConfig {
            seed: Some(seed),
            ..Default::default()
        })
    }
}

impl ConfidenceSource for RandomSource {
    fn initial_confidence(&mut self) -> Confidence {
        Confidence::new(i64::from(self.rng.gen_range(self.initial.clone())))
    }

    fn study_gain(&mut self) -> u32 {
        self.rng.gen_range(self.gain.clone())
    }
}

/// Give every completed topic of a student a confidence entry.
///
/// Missing entries are appended with a generated value; existing entries are
/// left untouched. Returns how many entries were created. Unknown students
/// have no completed topics and get nothing.
pub fn ensure_confidence_scores(
    store: &mut TabularStore,
    student: StudentId,
    source: &mut dyn ConfidenceSource,
) -> usize {
    let completed = store.completed_topics(student).to_vec();
    let mut created = 0;

    for topic in completed {
        if store.confidence(student, &topic).is_some() {
            continue;
        }
        let confidence = source.initial_confidence();
        debug!(%student, topic = %topic, %confidence, "Generated initial confidence");
        store.append_confidence(ConfidenceEntry::new(student, topic, confidence));
        created += 1;
    }

    created
}

/// Add a study gain to a topic, creating the entry if needed.
///
/// The result is clamped to 100.
pub fn apply_gain(store: &mut TabularStore, student: StudentId, topic: &str, gain: u32) -> Confidence {
    match store.confidence_mut(student, topic) {
        Some(entry) => {
            entry.confidence = entry.confidence.with_gain(gain);
            entry.confidence
        }
        None => {
            let confidence = Confidence::MIN.with_gain(gain);
            store.append_confidence(ConfidenceEntry::new(student, topic, confidence));
            confidence
        }
    }
}

/// Current confidence plus one generated study gain, capped at 100.
///
/// Does not modify the store.
pub fn expected_gain(
    store: &TabularStore,
    student: StudentId,
    topic: &str,
    source: &mut dyn ConfidenceSource,
) -> Confidence {
    store
        .confidence(student, topic)
        .unwrap_or_default()
        .with_gain(source.study_gain())
}
