use serde::{Deserialize, Serialize};

use crate::performance::PerformanceSnapshot;

//
// ─── LIMITS ────────────────────────────────────────────────────────────────────
//

/// Age below which the shorter test applies.
const YOUNG_AGE_CUTOFF: u8 = 13;

const MAX_QUESTIONS_YOUNG: usize = 10;
const MAX_QUESTIONS_ADULT: usize = 15;
const MIN_QUESTIONS_YOUNG: usize = 5;
const MIN_QUESTIONS_ADULT: usize = 7;

/// A level's accuracy needs at least this many answers to count as evidence.
const CONSISTENCY_MIN_SAMPLE: u32 = 3;
const CONSISTENCY_HIGH_PCT: f64 = 80.0;
const CONSISTENCY_LOW_PCT: f64 = 30.0;

/// Hard cap on questions for this attempt, from the declared age.
#[must_use]
pub fn max_questions(age: u8) -> usize {
    if age < YOUNG_AGE_CUTOFF {
        MAX_QUESTIONS_YOUNG
    } else {
        MAX_QUESTIONS_ADULT
    }
}

/// Floor before any early stop may trigger, from the declared age.
#[must_use]
pub fn min_questions(age: u8) -> usize {
    if age < YOUNG_AGE_CUTOFF {
        MIN_QUESTIONS_YOUNG
    } else {
        MIN_QUESTIONS_ADULT
    }
}

//
// ─── DECISION ──────────────────────────────────────────────────────────────────
//

/// Why an attempt stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The hard question cap was reached.
    MaxReached,
    /// Some level's accuracy was consistently high or low on enough samples.
    ConsistentPerformance,
    /// No unused question was left at any level. Always forced by the
    /// caller when selection returns nothing, whatever the policy said.
    PoolExhausted,
}

/// Continue/stop verdict after one answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Continue,
    Stop(StopReason),
}

impl Decision {
    #[must_use]
    pub fn should_continue(&self) -> bool {
        matches!(self, Decision::Continue)
    }
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// Termination policy for one attempt.
///
/// Two variants of the stopping rule were in use; rather than silently
/// picking one, both are explicit and the caller chooses:
///
/// - `RunToMax` runs until the age-derived question cap.
/// - `Adaptive` (default) adds a minimum-question floor and stops early
///   once some level shows a consistent signal: accuracy above 80% or
///   below 30% on at least 3 answers at that level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationPolicy {
    RunToMax,
    #[default]
    Adaptive,
}

impl TerminationPolicy {
    /// Decide whether to present another question.
    ///
    /// Rules are evaluated in order: below the floor always continues, the
    /// cap always stops, then the consistency signal may stop early. The
    /// floor and the signal only exist under `Adaptive`.
    #[must_use]
    pub fn decide(&self, age: u8, answered: usize, snapshot: &PerformanceSnapshot) -> Decision {
        match self {
            TerminationPolicy::RunToMax => {
                if answered >= max_questions(age) {
                    Decision::Stop(StopReason::MaxReached)
                } else {
                    Decision::Continue
                }
            }
            TerminationPolicy::Adaptive => {
                if answered < min_questions(age) {
                    Decision::Continue
                } else if answered >= max_questions(age) {
                    Decision::Stop(StopReason::MaxReached)
                } else if has_consistent_signal(snapshot) {
                    Decision::Stop(StopReason::ConsistentPerformance)
                } else {
                    Decision::Continue
                }
            }
        }
    }
}

/// True when any level has gathered enough answers to call the performance
/// there decisively good or decisively poor.
#[must_use]
pub fn has_consistent_signal(snapshot: &PerformanceSnapshot) -> bool {
    snapshot.by_level.values().any(|tally| {
        tally.total >= CONSISTENCY_MIN_SAMPLE
            && (tally.accuracy() > CONSISTENCY_HIGH_PCT || tally.accuracy() < CONSISTENCY_LOW_PCT)
    })
}

/// Fraction of the attempt completed, for progress reporting. Clamped to 1.
#[must_use]
pub fn progress_ratio(answered: usize, age: u8) -> f64 {
    let max = max_questions(age);
    if max == 0 {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = answered as f64 / max as f64;
    ratio.min(1.0)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CefrLevel;
    use crate::performance::LevelTally;

    fn snapshot_with(level: CefrLevel, correct: u32, total: u32) -> PerformanceSnapshot {
        let mut snapshot = PerformanceSnapshot::default();
        snapshot.by_level.insert(level, LevelTally { correct, total });
        snapshot.total_answered = total;
        snapshot.correct_count = correct;
        snapshot.percentage_correct = LevelTally { correct, total }.accuracy();
        snapshot
    }

    #[test]
    fn limits_follow_age_cutoff() {
        assert_eq!(max_questions(10), 10);
        assert_eq!(max_questions(12), 10);
        assert_eq!(max_questions(13), 15);
        assert_eq!(max_questions(40), 15);

        assert_eq!(min_questions(10), 5);
        assert_eq!(min_questions(13), 7);
    }

    #[test]
    fn adaptive_never_stops_below_the_floor() {
        // 3/3 at B1 is a consistent signal, but only 3 answers total.
        let snapshot = snapshot_with(CefrLevel::B1, 3, 3);
        let decision = TerminationPolicy::Adaptive.decide(25, 3, &snapshot);
        assert_eq!(decision, Decision::Continue);
    }

    #[test]
    fn adaptive_stops_at_the_cap() {
        let snapshot = snapshot_with(CefrLevel::B1, 8, 15);
        let decision = TerminationPolicy::Adaptive.decide(25, 15, &snapshot);
        assert_eq!(decision, Decision::Stop(StopReason::MaxReached));
    }

    #[test]
    fn adaptive_stops_early_on_high_consistency() {
        // 100% over 3 B1 answers, past the adult floor of 7.
        let mut snapshot = snapshot_with(CefrLevel::B1, 3, 3);
        snapshot.total_answered = 7;
        let decision = TerminationPolicy::Adaptive.decide(25, 7, &snapshot);
        assert_eq!(decision, Decision::Stop(StopReason::ConsistentPerformance));
    }

    #[test]
    fn adaptive_stops_early_on_low_consistency() {
        let mut snapshot = snapshot_with(CefrLevel::A2, 0, 4);
        snapshot.total_answered = 8;
        let decision = TerminationPolicy::Adaptive.decide(30, 8, &snapshot);
        assert_eq!(decision, Decision::Stop(StopReason::ConsistentPerformance));
    }

    #[test]
    fn middling_accuracy_is_not_consistent() {
        // 50% over 4 answers sits between both thresholds.
        let snapshot = snapshot_with(CefrLevel::B1, 2, 4);
        assert!(!has_consistent_signal(&snapshot));
        let decision = TerminationPolicy::Adaptive.decide(25, 8, &snapshot);
        assert_eq!(decision, Decision::Continue);
    }

    #[test]
    fn small_sample_is_not_consistent() {
        // 2/2 is 100% but below the 3-answer evidence bar.
        let snapshot = snapshot_with(CefrLevel::C1, 2, 2);
        assert!(!has_consistent_signal(&snapshot));
    }

    #[test]
    fn boundary_accuracies_do_not_trigger() {
        // Exactly 80% and exactly 30% are strict bounds.
        let high = snapshot_with(CefrLevel::B1, 4, 5);
        assert!(!has_consistent_signal(&high));
        let low = snapshot_with(CefrLevel::B1, 3, 10);
        assert!(!has_consistent_signal(&low));
    }

    #[test]
    fn run_to_max_ignores_consistency_and_floor() {
        let snapshot = snapshot_with(CefrLevel::B1, 5, 5);
        assert_eq!(
            TerminationPolicy::RunToMax.decide(25, 9, &snapshot),
            Decision::Continue
        );
        assert_eq!(
            TerminationPolicy::RunToMax.decide(25, 15, &snapshot),
            Decision::Stop(StopReason::MaxReached)
        );
    }

    #[test]
    fn young_learner_uses_shorter_test() {
        let snapshot = PerformanceSnapshot::default();
        assert_eq!(
            TerminationPolicy::Adaptive.decide(10, 10, &snapshot),
            Decision::Stop(StopReason::MaxReached)
        );
        assert_eq!(
            TerminationPolicy::RunToMax.decide(10, 9, &snapshot),
            Decision::Continue
        );
    }

    #[test]
    fn progress_ratio_clamps_to_one() {
        assert_eq!(progress_ratio(0, 25), 0.0);
        assert!((progress_ratio(5, 25) - 5.0 / 15.0).abs() < f64::EPSILON);
        assert_eq!(progress_ratio(20, 25), 1.0);
        assert_eq!(progress_ratio(10, 10), 1.0);
    }
}
