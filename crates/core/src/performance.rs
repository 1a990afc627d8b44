use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{CefrLevel, QuestionId, QuestionPool};

//
// ─── LEVEL TALLY ───────────────────────────────────────────────────────────────
//

/// Correct/total counters for one difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelTally {
    pub correct: u32,
    pub total: u32,
}

impl LevelTally {
    /// Accuracy as a percentage in `[0, 100]`; `0` when nothing was answered.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * f64::from(self.correct) / f64::from(self.total)
        }
    }
}

//
// ─── PERFORMANCE SNAPSHOT ──────────────────────────────────────────────────────
//

/// Derived view of the answer history at a point in time.
///
/// Recomputed from scratch after every answer; never patched incrementally
/// and never persisted apart from the logs it was derived from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub correct_count: u32,
    pub total_answered: u32,
    pub percentage_correct: f64,
    pub by_level: BTreeMap<CefrLevel, LevelTally>,
}

impl PerformanceSnapshot {
    /// Tally for `level`, zero when the level was never visited.
    #[must_use]
    pub fn level(&self, level: CefrLevel) -> LevelTally {
        self.by_level.get(&level).copied().unwrap_or_default()
    }
}

//
// ─── AGGREGATION ───────────────────────────────────────────────────────────────
//

/// Reduce the paired (question, answer) history into a snapshot.
///
/// Pairs are truncated to the shorter of the two logs, so a question that is
/// presented but not yet answered never counts. One pass, order-independent
/// totals, strict string match for correctness.
#[must_use]
pub fn aggregate(
    pool: &QuestionPool,
    selected: &[QuestionId],
    answers: &[String],
) -> PerformanceSnapshot {
    let mut snapshot = PerformanceSnapshot::default();

    for (id, answer) in selected.iter().zip(answers.iter()) {
        let Some(question) = pool.get(*id) else {
            continue;
        };

        let tally = snapshot.by_level.entry(question.level()).or_default();
        tally.total = tally.total.saturating_add(1);
        snapshot.total_answered = snapshot.total_answered.saturating_add(1);

        if question.is_correct(answer) {
            tally.correct = tally.correct.saturating_add(1);
            snapshot.correct_count = snapshot.correct_count.saturating_add(1);
        }
    }

    snapshot.percentage_correct = if snapshot.total_answered == 0 {
        0.0
    } else {
        100.0 * f64::from(snapshot.correct_count) / f64::from(snapshot.total_answered)
    };

    snapshot
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
