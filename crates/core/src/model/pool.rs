use std::collections::HashSet;

use crate::model::ids::QuestionId;
use crate::model::level::CefrLevel;
use crate::model::question::{Question, QuestionDraft, QuestionValidationError};

//
// ─── QUESTION POOL ─────────────────────────────────────────────────────────────
//

/// Draft dropped at ingestion, with its position in the incoming batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedDraft {
    pub index: usize,
    pub reason: QuestionValidationError,
}

/// The full set of candidate questions for one test attempt.
///
/// Created once per attempt from the generation collaborator's drafts and
/// never mutated afterwards. Ids are assigned in draft order, so pool order
/// is stable and selection stays reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionPool {
    questions: Vec<Question>,
}

impl QuestionPool {
    /// Validate drafts and build the pool, dropping malformed entries.
    ///
    /// Each surviving draft gets a `QuestionId` equal to its position in the
    /// pool. Rejected drafts are reported with their batch index so the
    /// caller can log them.
    #[must_use]
    pub fn ingest(drafts: Vec<QuestionDraft>) -> (Self, Vec<RejectedDraft>) {
        let mut questions = Vec::with_capacity(drafts.len());
        let mut rejected = Vec::new();

        for (index, draft) in drafts.into_iter().enumerate() {
            match draft.validate() {
                Ok(valid) => {
                    let id = QuestionId::new(questions.len() as u64);
                    questions.push(valid.assign_id(id));
                }
                Err(reason) => rejected.push(RejectedDraft { index, reason }),
            }
        }

        (Self { questions }, rejected)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Look up a question by id.
    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        usize::try_from(id.value())
            .ok()
            .and_then(|i| self.questions.get(i))
            .filter(|q| q.id() == id)
    }

    /// All questions in pool (ingestion) order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

//
// ─── POOL INDEX ────────────────────────────────────────────────────────────────
//

/// Read-only view of a pool partitioned by level, excluding consumed ids.
///
/// Pure: borrows the pool and the used-set, never mutates either. Bucket
/// order is pool order; nothing here shuffles.
#[derive(Debug, Clone, Copy)]
pub struct PoolIndex<'p, 'u> {
    pool: &'p QuestionPool,
    used: &'u HashSet<QuestionId>,
}

impl<'p, 'u> PoolIndex<'p, 'u> {
    #[must_use]
    pub fn new(pool: &'p QuestionPool, used: &'u HashSet<QuestionId>) -> Self {
        Self { pool, used }
    }

    /// Unused questions at `level`, in pool order.
    pub fn bucket(&self, level: CefrLevel) -> impl Iterator<Item = &'p Question> {
        let used = self.used;
        self.pool
            .iter()
            .filter(move |q| q.level() == level && !used.contains(&q.id()))
    }

    /// First unused question at `level`, or `None` when the bucket is empty.
    #[must_use]
    pub fn first_available(&self, level: CefrLevel) -> Option<&'p Question> {
        self.bucket(level).next()
    }

    /// True when no level has an unused question left.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        CefrLevel::LADDER
            .iter()
            .all(|level| self.first_available(*level).is_none())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
