use chrono::{DateTime, Utc};
use thiserror::Error;

use std::collections::HashSet;

use crate::model::ids::{AttemptId, QuestionId};
use crate::model::pool::QuestionPool;
use crate::model::profile::LearnerProfile;
use crate::model::question::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Invariant violations on session state transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("question {0} is not in this attempt's pool")]
    UnknownQuestion(QuestionId),

    #[error("question {0} was already presented in this attempt")]
    AlreadyPresented(QuestionId),

    #[error("the last presented question has not been answered yet")]
    AnswerPending,

    #[error("no presented question is awaiting an answer")]
    NoPendingQuestion,

    #[error("attempt is already completed")]
    AlreadyCompleted,
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Everything one test attempt owns: the pool, the presented sequence, and
/// the answer log, plus test-taker metadata.
///
/// Invariants enforced by the mutators:
/// - every presented id exists in the pool and appears at most once;
/// - `answers.len()` equals `selected.len()` or is one less (a question is
///   awaiting its answer);
/// - nothing changes after `complete`.
///
/// The engine functions (`selector`, `performance`, `termination`) are pure
/// over views of this state; the state itself holds no timers or callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    attempt_id: AttemptId,
    profile: LearnerProfile,
    pool: QuestionPool,
    selected: Vec<QuestionId>,
    answers: Vec<String>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl SessionState {
    #[must_use]
    pub fn new(profile: LearnerProfile, pool: QuestionPool, started_at: DateTime<Utc>) -> Self {
        Self {
            attempt_id: AttemptId::new(),
            profile,
            pool,
            selected: Vec::new(),
            answers: Vec::new(),
            started_at,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn profile(&self) -> &LearnerProfile {
        &self.profile
    }

    #[must_use]
    pub fn pool(&self) -> &QuestionPool {
        &self.pool
    }

    /// Presented question ids, in presentation order.
    #[must_use]
    pub fn selected(&self) -> &[QuestionId] {
        &self.selected
    }

    /// Chosen option strings, in presentation order.
    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Ids already consumed, for exclusion in selection.
    #[must_use]
    pub fn used_ids(&self) -> HashSet<QuestionId> {
        self.selected.iter().copied().collect()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// The question presented last and still awaiting its answer.
    #[must_use]
    pub fn pending_question(&self) -> Option<&Question> {
        if self.answers.len() < self.selected.len() {
            self.selected.last().and_then(|id| self.pool.get(*id))
        } else {
            None
        }
    }

    /// Append a question to the presented sequence.
    ///
    /// # Errors
    ///
    /// Rejects ids outside the pool, repeats, presentation while an answer
    /// is outstanding, and any mutation after completion.
    pub fn present(&mut self, id: QuestionId) -> Result<(), SessionStateError> {
        if self.is_complete() {
            return Err(SessionStateError::AlreadyCompleted);
        }
        if self.answers.len() < self.selected.len() {
            return Err(SessionStateError::AnswerPending);
        }
        if self.pool.get(id).is_none() {
            return Err(SessionStateError::UnknownQuestion(id));
        }
        if self.selected.contains(&id) {
            return Err(SessionStateError::AlreadyPresented(id));
        }
        self.selected.push(id);
        Ok(())
    }

    /// Record the chosen option for the pending question.
    ///
    /// # Errors
    ///
    /// Returns `NoPendingQuestion` when every presented question already has
    /// an answer, `AlreadyCompleted` after completion.
    pub fn record_answer(&mut self, choice: String) -> Result<(), SessionStateError> {
        if self.is_complete() {
            return Err(SessionStateError::AlreadyCompleted);
        }
        if self.answers.len() >= self.selected.len() {
            return Err(SessionStateError::NoPendingQuestion);
        }
        self.answers.push(choice);
        Ok(())
    }

    /// Stamp the attempt as finished. Idempotent.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        if self.completed_at.is_none() {
            self.completed_at = Some(at);
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
