use chrono::{DateTime, Utc};

use placement_core::model::{LearnerProfile, Question, QuestionPool, SessionState};
use placement_core::{
    Decision, PerformanceSnapshot, StopReason, TerminationPolicy, aggregate, max_questions,
    progress_ratio, select_initial, select_next,
};

use crate::error::PlacementError;

//
// ─── PROGRESS VIEW ─────────────────────────────────────────────────────────────
//

/// Aggregated view of attempt progress, useful for UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    pub answered: usize,
    pub max_questions: usize,
    /// `answered / max_questions`, clamped to 1.
    pub ratio: f64,
    pub is_complete: bool,
}

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// Everything the caller learns from submitting one answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub was_correct: bool,
    pub snapshot: PerformanceSnapshot,
    pub decision: Decision,
    pub progress: ProgressView,
    pub is_complete: bool,
}

//
// ─── PLACEMENT SESSION ─────────────────────────────────────────────────────────
//

/// In-memory stepper for one placement-test attempt.
///
/// Owns the `SessionState` and drives one turn per submitted answer:
/// record the answer, recompute the performance snapshot, ask the
/// termination policy, then pick the next question. Pool exhaustion forces
/// a stop even when the policy would continue.
#[derive(Debug)]
pub struct PlacementSession {
    state: SessionState,
    policy: TerminationPolicy,
    stop_reason: Option<StopReason>,
}

impl PlacementSession {
    /// Start an attempt by seeding the first question.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `PlacementError::Empty` when the pool cannot supply a single
    /// question at any level — the test cannot start.
    pub fn start(
        profile: LearnerProfile,
        pool: QuestionPool,
        policy: TerminationPolicy,
        started_at: DateTime<Utc>,
    ) -> Result<Self, PlacementError> {
        let mut state = SessionState::new(profile, pool, started_at);

        let first_id = {
            let used = state.used_ids();
            select_initial(state.pool(), &used, state.profile().self_assessed)
                .map(Question::id)
                .ok_or(PlacementError::Empty)?
        };
        state.present(first_id)?;

        Ok(Self {
            state,
            policy,
            stop_reason: None,
        })
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Consume the session, handing the final state to the evaluator.
    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn policy(&self) -> TerminationPolicy {
        self.policy
    }

    /// Why the attempt stopped, once it has.
    #[must_use]
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// The question currently awaiting an answer.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.state.pending_question()
    }

    /// Recompute the performance snapshot from the full answer history.
    #[must_use]
    pub fn snapshot(&self) -> PerformanceSnapshot {
        aggregate(
            self.state.pool(),
            self.state.selected(),
            self.state.answers(),
        )
    }

    #[must_use]
    pub fn progress(&self) -> ProgressView {
        let age = self.state.profile().age;
        let answered = self.state.answered_count();
        ProgressView {
            answered,
            max_questions: max_questions(age),
            ratio: progress_ratio(answered, age),
            is_complete: self.is_complete(),
        }
    }

    /// Submit the chosen option for the current question and advance.
    ///
    /// A choice that is not among the question's options simply scores as
    /// incorrect; correctness is a strict string match.
    ///
    /// # Errors
    ///
    /// Returns `PlacementError::Completed` when the attempt is already over
    /// or no question is awaiting an answer.
    pub fn answer_current(
        &mut self,
        choice: &str,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, PlacementError> {
        let Some(current) = self.state.pending_question() else {
            return Err(PlacementError::Completed);
        };
        let was_correct = current.is_correct(choice);

        self.state.record_answer(choice.to_string())?;

        let snapshot = self.snapshot();
        let age = self.state.profile().age;
        let mut decision =
            self.policy
                .decide(age, self.state.answered_count(), &snapshot);

        if decision.should_continue() {
            let next_id = select_next(
                self.state.pool(),
                self.state.selected(),
                self.state.answers(),
            )
            .map(Question::id);

            match next_id {
                Some(id) => self.state.present(id)?,
                // Exhaustion overrides the policy.
                None => decision = Decision::Stop(StopReason::PoolExhausted),
            }
        }

        if let Decision::Stop(reason) = decision {
            self.stop_reason = Some(reason);
            self.state.complete(now);
        }

        Ok(AnswerOutcome {
            was_correct,
            snapshot,
            decision,
            progress: self.progress(),
            is_complete: self.is_complete(),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
