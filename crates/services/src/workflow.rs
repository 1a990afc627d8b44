use std::sync::Arc;

use tracing::{debug, warn};

use placement_core::model::{LearnerProfile, QuestionPool, SessionState};
use placement_core::{Clock, TerminationPolicy};

use crate::error::PlacementError;
use crate::evaluation::{Assessment, AssessmentEvaluator, evaluate_or_fallback};
use crate::generation::{QuestionSource, generate_or_fallback};
use crate::session::{AnswerOutcome, PlacementSession};

/// Result of finishing an attempt: the assessment plus the final history.
#[derive(Debug, Clone)]
pub struct CompletedAttempt {
    pub assessment: Assessment,
    pub state: SessionState,
}

/// Orchestrates one placement test end to end.
///
/// Generation runs strictly before the first turn and evaluation strictly
/// after the last one; the turns themselves are synchronous engine calls.
/// Collaborator failures are absorbed here with fixed fallbacks and never
/// reach the engine.
#[derive(Clone)]
pub struct PlacementLoopService {
    clock: Clock,
    source: Arc<dyn QuestionSource>,
    evaluator: Arc<dyn AssessmentEvaluator>,
    policy: TerminationPolicy,
}

impl PlacementLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        source: Arc<dyn QuestionSource>,
        evaluator: Arc<dyn AssessmentEvaluator>,
    ) -> Self {
        Self {
            clock,
            source,
            evaluator,
            policy: TerminationPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: TerminationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Generate a pool for the profile and start a session on it.
    ///
    /// # Errors
    ///
    /// Returns `PlacementError::Empty` when even the ingested pool cannot
    /// seed a first question.
    pub async fn start_attempt(
        &self,
        profile: LearnerProfile,
    ) -> Result<PlacementSession, PlacementError> {
        let drafts = generate_or_fallback(self.source.as_ref(), &profile).await;
        let (pool, rejected) = QuestionPool::ingest(drafts);
        for dropped in &rejected {
            warn!(
                index = dropped.index,
                reason = %dropped.reason,
                "dropped malformed question draft at ingestion"
            );
        }

        let session = PlacementSession::start(profile, pool, self.policy, self.clock.now())?;
        debug!(
            attempt = %session.state().attempt_id(),
            pool_size = session.state().pool().len(),
            "placement attempt started"
        );
        Ok(session)
    }

    /// Submit the chosen option for the session's current question.
    ///
    /// # Errors
    ///
    /// Propagates `PlacementError` from the session stepper.
    pub fn answer(
        &self,
        session: &mut PlacementSession,
        choice: &str,
    ) -> Result<AnswerOutcome, PlacementError> {
        session.answer_current(choice, self.clock.now())
    }

    /// Evaluate a finished attempt, falling back to the fixed assessment.
    ///
    /// # Errors
    ///
    /// Returns `PlacementError::StillRunning` when the session has not
    /// stopped yet.
    pub async fn complete(
        &self,
        session: PlacementSession,
    ) -> Result<CompletedAttempt, PlacementError> {
        if !session.is_complete() {
            return Err(PlacementError::StillRunning);
        }

        let state = session.into_state();
        let snapshot =
            placement_core::aggregate(state.pool(), state.selected(), state.answers());
        let assessment = evaluate_or_fallback(self.evaluator.as_ref(), &state, &snapshot).await;

        debug!(
            attempt = %state.attempt_id(),
            answered = snapshot.total_answered,
            score = assessment.score,
            "placement attempt evaluated"
        );
        Ok(CompletedAttempt { assessment, state })
    }
}
