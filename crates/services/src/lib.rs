#![forbid(unsafe_code)]

//! Orchestration around the placement-test engine: the session stepper, the
//! attempt loop, and the two external collaborators (question generation and
//! final evaluation) with their fixed fallbacks.

pub mod error;
pub mod evaluation;
pub mod generation;
pub mod session;
pub mod workflow;

pub use placement_core::Clock;

pub use error::{EvaluationError, GenerationError, PlacementError};
pub use evaluation::{
    Assessment, AssessmentEvaluator, HttpEvaluator, evaluate_or_fallback, fallback_assessment,
};
pub use generation::{HttpQuestionSource, QuestionSource, fallback_pool, generate_or_fallback};
pub use session::{AnswerOutcome, PlacementSession, ProgressView};
pub use workflow::{CompletedAttempt, PlacementLoopService};
