//! Shared error types for the services crate.

use thiserror::Error;

use placement_core::model::SessionStateError;

/// Errors emitted by the question-generation collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("question generation is not configured")]
    Disabled,
    #[error("question generation returned an empty response")]
    EmptyResponse,
    #[error("question generation response could not be decoded: {0}")]
    BadPayload(String),
    #[error("question generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the evaluation collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvaluationError {
    #[error("evaluation is not configured")]
    Disabled,
    #[error("evaluation returned an empty response")]
    EmptyResponse,
    #[error("evaluation response could not be decoded: {0}")]
    BadPayload(String),
    #[error("evaluation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the placement session and loop.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlacementError {
    #[error("no question available to start the test")]
    Empty,
    #[error("attempt is already completed")]
    Completed,
    #[error("attempt is still running")]
    StillRunning,
    #[error(transparent)]
    State(#[from] SessionStateError),
}
