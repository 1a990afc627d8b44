use thiserror::Error;

use crate::model::{LevelError, QuestionValidationError, SessionStateError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    QuestionValidation(#[from] QuestionValidationError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    SessionState(#[from] SessionStateError),
}
