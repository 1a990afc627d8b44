mod ids;
mod level;
mod pool;
mod profile;
mod question;
mod session;

pub use ids::{AttemptId, ParseIdError, QuestionId};
pub use level::{CefrLevel, LevelError, SelfAssessedLevel};
pub use pool::{PoolIndex, QuestionPool, RejectedDraft};
pub use profile::LearnerProfile;
pub use question::{
    MediaRef, Question, QuestionDraft, QuestionValidationError, SkillCategory, ValidatedQuestion,
};
pub use session::{SessionState, SessionStateError};
