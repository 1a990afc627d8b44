use serde::{Deserialize, Serialize};

use crate::model::level::SelfAssessedLevel;

/// Test-taker metadata collected before the attempt starts.
///
/// Sent verbatim to both external collaborators; inside the engine only
/// `age` (termination limits) and `self_assessed` (starting rung) matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub age: u8,
    pub self_assessed: SelfAssessedLevel,
    #[serde(default)]
    pub learning_goals: Vec<String>,
}

impl LearnerProfile {
    #[must_use]
    pub fn new(age: u8, self_assessed: SelfAssessedLevel) -> Self {
        Self {
            age,
            self_assessed,
            learning_goals: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_goals(mut self, goals: Vec<String>) -> Self {
        self.learning_goals = goals;
        self
    }
}
