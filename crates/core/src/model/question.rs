use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::model::ids::QuestionId;
use crate::model::level::CefrLevel;

//
// ─── SKILL CATEGORY ────────────────────────────────────────────────────────────
//

/// Competency a question targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Grammar,
    Vocabulary,
    Reading,
    Listening,
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkillCategory::Grammar => "grammar",
            SkillCategory::Vocabulary => "vocabulary",
            SkillCategory::Reading => "reading",
            SkillCategory::Listening => "listening",
        };
        write!(f, "{label}")
    }
}

impl FromStr for SkillCategory {
    type Err = QuestionValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grammar" => Ok(SkillCategory::Grammar),
            "vocabulary" => Ok(SkillCategory::Vocabulary),
            "reading" => Ok(SkillCategory::Reading),
            "listening" => Ok(SkillCategory::Listening),
            other => Err(QuestionValidationError::UnknownSkill(other.to_string())),
        }
    }
}

//
// ─── MEDIA REF ─────────────────────────────────────────────────────────────────
//

/// Reference to an audio or image asset attached to a question.
///
/// Stored as a validated URL; the core never fetches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef(Url);

impl MediaRef {
    /// Parse and validate a media URL.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError::InvalidMediaRef` when the string is
    /// not a valid URL.
    pub fn parse(raw: &str) -> Result<Self, QuestionValidationError> {
        Url::parse(raw.trim())
            .map(MediaRef)
            .map_err(|_| QuestionValidationError::InvalidMediaRef(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

//
// ─── VALIDATION ERRORS ─────────────────────────────────────────────────────────
//

/// Reasons a candidate question is rejected at pool ingestion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionValidationError {
    #[error("question text is empty")]
    EmptyText,

    #[error("question needs at least 2 options, got {0}")]
    TooFewOptions(usize),

    #[error("duplicate option: {0}")]
    DuplicateOption(String),

    #[error("correct answer {0:?} is not among the options")]
    CorrectAnswerMissing(String),

    #[error("unknown skill category: {0}")]
    UnknownSkill(String),

    #[error("invalid media reference: {0}")]
    InvalidMediaRef(String),
}

//
// ─── QUESTION PIPELINE ─────────────────────────────────────────────────────────
//

/// Raw candidate question as produced by the generation collaborator.
///
/// Untrusted until it passes `validate`; malformed drafts are dropped at
/// pool ingestion because answer scoring is a strict string match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub level: CefrLevel,
    pub skill: SkillCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

impl QuestionDraft {
    /// Check the draft against the ingestion rules.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionValidationError` found: empty text, fewer
    /// than two options, duplicated options, a correct answer missing from
    /// the options, or an unparseable media reference.
    pub fn validate(self) -> Result<ValidatedQuestion, QuestionValidationError> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(QuestionValidationError::EmptyText);
        }

        if self.options.len() < 2 {
            return Err(QuestionValidationError::TooFewOptions(self.options.len()));
        }

        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].contains(option) {
                return Err(QuestionValidationError::DuplicateOption(option.clone()));
            }
        }

        if !self.options.contains(&self.correct_answer) {
            return Err(QuestionValidationError::CorrectAnswerMissing(
                self.correct_answer,
            ));
        }

        let media = match self.media {
            Some(raw) => Some(MediaRef::parse(&raw)?),
            None => None,
        };

        Ok(ValidatedQuestion {
            text,
            options: self.options,
            correct_answer: self.correct_answer,
            level: self.level,
            skill: self.skill,
            media,
        })
    }
}

/// Draft that passed ingestion validation but has no identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    text: String,
    options: Vec<String>,
    correct_answer: String,
    level: CefrLevel,
    skill: SkillCategory,
    media: Option<MediaRef>,
}

impl ValidatedQuestion {
    /// Attach the pool-assigned id, producing the immutable `Question`.
    #[must_use]
    pub fn assign_id(self, id: QuestionId) -> Question {
        Question {
            id,
            text: self.text,
            options: self.options,
            correct_answer: self.correct_answer,
            level: self.level,
            skill: self.skill,
            media: self.media,
        }
    }
}

/// Immutable multiple-choice question, read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_answer: String,
    level: CefrLevel,
    skill: SkillCategory,
    media: Option<MediaRef>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Options in presentation order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn level(&self) -> CefrLevel {
        self.level
    }

    #[must_use]
    pub fn skill(&self) -> SkillCategory {
        self.skill
    }

    #[must_use]
    pub fn media(&self) -> Option<&MediaRef> {
        self.media.as_ref()
    }

    /// Strict string comparison against the correct option.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            text: "Choose the correct form: she ___ to school.".to_string(),
            options: vec!["go".to_string(), "goes".to_string(), "going".to_string()],
            correct_answer: "goes".to_string(),
            level: CefrLevel::A1,
            skill: SkillCategory::Grammar,
            media: None,
        }
    }

    #[test]
    fn valid_draft_becomes_question() {
        let question = draft().validate().unwrap().assign_id(QuestionId::new(3));

        assert_eq!(question.id(), QuestionId::new(3));
        assert_eq!(question.level(), CefrLevel::A1);
        assert!(question.is_correct("goes"));
        assert!(!question.is_correct("go"));
    }

    #[test]
    fn rejects_empty_text() {
        let mut d = draft();
        d.text = "   ".to_string();
        assert_eq!(d.validate().unwrap_err(), QuestionValidationError::EmptyText);
    }

    #[test]
    fn rejects_single_option() {
        let mut d = draft();
        d.options = vec!["goes".to_string()];
        assert!(matches!(
            d.validate().unwrap_err(),
            QuestionValidationError::TooFewOptions(1)
        ));
    }

    #[test]
    fn rejects_duplicate_options() {
        let mut d = draft();
        d.options = vec!["goes".to_string(), "go".to_string(), "goes".to_string()];
        assert!(matches!(
            d.validate().unwrap_err(),
            QuestionValidationError::DuplicateOption(_)
        ));
    }

    #[test]
    fn rejects_correct_answer_outside_options() {
        let mut d = draft();
        d.correct_answer = "went".to_string();
        assert!(matches!(
            d.validate().unwrap_err(),
            QuestionValidationError::CorrectAnswerMissing(_)
        ));
    }

    #[test]
    fn rejects_bad_media_ref() {
        let mut d = draft();
        d.media = Some("not a url".to_string());
        assert!(matches!(
            d.validate().unwrap_err(),
            QuestionValidationError::InvalidMediaRef(_)
        ));
    }

    #[test]
    fn accepts_valid_media_ref() {
        let mut d = draft();
        d.media = Some("https://cdn.example.com/audio/q1.mp3".to_string());
        let question = d.validate().unwrap().assign_id(QuestionId::new(1));
        assert_eq!(
            question.media().unwrap().as_str(),
            "https://cdn.example.com/audio/q1.mp3"
        );
    }

    #[test]
    fn correctness_match_is_exact() {
        let question = draft().validate().unwrap().assign_id(QuestionId::new(1));
        assert!(!question.is_correct("Goes"));
        assert!(!question.is_correct("goes "));
    }
}
