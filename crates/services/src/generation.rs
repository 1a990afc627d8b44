use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use placement_core::model::{CefrLevel, LearnerProfile, QuestionDraft, SkillCategory};

use crate::error::GenerationError;

//
// ─── QUESTION SOURCE ───────────────────────────────────────────────────────────
//

/// Boundary to the external question-generation service.
///
/// Returns raw drafts; validation and id assignment happen at pool
/// ingestion, so a misbehaving source can never hand the engine a malformed
/// question.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(
        &self,
        profile: &LearnerProfile,
    ) -> Result<Vec<QuestionDraft>, GenerationError>;
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl GenerationConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("PLACEMENT_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("PLACEMENT_AI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model =
            env::var("PLACEMENT_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

//
// ─── HTTP SOURCE ───────────────────────────────────────────────────────────────
//

/// Chat-completions backed question source.
#[derive(Clone)]
pub struct HttpQuestionSource {
    client: Client,
    config: Option<GenerationConfig>,
}

impl HttpQuestionSource {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GenerationConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<GenerationConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn prompt(profile: &LearnerProfile) -> String {
        let goals = if profile.learning_goals.is_empty() {
            "general proficiency".to_string()
        } else {
            profile.learning_goals.join(", ")
        };
        format!(
            "Generate a JSON array of multiple-choice English placement questions \
             covering CEFR levels A1 through C1 and the skills grammar, vocabulary, \
             reading and listening. The learner is {} years old, self-assessed as \
             {}, and wants to work on: {}. Each element must have the fields \
             text, options, correct_answer, level, skill.",
            profile.age, profile.self_assessed, goals
        )
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn generate(
        &self,
        profile: &LearnerProfile,
    ) -> Result<Vec<QuestionDraft>, GenerationError> {
        let config = self.config.as_ref().ok_or(GenerationError::Disabled)?;

        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: Self::prompt(profile),
            }],
            temperature: 0.4,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GenerationError::EmptyResponse)?;

        let drafts: Vec<QuestionDraft> = serde_json::from_str(content.trim())
            .map_err(|e| GenerationError::BadPayload(e.to_string()))?;
        if drafts.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(drafts)
    }
}

//
// ─── FALLBACK POOL ─────────────────────────────────────────────────────────────
//

/// Generate drafts for `profile`, substituting the built-in pool on failure.
///
/// Generation failures never reach the engine; the caller always gets a
/// usable pool.
pub async fn generate_or_fallback(
    source: &dyn QuestionSource,
    profile: &LearnerProfile,
) -> Vec<QuestionDraft> {
    match source.generate(profile).await {
        Ok(drafts) => drafts,
        Err(err) => {
            warn!(error = %err, "question generation failed, using fallback pool");
            fallback_pool()
        }
    }
}

fn mc(
    text: &str,
    options: &[&str],
    correct: &str,
    level: CefrLevel,
    skill: SkillCategory,
) -> QuestionDraft {
    QuestionDraft {
        text: text.to_string(),
        options: options.iter().map(|o| (*o).to_string()).collect(),
        correct_answer: correct.to_string(),
        level,
        skill,
        media: None,
    }
}

/// Fixed question pool used when generation is unavailable.
///
/// Two questions per ladder level so the adaptive selector always has a
/// harder and an easier neighbor to move to.
#[must_use]
pub fn fallback_pool() -> Vec<QuestionDraft> {
    vec![
        mc(
            "She ___ a student.",
            &["is", "are", "am"],
            "is",
            CefrLevel::A1,
            SkillCategory::Grammar,
        ),
        mc(
            "Which word means a place where you sleep?",
            &["bed", "bread", "book"],
            "bed",
            CefrLevel::A1,
            SkillCategory::Vocabulary,
        ),
        mc(
            "They ___ to the cinema last night.",
            &["went", "go", "gone"],
            "went",
            CefrLevel::A2,
            SkillCategory::Grammar,
        ),
        mc(
            "Read: 'The shop opens at 9.' When can you first go in?",
            &["At 9", "Before 9", "At night"],
            "At 9",
            CefrLevel::A2,
            SkillCategory::Reading,
        ),
        mc(
            "If it rains tomorrow, we ___ the match.",
            &["will cancel", "cancelled", "cancel"],
            "will cancel",
            CefrLevel::B1,
            SkillCategory::Grammar,
        ),
        mc(
            "Choose the closest meaning of 'reluctant'.",
            &["unwilling", "eager", "careless"],
            "unwilling",
            CefrLevel::B1,
            SkillCategory::Vocabulary,
        ),
        mc(
            "By the time we arrived, the film ___.",
            &["had started", "has started", "starts"],
            "had started",
            CefrLevel::B2,
            SkillCategory::Grammar,
        ),
        mc(
            "A speaker says: 'I couldn't agree more.' The speaker is…",
            &["fully agreeing", "disagreeing", "undecided"],
            "fully agreeing",
            CefrLevel::B2,
            SkillCategory::Listening,
        ),
        mc(
            "Hardly ___ the door when the phone rang.",
            &["had I closed", "I had closed", "I closed"],
            "had I closed",
            CefrLevel::C1,
            SkillCategory::Grammar,
        ),
        mc(
            "Choose the word closest in meaning to 'ubiquitous'.",
            &["omnipresent", "scarce", "obsolete"],
            "omnipresent",
            CefrLevel::C1,
            SkillCategory::Vocabulary,
        ),
    ]
}

//
// ─── REQUEST / RESPONSE DTOS ───────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use placement_core::model::QuestionPool;

    #[test]
    fn fallback_pool_is_fully_valid() {
        let (pool, rejected) = QuestionPool::ingest(fallback_pool());
        assert!(rejected.is_empty());
        assert_eq!(pool.len(), 10);
    }

    #[test]
    fn fallback_pool_covers_every_level() {
        let drafts = fallback_pool();
        for level in CefrLevel::LADDER {
            let count = drafts.iter().filter(|d| d.level == level).count();
            assert_eq!(count, 2, "expected two {level} questions");
        }
    }

    #[test]
    fn unconfigured_source_is_disabled() {
        let source = HttpQuestionSource::new(None);
        assert!(!source.enabled());
    }

    #[tokio::test]
    async fn disabled_source_falls_back() {
        let source = HttpQuestionSource::new(None);
        let profile = LearnerProfile::new(
            25,
            placement_core::model::SelfAssessedLevel::Beginner,
        );
        let drafts = generate_or_fallback(&source, &profile).await;
        assert_eq!(drafts, fallback_pool());
    }
}
