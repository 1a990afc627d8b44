use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use placement_core::PerformanceSnapshot;
use placement_core::model::SessionState;

use crate::error::EvaluationError;

//
// ─── ASSESSMENT ────────────────────────────────────────────────────────────────
//

/// Natural-language assessment of a finished attempt.
///
/// Produced by the evaluation collaborator and opaque to the engine: the
/// level label is free text, not necessarily one of the ladder rungs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub level: String,
    pub score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    pub recommendation: String,
}

/// Boundary to the external evaluation service.
#[async_trait]
pub trait AssessmentEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        state: &SessionState,
        snapshot: &PerformanceSnapshot,
    ) -> Result<Assessment, EvaluationError>;
}

//
// ─── HTTP EVALUATOR ────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct EvaluationConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl EvaluationConfig {
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

/// Chat-completions backed evaluator.
#[derive(Clone)]
pub struct HttpEvaluator {
    client: Client,
    config: Option<EvaluationConfig>,
}

impl HttpEvaluator {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(EvaluationConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<EvaluationConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn prompt(state: &SessionState, snapshot: &PerformanceSnapshot) -> String {
        let history: Vec<AnsweredQuestion<'_>> = state
            .selected()
            .iter()
            .zip(state.answers().iter())
            .filter_map(|(id, answer)| {
                state.pool().get(*id).map(|q| AnsweredQuestion {
                    text: q.text(),
                    level: q.level().to_string(),
                    skill: q.skill().to_string(),
                    chosen: answer,
                    correct: q.is_correct(answer),
                })
            })
            .collect();

        let history_json =
            serde_json::to_string(&history).unwrap_or_else(|_| "[]".to_string());

        format!(
            "A learner aged {} (self-assessed {}) finished an adaptive placement \
             test: {} answered, {:.0}% correct. Full history: {}. Reply with a \
             JSON object with the fields level, score (0-100), strengths, \
             weaknesses, recommendation.",
            state.profile().age,
            state.profile().self_assessed,
            snapshot.total_answered,
            snapshot.percentage_correct,
            history_json
        )
    }
}

#[async_trait]
impl AssessmentEvaluator for HttpEvaluator {
    async fn evaluate(
        &self,
        state: &SessionState,
        snapshot: &PerformanceSnapshot,
    ) -> Result<Assessment, EvaluationError> {
        let config = self.config.as_ref().ok_or(EvaluationError::Disabled)?;

        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: Self::prompt(state, snapshot),
            }],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EvaluationError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(EvaluationError::EmptyResponse)?;

        serde_json::from_str(content.trim())
            .map_err(|e| EvaluationError::BadPayload(e.to_string()))
    }
}

//
// ─── FALLBACK ──────────────────────────────────────────────────────────────────
//

/// Evaluate the attempt, substituting a fixed assessment on failure.
pub async fn evaluate_or_fallback(
    evaluator: &dyn AssessmentEvaluator,
    state: &SessionState,
    snapshot: &PerformanceSnapshot,
) -> Assessment {
    match evaluator.evaluate(state, snapshot).await {
        Ok(assessment) => assessment,
        Err(err) => {
            warn!(error = %err, "evaluation failed, using fallback assessment");
            fallback_assessment(snapshot)
        }
    }
}

/// Fixed assessment derived from the snapshot alone.
///
/// The level label comes from the overall percentage; bands are coarse on
/// purpose, this is only the degraded path.
#[must_use]
pub fn fallback_assessment(snapshot: &PerformanceSnapshot) -> Assessment {
    let pct = snapshot.percentage_correct;
    let level = if pct >= 85.0 {
        "C1"
    } else if pct >= 70.0 {
        "B2"
    } else if pct >= 50.0 {
        "B1"
    } else if pct >= 30.0 {
        "A2"
    } else {
        "A1"
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = pct.round().clamp(0.0, 100.0) as u8;

    Assessment {
        level: level.to_string(),
        score,
        strengths: Vec::new(),
        weaknesses: Vec::new(),
        recommendation:
            "Automatic estimate based on your answer accuracy. Take the test again \
             later for a detailed evaluation."
                .to_string(),
    }
}

//
// ─── REQUEST / RESPONSE DTOS ───────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct AnsweredQuestion<'a> {
    text: &'a str,
    level: String,
    skill: String,
    chosen: &'a str,
    correct: bool,
}

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
    use placement_core::LevelTally;
    use placement_core::model::CefrLevel;

    fn snapshot(correct: u32, total: u32) -> PerformanceSnapshot {
        let mut s = PerformanceSnapshot {
            correct_count: correct,
            total_answered: total,
            ..PerformanceSnapshot::default()
        };
        s.by_level
            .insert(CefrLevel::B1, LevelTally { correct, total });
        s.percentage_correct = if total == 0 {
            0.0
        } else {
            100.0 * f64::from(correct) / f64::from(total)
        };
        s
    }

    #[test]
    fn fallback_bands_follow_percentage() {
        assert_eq!(fallback_assessment(&snapshot(9, 10)).level, "C1");
        assert_eq!(fallback_assessment(&snapshot(7, 10)).level, "B2");
        assert_eq!(fallback_assessment(&snapshot(5, 10)).level, "B1");
        assert_eq!(fallback_assessment(&snapshot(3, 10)).level, "A2");
        assert_eq!(fallback_assessment(&snapshot(1, 10)).level, "A1");
    }

    #[test]
    fn fallback_score_matches_percentage() {
        let assessment = fallback_assessment(&snapshot(7, 10));
        assert_eq!(assessment.score, 70);
    }

    #[test]
    fn empty_attempt_scores_zero() {
        let assessment = fallback_assessment(&snapshot(0, 0));
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.level, "A1");
    }

    #[test]
    fn unconfigured_evaluator_is_disabled() {
        assert!(!HttpEvaluator::new(None).enabled());
    }
}
