use anyhow::{Context, Result};
use async_trait::async_trait;
use interview_types::FeedbackReport;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;

pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Prompt file stems looked up in the prompt map.
pub const SYSTEM_PROMPT_KEY: &str = "feedback_system";
pub const USER_PROMPT_KEY: &str = "feedback_prompt";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional interviewer analyzing a mock interview. \
Your task is to evaluate the candidate based on structured categories.";

const DEFAULT_USER_PROMPT: &str = r#"You are an AI interviewer analyzing a mock interview. Be thorough and not lenient. Point out mistakes and areas for improvement.
Transcript:
{transcript}

Score the candidate from 0 to 100 in ONLY the following categories, in this order:
- Communication Skills: clarity, articulation, structured responses.
- Technical Knowledge: understanding of key concepts for the role.
- Problem-Solving: ability to analyze problems and propose solutions.
- Cultural & Role Fit: alignment with company values and the job role.
- Confidence & Clarity: confidence in responses, engagement, and clarity.

Respond with STRICT JSON only:
{"totalScore": <0-100>, "categoryScores": [{"name": "<category>", "score": <0-100>, "comment": "<text>"}, ...], "strengths": ["<text>", ...], "areasForImprovement": ["<text>", ...], "finalAssessment": "<text>"}"#;

/// The generative scoring call: turns a formatted transcript into a report.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, formatted_transcript: &str) -> Result<FeedbackReport>;
}

#[async_trait]
impl<T: FeedbackGenerator + ?Sized> FeedbackGenerator for std::sync::Arc<T> {
    async fn generate(&self, formatted_transcript: &str) -> Result<FeedbackReport> {
        (**self).generate(formatted_transcript).await
    }
}

/// System and user prompts for scoring. The user prompt has a `{transcript}`
/// placeholder.
#[derive(Debug, Clone)]
pub struct ScoringPrompts {
    system: String,
    user: String,
}

impl ScoringPrompts {
    /// Picks the scoring prompts out of a loaded prompt map, falling back to
    /// the built-in wording for any that are missing.
    pub fn from_map(prompts: &HashMap<String, String>) -> Self {
        let pick = |key: &str, default: &str| match prompts.get(key) {
            Some(prompt) => prompt.clone(),
            None => {
                tracing::warn!("prompt '{}' not found, using built-in prompt", key);
                default.to_string()
            }
        };
        Self {
            system: pick(SYSTEM_PROMPT_KEY, DEFAULT_SYSTEM_PROMPT),
            user: pick(USER_PROMPT_KEY, DEFAULT_USER_PROMPT),
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn render(&self, formatted_transcript: &str) -> String {
        self.user.replace("{transcript}", formatted_transcript)
    }
}

impl Default for ScoringPrompts {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            user: DEFAULT_USER_PROMPT.to_string(),
        }
    }
}

/// Parses a model answer into a validated report. Tolerates a ```json fence.
pub fn parse_report(answer: &str) -> Result<FeedbackReport> {
    let trimmed = answer.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    let report: FeedbackReport = serde_json::from_str(body.trim())
        .with_context(|| format!("Failed to parse scoring response: {answer}"))?;
    report
        .validate()
        .map_err(|e| anyhow::anyhow!("Scoring response is out of shape: {e}"))?;
    Ok(report)
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub content: String,
}

/// Scores transcripts with an OpenAI chat-completions model.
pub struct OpenAiScoringClient {
    client: Client,
    api_key: SecretString,
    model: String,
    prompts: ScoringPrompts,
}

impl OpenAiScoringClient {
    pub fn new(api_key: SecretString, model: String, prompts: ScoringPrompts) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            prompts,
        }
    }
}

#[async_trait]
impl FeedbackGenerator for OpenAiScoringClient {
    async fn generate(&self, formatted_transcript: &str) -> Result<FeedbackReport> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": self.prompts.system() },
                { "role": "user", "content": self.prompts.render(formatted_transcript) }
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.2
        });

        let resp = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<LlmResponse>()
            .await?;

        let answer = &resp
            .choices
            .first()
            .ok_or_else(|| anyhow::anyhow!("No response from LLM"))?
            .message
            .content;
        parse_report(answer)
    }
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    pub content: GeminiContent,
}

#[derive(Debug, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

/// Scores transcripts with a Gemini `generateContent` model.
pub struct GeminiScoringClient {
    client: Client,
    api_key: SecretString,
    model: String,
    prompts: ScoringPrompts,
}

impl GeminiScoringClient {
    pub fn new(api_key: SecretString, model: String, prompts: ScoringPrompts) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            prompts,
        }
    }
}

#[async_trait]
impl FeedbackGenerator for GeminiScoringClient {
    async fn generate(&self, formatted_transcript: &str) -> Result<FeedbackReport> {
        let body = serde_json::json!({
            "systemInstruction": { "parts": [{ "text": self.prompts.system() }] },
            "contents": [
                { "role": "user", "parts": [{ "text": self.prompts.render(formatted_transcript) }] }
            ],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.2
            }
        });

        let url = format!("{GEMINI_BASE_URL}/models/{}:generateContent", self.model);
        let resp = self
            .client
            .post(url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<GeminiResponse>()
            .await?;

        let answer: String = resp
            .candidates
            .first()
            .ok_or_else(|| anyhow::anyhow!("No candidates from Gemini"))?
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        parse_report(&answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_types::feedback::FEEDBACK_CATEGORIES;

    fn answer() -> String {
        let categories: Vec<serde_json::Value> = FEEDBACK_CATEGORIES
            .iter()
            .map(|name| serde_json::json!({"name": name, "score": 64, "comment": "fine"}))
            .collect();
        serde_json::json!({
            "totalScore": 64,
            "categoryScores": categories,
            "strengths": ["structured answers"],
            "areasForImprovement": ["system design depth"],
            "finalAssessment": "Promising."
        })
        .to_string()
    }

    #[test]
    fn parses_plain_and_fenced_answers() {
        let report = parse_report(&answer()).unwrap();
        assert_eq!(report.total_score, 64.0);
        assert_eq!(report.category_scores.len(), 5);

        let fenced = format!("```json\n{}\n```", answer());
        assert_eq!(parse_report(&fenced).unwrap(), report);
    }

    #[test]
    fn accepts_fractional_scores() {
        let categories: Vec<serde_json::Value> = FEEDBACK_CATEGORIES
            .iter()
            .map(|name| serde_json::json!({"name": name, "score": 78.5, "comment": "fine"}))
            .collect();
        let answer = serde_json::json!({
            "totalScore": 82.5,
            "categoryScores": categories,
            "strengths": [],
            "areasForImprovement": [],
            "finalAssessment": "Close to ready."
        })
        .to_string();

        let report = parse_report(&answer).unwrap();
        assert_eq!(report.total_score, 82.5);
        assert!(report.category_scores.iter().all(|c| c.score == 78.5));
    }

    #[test]
    fn rejects_out_of_range_scores() {
        let categories: Vec<serde_json::Value> = FEEDBACK_CATEGORIES
            .iter()
            .map(|name| serde_json::json!({"name": name, "score": 50, "comment": ""}))
            .collect();
        let answer = serde_json::json!({
            "totalScore": -3,
            "categoryScores": categories,
            "strengths": [],
            "areasForImprovement": [],
            "finalAssessment": ""
        })
        .to_string();
        assert!(parse_report(&answer).is_err());
    }

    #[test]
    fn rejects_wrong_categories() {
        let bad = serde_json::json!({
            "totalScore": 64,
            "categoryScores": [{"name": "Vibes", "score": 64, "comment": ""}],
            "strengths": [],
            "areasForImprovement": [],
            "finalAssessment": ""
        })
        .to_string();
        assert!(parse_report(&bad).is_err());
        assert!(parse_report("not json").is_err());
    }

    #[test]
    fn prompts_fall_back_per_key() {
        let mut map = HashMap::new();
        map.insert(USER_PROMPT_KEY.to_string(), "Score this:\n{transcript}".to_string());
        let prompts = ScoringPrompts::from_map(&map);

        assert_eq!(prompts.system(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(prompts.render("- user: hi\n"), "Score this:\n- user: hi\n");
    }

    #[test]
    fn default_prompt_embeds_transcript() {
        let rendered = ScoringPrompts::default().render("- user: hello\n");
        assert!(rendered.contains("Transcript:\n- user: hello\n"));
    }
}
