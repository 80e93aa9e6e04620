use crate::message::Message;
use chrono::{DateTime, Utc};

/// Request body of the `createFeedback` contract.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackParams {
    /// Interview the transcript belongs to. Rejected by the collaborator when empty.
    #[serde(default)]
    pub interview_id: String,

    /// The full transcript, in speaking order.
    #[serde(default)]
    pub transcript: Vec<Message>,

    /// Short-lived identity token. The collaborator derives the user from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Unverified user id, used only when no token verifies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_user_id: Option<String>,

    /// Existing feedback document to overwrite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<String>,
}

impl CreateFeedbackParams {
    pub fn new(interview_id: impl Into<String>, transcript: Vec<Message>) -> Self {
        Self {
            interview_id: interview_id.into(),
            transcript,
            id_token: None,
            legacy_user_id: None,
            feedback_id: None,
        }
    }
}

/// Result of one feedback submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackOutcome {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<String>,

    #[serde(default, rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

impl FeedbackOutcome {
    pub fn succeeded(feedback_id: impl Into<String>) -> Self {
        Self {
            success: true,
            feedback_id: Some(feedback_id.into()),
            error_reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            feedback_id: None,
            error_reason: Some(reason.into()),
        }
    }

    /// The stored feedback id, only when the submission succeeded with a
    /// non-empty id.
    pub fn usable_feedback_id(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        self.feedback_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Scored categories, in the order they are presented.
pub const FEEDBACK_CATEGORIES: [&str; 5] = [
    "Communication Skills",
    "Technical Knowledge",
    "Problem-Solving",
    "Cultural & Role Fit",
    "Confidence & Clarity",
];

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub name: String,
    /// 0..=100, fractions allowed
    pub score: f64,
    pub comment: String,
}

/// Structured assessment produced by the scoring model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReport {
    pub total_score: f64,
    pub category_scores: Vec<CategoryScore>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub final_assessment: String,
}

fn in_range(score: f64) -> bool {
    (0.0..=100.0).contains(&score)
}

impl FeedbackReport {
    /// Checks scores are within 0..=100 and that exactly the known categories
    /// are present, in order.
    pub fn validate(&self) -> Result<(), String> {
        if !in_range(self.total_score) {
            return Err(format!("total score {} is outside 0..=100", self.total_score));
        }
        let names: Vec<&str> = self.category_scores.iter().map(|c| c.name.as_str()).collect();
        if names != FEEDBACK_CATEGORIES {
            return Err(format!("unexpected categories: {names:?}"));
        }
        if let Some(bad) = self.category_scores.iter().find(|c| !in_range(c.score)) {
            return Err(format!("score {} for '{}' is outside 0..=100", bad.score, bad.name));
        }
        Ok(())
    }
}

/// A stored feedback document.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub interview_id: String,
    /// Verified user when available, otherwise the legacy id, otherwise null.
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub report: FeedbackReport,
    pub created_at: DateTime<Utc>,
}
