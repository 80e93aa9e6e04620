use crate::Route;
use crate::identity::SharedCredential;
use anyhow::Result;
use async_trait::async_trait;
use interview_types::{CreateFeedbackParams, FeedbackOutcome, Message};
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;

/// The feedback-scoring collaborator (`createFeedback`).
///
/// Validation of the interview id and transcript happens on the far side and
/// comes back as a failed outcome. `Err` means no answer at all.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FeedbackScorer: Send + Sync {
    async fn create_feedback(&self, params: CreateFeedbackParams) -> Result<FeedbackOutcome>;
}

/// Everything captured at the moment the call finished.
#[derive(Debug, Clone)]
pub struct HandoffRequest {
    pub interview_id: String,
    pub messages: Arc<[Message]>,
    pub feedback_id: Option<String>,
    pub credential: SharedCredential,
    pub legacy_user_id: Option<String>,
}

impl HandoffRequest {
    fn to_params(&self) -> CreateFeedbackParams {
        CreateFeedbackParams {
            interview_id: self.interview_id.clone(),
            transcript: self.messages.to_vec(),
            id_token: self.credential.as_ref().map(|c| c.expose().to_string()),
            legacy_user_id: self.legacy_user_id.clone(),
            feedback_id: self.feedback_id.clone(),
        }
    }
}

/// Submits a finished transcript for scoring, once per session.
pub struct HandoffOrchestrator<S> {
    scorer: S,
    submitted: bool,
}

impl<S: FeedbackScorer> HandoffOrchestrator<S> {
    pub fn new(scorer: S) -> Self {
        Self {
            scorer,
            submitted: false,
        }
    }

    pub fn has_submitted(&self) -> bool {
        self.submitted
    }

    /// Sends `request` to the scorer. Returns `None` without contacting the
    /// scorer when this session has already submitted.
    pub async fn submit_feedback(&mut self, request: &HandoffRequest) -> Option<FeedbackOutcome> {
        if self.submitted {
            tracing::warn!(
                "feedback for interview '{}' already submitted, skipping",
                request.interview_id
            );
            return None;
        }
        self.submitted = true;

        if request.credential.is_none() {
            tracing::info!("no identity credential, submitting with legacy user id");
        }
        tracing::info!(
            "submitting {} messages for interview '{}'",
            request.messages.len(),
            request.interview_id
        );

        let outcome = match self.scorer.create_feedback(request.to_params()).await {
            Ok(outcome) => outcome,
            Err(e) => FeedbackOutcome::failed(format!("{e:#}")),
        };
        Some(outcome)
    }

    /// Submits and decides where the caller goes next.
    pub async fn hand_off(&mut self, request: &HandoffRequest) -> Route {
        match self.submit_feedback(request).await {
            Some(outcome) => route_for(&request.interview_id, &outcome),
            None => Route::Home,
        }
    }
}

/// Feedback detail on success with a usable id, home otherwise.
pub fn route_for(interview_id: &str, outcome: &FeedbackOutcome) -> Route {
    match outcome.usable_feedback_id() {
        Some(feedback_id) => Route::FeedbackDetail {
            interview_id: interview_id.to_string(),
            feedback_id: feedback_id.to_string(),
        },
        None => {
            tracing::error!(
                "error saving feedback: {}",
                outcome.error_reason.as_deref().unwrap_or("no feedback id returned")
            );
            Route::Home
        }
    }
}
