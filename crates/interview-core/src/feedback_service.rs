//! Server side of the `createFeedback` contract.
//!
//! Derives the user from the identity token when one verifies (falling back
//! to the legacy id otherwise), validates the request, scores the transcript
//! and stores the result. Every failure comes back as an unsuccessful
//! [`FeedbackOutcome`]; nothing here panics or propagates.

use crate::handoff::FeedbackScorer;
use crate::scoring::FeedbackGenerator;
use crate::store::FeedbackStore;
use crate::token::TokenVerifier;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use interview_types::{CreateFeedbackParams, Feedback, FeedbackOutcome, Message};

/// Renders a transcript as `- role: content` lines for the scoring prompt.
pub fn format_transcript(transcript: &[Message]) -> String {
    transcript
        .iter()
        .map(|m| {
            let content = m
                .content()
                .split('\n')
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            format!("- {}: {}\n", m.role(), content.trim())
        })
        .collect()
}

pub struct FeedbackService<G, St, V> {
    generator: G,
    store: St,
    verifier: Option<V>,
}

impl<G, St, V> FeedbackService<G, St, V>
where
    G: FeedbackGenerator,
    St: FeedbackStore,
    V: TokenVerifier,
{
    /// Without a verifier every token is ignored and the legacy id is used.
    pub fn new(generator: G, store: St, verifier: Option<V>) -> Self {
        Self {
            generator,
            store,
            verifier,
        }
    }

    async fn resolve_user(&self, params: &CreateFeedbackParams) -> Option<String> {
        let legacy = params.legacy_user_id.clone().filter(|id| !id.is_empty());
        let Some(token) = params.id_token.as_deref() else {
            return legacy;
        };
        let Some(verifier) = &self.verifier else {
            tracing::warn!("no token verifier configured, using legacy user id");
            return legacy;
        };
        match verifier.verify(token).await {
            Ok(principal) => Some(principal.uid().to_string()),
            Err(e) => {
                tracing::error!("ID token verification failed: {}", e);
                legacy
            }
        }
    }

    pub async fn create(&self, params: CreateFeedbackParams) -> FeedbackOutcome {
        let user_id = self.resolve_user(&params).await;

        if params.interview_id.is_empty() {
            return FeedbackOutcome::failed("Missing interviewId");
        }
        if params.transcript.is_empty() {
            return FeedbackOutcome::failed("Empty transcript");
        }

        match self.score_and_store(&params, user_id).await {
            Ok(feedback_id) => {
                tracing::info!(
                    "saved feedback {} for interview {}",
                    feedback_id,
                    params.interview_id
                );
                FeedbackOutcome::succeeded(feedback_id)
            }
            Err(e) => {
                tracing::error!("Error saving feedback: {:?}", e);
                FeedbackOutcome::failed("Failed to save feedback")
            }
        }
    }

    async fn score_and_store(
        &self,
        params: &CreateFeedbackParams,
        user_id: Option<String>,
    ) -> Result<String> {
        let formatted = format_transcript(&params.transcript);
        let report = self.generator.generate(&formatted).await?;

        let id = params
            .feedback_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let feedback = Feedback {
            id: id.clone(),
            interview_id: params.interview_id.clone(),
            user_id,
            report,
            created_at: Utc::now(),
        };
        self.store.put(feedback).await?;
        Ok(id)
    }

    pub async fn get_feedback_by_interview_id(
        &self,
        interview_id: &str,
        user_id: &str,
    ) -> Result<Option<Feedback>> {
        self.store.find_by_interview(interview_id, user_id).await
    }
}

#[async_trait]
impl<G, St, V> FeedbackScorer for FeedbackService<G, St, V>
where
    G: FeedbackGenerator,
    St: FeedbackStore,
    V: TokenVerifier,
{
    async fn create_feedback(&self, params: CreateFeedbackParams) -> Result<FeedbackOutcome> {
        Ok(self.create(params).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Principal;
    use crate::scoring::MockFeedbackGenerator;
    use crate::store::{InMemoryFeedbackStore, MockFeedbackStore};
    use crate::token::{MockTokenVerifier, TokenError};
    use interview_types::feedback::FEEDBACK_CATEGORIES;
    use interview_types::{CategoryScore, FeedbackReport, Role};

    fn report() -> FeedbackReport {
        FeedbackReport {
            total_score: 81.0,
            category_scores: FEEDBACK_CATEGORIES
                .iter()
                .map(|name| CategoryScore {
                    name: name.to_string(),
                    score: 81.0,
                    comment: String::new(),
                })
                .collect(),
            strengths: vec!["concise".to_string()],
            areas_for_improvement: vec!["examples".to_string()],
            final_assessment: "Good.".to_string(),
        }
    }

    fn params() -> CreateFeedbackParams {
        let mut params = CreateFeedbackParams::new(
            "abc123",
            vec![
                Message::new(Role::Assistant, "Why Rust?").unwrap(),
                Message::new(Role::User, "Memory safety\n\nwithout a GC. ").unwrap(),
            ],
        );
        params.legacy_user_id = Some("legacy-1".to_string());
        params
    }

    fn generator() -> MockFeedbackGenerator {
        let mut generator = MockFeedbackGenerator::new();
        generator.expect_generate().returning(|_| Ok(report()));
        generator
    }

    fn accepting_verifier(uid: &'static str) -> MockTokenVerifier {
        let mut verifier = MockTokenVerifier::new();
        verifier
            .expect_verify()
            .returning(move |_| Ok(Principal::new(uid)));
        verifier
    }

    #[test]
    fn transcript_lines_are_flattened() {
        assert_eq!(
            format_transcript(&params().transcript),
            "- assistant: Why Rust?\n- user: Memory safety without a GC.\n"
        );
    }

    #[tokio::test]
    async fn verified_token_sets_user() {
        let service = FeedbackService::new(
            generator(),
            InMemoryFeedbackStore::new(),
            Some(accepting_verifier("verified-1")),
        );
        let mut params = params();
        params.id_token = Some("token".to_string());

        let outcome = service.create(params).await;
        assert!(outcome.success);
        let stored = service
            .get_feedback_by_interview_id("abc123", "verified-1")
            .await
            .unwrap()
            .expect("stored under the verified user");
        assert_eq!(Some(stored.id.as_str()), outcome.feedback_id.as_deref());
    }

    #[tokio::test]
    async fn failed_verification_falls_back_to_legacy_id() {
        let mut verifier = MockTokenVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Err(TokenError::BadSignature));
        let service = FeedbackService::new(generator(), InMemoryFeedbackStore::new(), Some(verifier));
        let mut params = params();
        params.id_token = Some("forged".to_string());

        assert!(service.create(params).await.success);
        assert!(
            service
                .get_feedback_by_interview_id("abc123", "legacy-1")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn missing_interview_id_fails_without_scoring() {
        let mut generator = MockFeedbackGenerator::new();
        generator.expect_generate().times(0);
        let service =
            FeedbackService::<_, _, MockTokenVerifier>::new(generator, InMemoryFeedbackStore::new(), None);
        let mut params = params();
        params.interview_id = String::new();

        let outcome = service.create(params).await;
        assert_eq!(outcome, FeedbackOutcome::failed("Missing interviewId"));
    }

    #[tokio::test]
    async fn empty_transcript_fails_without_scoring() {
        let mut generator = MockFeedbackGenerator::new();
        generator.expect_generate().times(0);
        let service =
            FeedbackService::<_, _, MockTokenVerifier>::new(generator, InMemoryFeedbackStore::new(), None);
        let mut params = params();
        params.transcript.clear();

        let outcome = service.create(params).await;
        assert_eq!(outcome, FeedbackOutcome::failed("Empty transcript"));
    }

    #[tokio::test]
    async fn generator_error_is_a_failed_outcome() {
        let mut generator = MockFeedbackGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Err(anyhow::anyhow!("quota exceeded")));
        let mut store = MockFeedbackStore::new();
        store.expect_put().times(0);
        let service = FeedbackService::<_, _, MockTokenVerifier>::new(generator, store, None);

        let outcome = service.create(params()).await;
        assert!(!outcome.success);
        assert!(outcome.feedback_id.is_none());
    }

    #[tokio::test]
    async fn supplied_feedback_id_is_overwritten() {
        let service = FeedbackService::<_, _, MockTokenVerifier>::new(
            generator(),
            InMemoryFeedbackStore::new(),
            None,
        );
        let mut first = params();
        first.feedback_id = Some("fb-fixed".to_string());
        let mut second = params();
        second.feedback_id = Some("fb-fixed".to_string());

        assert_eq!(service.create(first).await, FeedbackOutcome::succeeded("fb-fixed"));
        assert_eq!(service.create(second).await, FeedbackOutcome::succeeded("fb-fixed"));
    }

    #[tokio::test]
    async fn token_without_verifier_uses_legacy_id() {
        let service = FeedbackService::<_, _, MockTokenVerifier>::new(
            generator(),
            InMemoryFeedbackStore::new(),
            None,
        );
        let mut params = params();
        params.id_token = Some("token".to_string());
        assert!(service.create(params).await.success);
        assert!(
            service
                .get_feedback_by_interview_id("abc123", "legacy-1")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn acts_as_feedback_scorer() {
        let service = FeedbackService::new(
            generator(),
            InMemoryFeedbackStore::new(),
            Some(accepting_verifier("verified-1")),
        );
        let outcome = service.create_feedback(params()).await.unwrap();
        assert!(outcome.success);
    }
}
