use anyhow::{Context, Result};
use async_trait::async_trait;
use interview_core::handoff::FeedbackScorer;
use interview_types::{CreateFeedbackParams, FeedbackOutcome};
use reqwest::Client;

pub const FEEDBACK_PATH: &str = "/api/feedback";

/// Submits transcripts to the feedback API over HTTP.
pub struct HttpFeedbackScorer {
    client: Client,
    url: String,
}

impl HttpFeedbackScorer {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            url: endpoint(base_url),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn endpoint(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), FEEDBACK_PATH)
}

#[async_trait]
impl FeedbackScorer for HttpFeedbackScorer {
    async fn create_feedback(&self, params: CreateFeedbackParams) -> Result<FeedbackOutcome> {
        tracing::info!(
            "submitting {} messages for interview {}",
            params.transcript.len(),
            params.interview_id
        );
        let outcome = self
            .client
            .post(&self.url)
            .json(&params)
            .send()
            .await
            .with_context(|| format!("Failed to reach feedback API at {}", self.url))?
            .error_for_status()?
            .json::<FeedbackOutcome>()
            .await
            .context("Failed to decode feedback API response")?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_cleanly() {
        assert_eq!(
            HttpFeedbackScorer::new("http://127.0.0.1:3000/").url(),
            "http://127.0.0.1:3000/api/feedback"
        );
        assert_eq!(endpoint("https://interviews.example.com"), "https://interviews.example.com/api/feedback");
    }

    #[tokio::test]
    async fn unreachable_api_is_an_error() {
        // Port 9 (discard) is not expected to run an HTTP server.
        let scorer = HttpFeedbackScorer::new("http://127.0.0.1:9");
        let params = CreateFeedbackParams::new("abc123", vec![]);
        assert!(scorer.create_feedback(params).await.is_err());
    }
}
