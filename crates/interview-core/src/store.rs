use anyhow::Result;
use async_trait::async_trait;
use interview_types::Feedback;
#[cfg(test)]
use mockall::automock;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Document store for feedback, keyed by feedback id.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Writes `feedback` under its id, replacing any existing document.
    async fn put(&self, feedback: Feedback) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<Feedback>>;

    /// Most recent feedback for `interview_id` owned by `user_id`.
    async fn find_by_interview(&self, interview_id: &str, user_id: &str) -> Result<Option<Feedback>>;
}

#[derive(Default)]
pub struct InMemoryFeedbackStore {
    docs: RwLock<HashMap<String, Feedback>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn put(&self, feedback: Feedback) -> Result<()> {
        let mut docs = self.docs.write().await;
        if docs.insert(feedback.id.clone(), feedback).is_some() {
            tracing::debug!("overwrote existing feedback document");
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Feedback>> {
        Ok(self.docs.read().await.get(id).cloned())
    }

    async fn find_by_interview(&self, interview_id: &str, user_id: &str) -> Result<Option<Feedback>> {
        let docs = self.docs.read().await;
        let found = docs
            .values()
            .filter(|f| f.interview_id == interview_id && f.user_id.as_deref() == Some(user_id))
            .max_by_key(|f| f.created_at)
            .cloned();
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use interview_types::FeedbackReport;

    fn feedback(id: &str, interview_id: &str, user_id: Option<&str>, age_minutes: i64) -> Feedback {
        Feedback {
            id: id.to_string(),
            interview_id: interview_id.to_string(),
            user_id: user_id.map(str::to_string),
            report: FeedbackReport {
                total_score: 50.0,
                category_scores: vec![],
                strengths: vec![],
                areas_for_improvement: vec![],
                final_assessment: id.to_string(),
            },
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn put_overwrites_by_id() {
        let store = InMemoryFeedbackStore::new();
        store.put(feedback("fb1", "i1", Some("u1"), 10)).await.unwrap();
        let mut updated = feedback("fb1", "i1", Some("u1"), 0);
        updated.report.total_score = 90.0;
        store.put(updated).await.unwrap();

        let stored = store.get("fb1").await.unwrap().unwrap();
        assert_eq!(stored.report.total_score, 90.0);
    }

    #[tokio::test]
    async fn find_matches_interview_and_user() {
        let store = InMemoryFeedbackStore::new();
        store.put(feedback("old", "i1", Some("u1"), 30)).await.unwrap();
        store.put(feedback("new", "i1", Some("u1"), 1)).await.unwrap();
        store.put(feedback("other-user", "i1", Some("u2"), 0)).await.unwrap();
        store.put(feedback("anonymous", "i1", None, 0)).await.unwrap();
        store.put(feedback("other-interview", "i2", Some("u1"), 0)).await.unwrap();

        let found = store.find_by_interview("i1", "u1").await.unwrap().unwrap();
        assert_eq!(found.id, "new");
        assert!(store.find_by_interview("i3", "u1").await.unwrap().is_none());
    }
}
