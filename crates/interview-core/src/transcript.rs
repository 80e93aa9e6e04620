use interview_types::{Message, Role, TranscriptEvent};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// Folds one raw transport record into at most one message.
///
/// Only `transcript` records marked final with resolvable, non-empty text
/// produce a message. Everything else is a filtering decision, not an error.
pub fn reduce(record: &Value) -> Option<Message> {
    let event = TranscriptEvent::from_value(record);
    if !event.is_transcript() || !event.is_final() {
        return None;
    }
    let text = event.text()?;
    Message::new(Role::normalize(event.role()), text)
}

/// The ordered message log of one call.
///
/// Grows while the call is live and is frozen once the call finishes. The
/// most recent message is also published on a watch channel for live display.
pub struct Transcript {
    messages: Vec<Message>,
    frozen: bool,
    latest: watch::Sender<Option<Message>>,
}

impl Transcript {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            messages: Vec::new(),
            frozen: false,
            latest,
        }
    }

    /// Receiver that always holds the most recently appended message.
    pub fn subscribe_latest(&self) -> watch::Receiver<Option<Message>> {
        self.latest.subscribe()
    }

    /// Reduces `record` and appends the result. Returns the appended message.
    pub fn ingest(&mut self, record: &Value) -> Option<&Message> {
        let Some(message) = reduce(record) else {
            tracing::trace!("dropped transport record: {}", record);
            return None;
        };
        if self.frozen {
            tracing::debug!("transcript is frozen, ignoring {} message", message.role());
            return None;
        }
        self.latest.send_replace(Some(message.clone()));
        self.messages.push(message);
        self.messages.last()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Stops further appends and returns the log as it stands.
    pub fn freeze(&mut self) -> Arc<[Message]> {
        self.frozen = true;
        Arc::from(self.messages.as_slice())
    }

    /// Empties the log for a new call.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.frozen = false;
        self.latest.send_replace(None);
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn final_event(role: &str, text: &str) -> Value {
        json!({"type": "transcript", "transcriptType": "final", "role": role, "transcript": text})
    }

    #[test]
    fn final_user_transcript_becomes_message() {
        let mut transcript = Transcript::new();
        transcript.ingest(&final_event("user", "Hello"));
        assert_eq!(transcript.messages(), &[Message::new(Role::User, "Hello").unwrap()]);
    }

    #[test]
    fn partial_transcript_is_dropped() {
        let mut transcript = Transcript::new();
        let partial = json!({
            "type": "transcript",
            "transcriptType": "partial",
            "role": "assistant",
            "transcript": "Hel",
        });
        assert!(transcript.ingest(&partial).is_none());
        assert!(transcript.is_empty());
    }

    #[test]
    fn non_transcript_records_are_ignored() {
        let records = [
            json!({"type": "status-update", "transcriptType": "final", "transcript": "x"}),
            json!({"transcriptType": "final", "transcript": "x"}),
            json!({"type": "transcript", "transcriptType": "final"}),
            json!({"type": "transcript", "isFinal": true, "transcript": "", "text": ""}),
            json!("transcript"),
        ];
        for record in &records {
            assert!(reduce(record).is_none(), "{record} should be dropped");
        }
    }

    #[test]
    fn is_final_boolean_accepts_record() {
        let record = json!({"type": "transcript", "isFinal": true, "role": "agent", "text": "Hi there"});
        let message = reduce(&record).unwrap();
        assert_eq!(message.role(), Role::Assistant);
        assert_eq!(message.content(), "Hi there");
    }

    #[test]
    fn string_content_is_last_fallback() {
        let record = json!({"type": "transcript", "transcriptType": "user_final", "content": "From content"});
        let message = reduce(&record).unwrap();
        assert_eq!(message.role(), Role::User);
        assert_eq!(message.content(), "From content");
    }

    #[test]
    fn order_follows_final_events() {
        let mut transcript = Transcript::new();
        let records = [
            final_event("assistant", "Welcome"),
            json!({"type": "transcript", "transcriptType": "partial", "role": "user", "transcript": "I"}),
            json!({"type": "transcript", "transcriptType": "user_final", "role": "user", "transcript": "I am ready"}),
            json!({"type": "speech-update"}),
            json!({"type": "transcript", "transcriptType": "assistant_final", "role": "system", "transcript": "Note"}),
            final_event("user", "I am ready"),
        ];
        for record in &records {
            transcript.ingest(record);
        }
        let got: Vec<(Role, &str)> = transcript
            .messages()
            .iter()
            .map(|m| (m.role(), m.content()))
            .collect();
        assert_eq!(
            got,
            vec![
                (Role::Assistant, "Welcome"),
                (Role::User, "I am ready"),
                (Role::System, "Note"),
                (Role::User, "I am ready"),
            ]
        );
    }

    #[test]
    fn latest_message_is_published() {
        let mut transcript = Transcript::new();
        let latest = transcript.subscribe_latest();
        assert!(latest.borrow().is_none());

        transcript.ingest(&final_event("user", "first"));
        transcript.ingest(&final_event("assistant", "second"));
        assert_eq!(latest.borrow().as_ref().map(Message::content), Some("second"));
    }

    #[test]
    fn frozen_transcript_rejects_appends() {
        let mut transcript = Transcript::new();
        transcript.ingest(&final_event("user", "before"));
        let snapshot = transcript.freeze();
        transcript.ingest(&final_event("user", "after"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(transcript.len(), 1);

        transcript.reset();
        assert!(transcript.is_empty());
        assert!(!transcript.is_frozen());
    }
}
