use serde_json::Value;

/// Lifecycle and content notifications emitted by the call transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The remote agent picked up; the call is live.
    CallStart,
    /// The call is over. Authoritative termination signal.
    CallEnd,
    /// A raw message record. Transcript events are one kind of message.
    Message(Value),
    /// The remote agent started speaking.
    SpeechStart,
    /// The remote agent stopped speaking.
    SpeechEnd,
    /// The transport reported a failure. Does not end the call by itself.
    Error(String),
}

/// Values of `transcriptType` that mark a transcript as final.
pub const FINAL_TRANSCRIPT_TYPES: [&str; 3] = ["final", "user_final", "assistant_final"];

/// The fields of a raw `transcript` message record that matter for the
/// message log.
///
/// Extraction is lenient: a field holding the wrong JSON type is read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptEvent {
    /// `type`, must be "transcript" for the record to count.
    kind: Option<String>,

    /// `transcriptType`, e.g. "partial" or "final".
    transcript_type: Option<String>,

    /// `isFinal`
    is_final: Option<bool>,

    /// `role` as labelled by the transport.
    role: Option<String>,

    /// `transcript`
    transcript: Option<String>,

    /// `text`
    text: Option<String>,

    /// `content`, only when it is a JSON string.
    content: Option<String>,
}

impl TranscriptEvent {
    pub fn from_value(value: &Value) -> Self {
        let string = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);
        Self {
            kind: string("type"),
            transcript_type: string("transcriptType"),
            is_final: value.get("isFinal").and_then(Value::as_bool),
            role: string("role"),
            transcript: string("transcript"),
            text: string("text"),
            content: string("content"),
        }
    }

    pub fn is_transcript(&self) -> bool {
        self.kind.as_deref() == Some("transcript")
    }

    /// True when either the `transcriptType` flag or the `isFinal` boolean
    /// marks this record final.
    pub fn is_final(&self) -> bool {
        let flagged = self
            .transcript_type
            .as_deref()
            .is_some_and(|t| FINAL_TRANSCRIPT_TYPES.contains(&t));
        flagged || self.is_final == Some(true)
    }

    /// First non-empty of `transcript`, `text`, `content`.
    pub fn text(&self) -> Option<&str> {
        [&self.transcript, &self.text, &self.content]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|text| !text.is_empty())
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

impl From<&Value> for TranscriptEvent {
    fn from(value: &Value) -> Self {
        Self::from_value(value)
    }
}
