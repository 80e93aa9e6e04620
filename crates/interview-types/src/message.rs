use std::fmt;

/// Who produced a line of the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Maps a role label reported by the transport onto a transcript role.
    ///
    /// `user`, `assistant` and `system` pass through, `agent` becomes
    /// `assistant`, and anything else (including a missing label) is treated
    /// as `user`.
    // NOTE: unknown labels fall back to `user`. Candidate policy to revisit,
    // do not tighten without product sign-off.
    pub fn normalize(label: Option<&str>) -> Self {
        match label {
            Some("user") => Role::User,
            Some("assistant") | Some("agent") => Role::Assistant,
            Some("system") => Role::System,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finalized line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawMessage")]
pub struct Message {
    /// The role of the speaker: "user", "assistant", "system"
    role: Role,

    /// What was said. Never empty.
    content: String,
}

impl Message {
    /// Returns `None` when `content` is empty.
    pub fn new(role: Role, content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.is_empty() {
            return None;
        }
        Some(Self { role, content })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(serde::Deserialize)]
struct RawMessage {
    role: Role,
    content: String,
}

impl TryFrom<RawMessage> for Message {
    type Error = &'static str;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        Message::new(raw.role, raw.content).ok_or("message content must not be empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_covers_every_label() {
        assert_eq!(Role::normalize(Some("user")), Role::User);
        assert_eq!(Role::normalize(Some("assistant")), Role::Assistant);
        assert_eq!(Role::normalize(Some("system")), Role::System);
        assert_eq!(Role::normalize(Some("agent")), Role::Assistant);
        assert_eq!(Role::normalize(Some("bot")), Role::User);
        assert_eq!(Role::normalize(Some("Assistant")), Role::User);
        assert_eq!(Role::normalize(Some("")), Role::User);
        assert_eq!(Role::normalize(None), Role::User);
    }

    #[test]
    fn empty_content_is_rejected() {
        assert!(Message::new(Role::User, "").is_none());
        let message = Message::new(Role::System, "hi").unwrap();
        assert_eq!(message.role(), Role::System);
        assert_eq!(message.content(), "hi");
    }

    #[test]
    fn message_serializes_with_lowercase_role() {
        let message = Message::new(Role::Assistant, "Welcome").unwrap();
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "Welcome"}));
    }

    #[test]
    fn deserializing_empty_content_fails() {
        let result = serde_json::from_str::<Message>(r#"{"role":"user","content":""}"#);
        assert!(result.is_err());
    }
}
