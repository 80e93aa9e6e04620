use interview_types::{StartRequest, TransportEvent};
use serde_json::Value;

/// Frames sent to the voice agent.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    Start(StartRequest),
    Stop,
}

/// Maps one inbound text frame to a transport event.
///
/// Lifecycle frames map to their own variants; every other JSON object is
/// passed through as a raw message record. Returns `None` for text that is
/// not a JSON object.
pub fn parse_server_frame(text: &str) -> Option<TransportEvent> {
    let json = match serde_json::from_str::<Value>(text) {
        Ok(json @ Value::Object(_)) => json,
        Ok(other) => {
            tracing::warn!("ignoring non-object frame: {}", other);
            return None;
        }
        Err(e) => {
            tracing::error!("failed to deserialize frame: {}, text=> {:?}", e, text);
            return None;
        }
    };

    let event = match json.get("type").and_then(Value::as_str) {
        Some("call-start") => TransportEvent::CallStart,
        Some("call-end") => TransportEvent::CallEnd,
        Some("speech-start") => TransportEvent::SpeechStart,
        Some("speech-end") => TransportEvent::SpeechEnd,
        Some("error") => {
            let message = json
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            TransportEvent::Error(message)
        }
        _ => TransportEvent::Message(json),
    };
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_types::{AgentTarget, StartOptions};
    use serde_json::json;

    #[test]
    fn lifecycle_frames() {
        assert_eq!(parse_server_frame(r#"{"type":"call-start"}"#), Some(TransportEvent::CallStart));
        assert_eq!(parse_server_frame(r#"{"type":"call-end"}"#), Some(TransportEvent::CallEnd));
        assert_eq!(
            parse_server_frame(r#"{"type":"speech-start"}"#),
            Some(TransportEvent::SpeechStart)
        );
        assert_eq!(parse_server_frame(r#"{"type":"speech-end"}"#), Some(TransportEvent::SpeechEnd));
    }

    #[test]
    fn error_frame_carries_message() {
        assert_eq!(
            parse_server_frame(r#"{"type":"error","message":"meeting ended"}"#),
            Some(TransportEvent::Error("meeting ended".to_string()))
        );
        assert_eq!(
            parse_server_frame(r#"{"type":"error"}"#),
            Some(TransportEvent::Error("unknown error".to_string()))
        );
    }

    #[test]
    fn everything_else_is_a_message() {
        let frame = json!({
            "type": "transcript",
            "transcriptType": "final",
            "role": "assistant",
            "transcript": "Hello"
        });
        assert_eq!(
            parse_server_frame(&frame.to_string()),
            Some(TransportEvent::Message(frame))
        );
        let untyped = json!({"status": "ringing"});
        assert_eq!(
            parse_server_frame(&untyped.to_string()),
            Some(TransportEvent::Message(untyped))
        );
    }

    #[test]
    fn junk_is_dropped() {
        assert_eq!(parse_server_frame("not json"), None);
        assert_eq!(parse_server_frame("[1,2]"), None);
    }

    #[test]
    fn outbound_frames_are_type_tagged() {
        let start = ClientEvent::Start(StartRequest::new(
            AgentTarget::Workflow {
                workflow_id: "wf-1".to_string(),
            },
            StartOptions::transcripts().with_variable("username", "Ada"),
        ));
        let value = serde_json::to_value(&start).unwrap();
        assert_eq!(value["type"], "start");
        assert_eq!(value["workflowId"], "wf-1");
        assert_eq!(value["variableValues"]["username"], "Ada");

        assert_eq!(serde_json::to_value(ClientEvent::Stop).unwrap(), json!({"type": "stop"}));
    }
}
