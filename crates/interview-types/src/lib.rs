//now people using the types library can use these types
pub mod events;
pub mod feedback;
pub mod message;
pub mod session;
pub mod start;

//re-export types for easier access
pub use events::{TranscriptEvent, TransportEvent};
pub use feedback::{CategoryScore, CreateFeedbackParams, Feedback, FeedbackOutcome, FeedbackReport};
pub use message::{Message, Role};
pub use session::{InterviewPlan, Session, SessionKind};
pub use start::{AgentTarget, AssistantConfig, StartOptions, StartRequest};
