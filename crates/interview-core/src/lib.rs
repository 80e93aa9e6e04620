pub mod feedback_service;
pub mod handoff;
pub mod identity;
pub mod persona;
pub mod scoring;
pub mod session_state;
pub mod store;
pub mod token;
pub mod transcript;
pub mod transport;

use std::fmt;

/// Where the caller is sent once a session is over.
///
/// This enum is the routing surface the session exposes to whatever hosts it
/// (a page router, a CLI, a test).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The landing page.
    Home,
    /// The stored feedback for an interview.
    FeedbackDetail {
        interview_id: String,
        feedback_id: String,
    },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::FeedbackDetail { interview_id, .. } => {
                format!("/interview/{interview_id}/feedback")
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("home"),
            Route::FeedbackDetail {
                interview_id,
                feedback_id,
            } => write!(f, "feedback {feedback_id} for interview {interview_id}"),
        }
    }
}
