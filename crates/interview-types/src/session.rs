use std::fmt;

/// What a single voice session is for. Fixed for the life of the call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SessionKind {
    /// Workflow-driven conversation that builds the candidate's profile.
    GenerateProfile,
    /// Scripted interview over a fixed list of questions.
    ConductInterview(InterviewPlan),
}

impl SessionKind {
    pub fn label(&self) -> &'static str {
        match self {
            SessionKind::GenerateProfile => "generate-profile",
            SessionKind::ConductInterview(_) => "conduct-interview",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The identifiers and prompts of a `conduct-interview` session.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewPlan {
    /// Interview being conducted. The feedback collaborator rejects an empty id.
    interview_id: String,

    /// Existing feedback document to overwrite, if any.
    feedback_id: Option<String>,

    /// Questions to pose, in order.
    #[serde(default)]
    questions: Vec<String>,
}

impl InterviewPlan {
    pub fn new(interview_id: impl Into<String>) -> Self {
        Self {
            interview_id: interview_id.into(),
            feedback_id: None,
            questions: Vec::new(),
        }
    }

    pub fn with_feedback_id(mut self, feedback_id: impl Into<String>) -> Self {
        self.feedback_id = Some(feedback_id.into());
        self
    }

    pub fn with_questions<I, S>(mut self, questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.questions = questions.into_iter().map(Into::into).collect();
        self
    }

    pub fn interview_id(&self) -> &str {
        &self.interview_id
    }

    pub fn feedback_id(&self) -> Option<&str> {
        self.feedback_id.as_deref()
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Renders the questions as newline-joined `- ` bullets.
    pub fn formatted_questions(&self) -> String {
        self.questions
            .iter()
            .map(|q| format!("- {q}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One configured voice interaction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(flatten)]
    kind: SessionKind,

    /// Display name handed to the remote agent.
    user_name: Option<String>,

    /// Unverified user identifier, kept for the legacy identity fallback.
    user_id: Option<String>,
}

impl Session {
    pub fn generate_profile() -> Self {
        Self {
            kind: SessionKind::GenerateProfile,
            user_name: None,
            user_id: None,
        }
    }

    pub fn conduct_interview(plan: InterviewPlan) -> Self {
        Self {
            kind: SessionKind::ConductInterview(plan),
            user_name: None,
            user_id: None,
        }
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn kind(&self) -> &SessionKind {
        &self.kind
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}
