use crate::{
    Route,
    handoff::{FeedbackScorer, HandoffOrchestrator, HandoffRequest},
    identity::CredentialReader,
    transcript::Transcript,
    transport::Transport,
};
use interview_types::{
    AgentTarget, AssistantConfig, Message, Session, SessionKind, StartOptions, StartRequest,
    TransportEvent,
};
use tokio::sync::{broadcast, mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Inactive,
    Connecting,
    Active,
    Finished,
}

impl CallStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, CallStatus::Connecting | CallStatus::Active)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("a call is already in progress ({0:?})")]
    AlreadyInProgress(CallStatus),
    #[error("profile sessions need a workflow id to start")]
    MissingWorkflow,
    #[error("transport failed to start the call: {0}")]
    Start(String),
}

/// Caller-initiated actions, fed to [`CallSession::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    End,
}

/// Which remote agents the two start modes talk to.
#[derive(Debug, Clone)]
pub struct AgentDirectory {
    /// Workflow used by template-driven (profile) starts.
    pub workflow_id: Option<String>,
    /// Persona used by scripted (interview) starts.
    pub interviewer: AssistantConfig,
}

/// Lifecycle of one voice call: status, transcript and the finish handoff.
pub struct CallSession<T, S> {
    session: Session,
    agents: AgentDirectory,
    transport: T,
    status: CallStatus,
    is_speaking: bool,
    transcript: Transcript,
    handoff: HandoffOrchestrator<S>,
    credentials: CredentialReader,
    routes: mpsc::Sender<Route>,
}

impl<T, S> CallSession<T, S>
where
    T: Transport,
    S: FeedbackScorer,
{
    pub fn new(
        session: Session,
        agents: AgentDirectory,
        transport: T,
        scorer: S,
        credentials: CredentialReader,
        routes: mpsc::Sender<Route>,
    ) -> Self {
        Self {
            session,
            agents,
            transport,
            status: CallStatus::Inactive,
            is_speaking: false,
            transcript: Transcript::new(),
            handoff: HandoffOrchestrator::new(scorer),
            credentials,
            routes,
        }
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn is_speaking(&self) -> bool {
        self.is_speaking
    }

    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    pub fn subscribe_latest(&self) -> watch::Receiver<Option<Message>> {
        self.transcript.subscribe_latest()
    }

    fn set_status(&mut self, status: CallStatus) {
        tracing::debug!("call status {:?} -> {:?}", self.status, status);
        self.status = status;
    }

    /// Builds the transport request for this session's start mode.
    pub fn start_request(&self) -> Result<StartRequest, CallError> {
        let request = match self.session.kind() {
            SessionKind::GenerateProfile => {
                let workflow_id = self
                    .agents
                    .workflow_id
                    .clone()
                    .ok_or(CallError::MissingWorkflow)?;
                let options = StartOptions::transcripts()
                    .with_variable("username", self.session.user_name().unwrap_or_default())
                    .with_variable("userid", self.session.user_id().unwrap_or_default());
                StartRequest::new(AgentTarget::Workflow { workflow_id }, options)
            }
            SessionKind::ConductInterview(plan) => {
                let options =
                    StartOptions::transcripts().with_variable("questions", plan.formatted_questions());
                StartRequest::new(AgentTarget::Assistant(self.agents.interviewer.clone()), options)
            }
        };
        Ok(request)
    }

    /// Places the call. Rejected, without touching any state, while a call
    /// is connecting or active.
    pub async fn start_call(&mut self) -> Result<(), CallError> {
        if self.status.is_live() {
            tracing::warn!("start requested while {:?}, ignoring", self.status);
            return Err(CallError::AlreadyInProgress(self.status));
        }
        let request = self.start_request()?;

        if self.status == CallStatus::Finished {
            // A new call instance gets a fresh log.
            self.transcript.reset();
            self.is_speaking = false;
        }
        self.set_status(CallStatus::Connecting);

        tracing::info!("starting {} call", self.session.kind());
        if let Err(e) = self.transport.start(request).await {
            tracing::error!("failed to start call: {:?}", e);
            self.set_status(CallStatus::Inactive);
            return Err(CallError::Start(format!("{e:#}")));
        }
        Ok(())
    }

    /// Hangs up. A no-op unless a call is connecting or active.
    ///
    /// Returns the route chosen by the finish handoff.
    pub async fn end_call(&mut self) -> Option<Route> {
        if !self.status.is_live() {
            tracing::debug!("end requested while {:?}, nothing to do", self.status);
            return None;
        }
        if let Err(e) = self.transport.stop().await {
            tracing::error!("failed to stop transport: {:?}", e);
        }
        Some(self.finish().await)
    }

    /// Applies one transport event. Returns the route when the event ended
    /// the call.
    pub async fn handle_event(&mut self, event: TransportEvent) -> Option<Route> {
        match event {
            TransportEvent::CallStart => {
                if self.status == CallStatus::Connecting {
                    self.set_status(CallStatus::Active);
                } else {
                    tracing::debug!("call-start while {:?}, ignoring", self.status);
                }
            }
            TransportEvent::CallEnd => {
                if self.status.is_live() {
                    return Some(self.finish().await);
                }
                tracing::debug!("call-end while {:?}, ignoring", self.status);
            }
            TransportEvent::Message(record) => {
                if !self.status.is_live() {
                    tracing::trace!("message while {:?}, ignoring", self.status);
                } else if let Some(message) = self.transcript.ingest(&record) {
                    tracing::debug!("{}: {}", message.role(), message.content());
                }
            }
            TransportEvent::SpeechStart => self.is_speaking = true,
            TransportEvent::SpeechEnd => self.is_speaking = false,
            TransportEvent::Error(e) => {
                // The transport follows up with its own call-end.
                tracing::error!("transport error: {}", e);
            }
        }
        None
    }

    /// Enters `Finished` and runs the exit action.
    async fn finish(&mut self) -> Route {
        self.set_status(CallStatus::Finished);
        self.is_speaking = false;
        let messages = self.transcript.freeze();

        let route = match self.session.kind() {
            SessionKind::GenerateProfile => Route::Home,
            SessionKind::ConductInterview(plan) => {
                let request = HandoffRequest {
                    interview_id: plan.interview_id().to_string(),
                    messages,
                    feedback_id: plan.feedback_id().map(str::to_string),
                    credential: self.credentials.current(),
                    legacy_user_id: self.session.user_id().map(str::to_string),
                };
                self.handoff.hand_off(&request).await
            }
        };

        tracing::info!("routing to {}", route.path());
        if self.routes.send(route.clone()).await.is_err() {
            tracing::warn!("route receiver dropped, nobody will navigate");
        }
        route
    }

    /// Drives the session on the current task until the call finishes or the
    /// caller drops its control sender.
    ///
    /// Transport events are subscribed here and released on return. Dropping
    /// the controls while a call is live hangs up first.
    pub async fn run(mut self, mut controls: mpsc::Receiver<Control>) -> Option<Route> {
        let mut events = self.transport.subscribe();

        loop {
            tokio::select! {
                control = controls.recv() => match control {
                    Some(Control::Start) => {
                        if let Err(e) = self.start_call().await {
                            tracing::warn!("start rejected: {}", e);
                        }
                    }
                    Some(Control::End) => {
                        if let Some(route) = self.end_call().await {
                            return Some(route);
                        }
                    }
                    None => {
                        if self.status.is_live() {
                            tracing::info!("session torn down mid-call, hanging up");
                            if let Err(e) = self.transport.stop().await {
                                tracing::error!("failed to stop transport: {:?}", e);
                            }
                        }
                        return None;
                    }
                },
                event = events.recv() => match event {
                    Ok(event) => {
                        if let Some(route) = self.handle_event(event).await {
                            return Some(route);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("transport events lagged, skipped {}", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::warn!("transport event stream closed");
                        if self.status.is_live() {
                            return Some(self.finish().await);
                        }
                        return None;
                    }
                },
            }
        }
    }
}
