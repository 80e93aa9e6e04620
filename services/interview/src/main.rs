use anyhow::{Context, Result};
use clap::Parser;
use interview_core::identity::TokenCache;
use interview_core::persona;
use interview_core::session_state::{AgentDirectory, CallSession, Control};
use interview_service::auth::EnvAuthProvider;
use interview_service::config::Config;
use interview_service::feedback_client::HttpFeedbackScorer;
use interview_service::vapi_adapter::VapiAdapter;
use interview_types::{InterviewPlan, Session};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::fmt::time::ChronoLocal;

/// Which start mode to run. The plan comes from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum SessionKindLabel {
    #[value(alias = "generate")]
    GenerateProfile,
    #[value(alias = "interview")]
    ConductInterview,
}

#[derive(Parser)]
#[command(version, about = "Runs one voice interview session from the terminal")]
struct Cli {
    #[arg(value_enum, ignore_case = true)]
    kind: SessionKindLabel,

    /// Interview to run. Required for conduct-interview.
    #[arg(long)]
    interview_id: Option<String>,

    /// Existing feedback document to overwrite.
    #[arg(long)]
    feedback_id: Option<String>,

    /// Interview question, repeatable.
    #[arg(long = "question")]
    questions: Vec<String>,

    #[arg(long)]
    user_name: Option<String>,

    /// Overrides USER_ID.
    #[arg(long)]
    user_id: Option<String>,
}

impl Cli {
    fn session(&self, user_id: Option<&str>) -> Result<Session> {
        let session = match self.kind {
            SessionKindLabel::GenerateProfile => Session::generate_profile(),
            SessionKindLabel::ConductInterview => {
                let interview_id = self
                    .interview_id
                    .as_deref()
                    .context("--interview-id is required for conduct-interview")?;
                let mut plan =
                    InterviewPlan::new(interview_id).with_questions(self.questions.iter().cloned());
                if let Some(feedback_id) = &self.feedback_id {
                    plan = plan.with_feedback_id(feedback_id);
                }
                Session::conduct_interview(plan)
            }
        };
        let session = match &self.user_name {
            Some(name) => session.with_user_name(name),
            None => session,
        };
        Ok(match user_id {
            Some(id) => session.with_user_id(id),
            None => session,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    // --- 3. Parse Command-Line Arguments ---
    let args = Cli::parse();
    let user_id = args.user_id.clone().or_else(|| config.user_id.clone());
    let session = args.session(user_id.as_deref())?;
    tracing::info!("Starting {} session", session.kind());

    // --- 4. Identity ---
    let provider = Arc::new(EnvAuthProvider::new(user_id, config.id_token));
    let auth = TokenCache::new().activate(provider.clone());

    // --- 5. Collaborators ---
    let vapi_config = vapi_realtime::Config::builder()
        .with_base_url(&config.vapi_base_url)
        .with_public_key(config.vapi_public_key)
        .build();
    let transport = VapiAdapter::connect(vapi_config).await?;
    let scorer = HttpFeedbackScorer::new(&config.feedback_api_url);
    let agents = AgentDirectory {
        workflow_id: config.workflow_id,
        interviewer: persona::interviewer(),
    };

    let (route_tx, mut route_rx) = tokio::sync::mpsc::channel(4);
    let (control_tx, control_rx) = tokio::sync::mpsc::channel::<Control>(8);

    let call = CallSession::new(session, agents, transport, scorer, auth.reader(), route_tx);
    let mut latest = call.subscribe_latest();
    let mut session_handle = tokio::spawn(call.run(control_rx));

    // Echo finalized lines as they arrive.
    let echo_handle = tokio::spawn(async move {
        while latest.changed().await.is_ok() {
            if let Some(message) = latest.borrow_and_update().clone() {
                println!("{}: {}", message.role(), message.content());
            }
        }
    });

    // --- 6. Controls from stdin ---
    // Held until the session finishes so stdin EOF does not hang up.
    let controls = control_tx.clone();
    println!("Type 'start' to place the call, 'end' to hang up, 'sign-out' to drop the identity.");
    let control_provider = provider.clone();
    let control_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read stdin: {}", e);
                    break;
                }
            };
            let control = match line.trim().to_lowercase().as_str() {
                "start" => Control::Start,
                "end" | "stop" => Control::End,
                "sign-out" | "signout" => {
                    control_provider.sign_out();
                    continue;
                }
                "" => continue,
                other => {
                    println!("Unknown command '{other}'.");
                    continue;
                }
            };
            if control_tx.send(control).await.is_err() {
                break;
            }
        }
    });

    let joined = tokio::select! {
        finished = &mut session_handle => finished,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, tearing the session down");
            control_handle.abort();
            drop(controls);
            (&mut session_handle).await
        }
    };
    let finished = joined.context("Session task panicked")?;
    control_handle.abort();
    echo_handle.abort();

    match route_rx.try_recv().ok().or(finished) {
        Some(route) => {
            tracing::info!("Session over, navigating to {} ({})", route.path(), route);
            println!("{}", route.path());
        }
        None => tracing::info!("Session ended without a route"),
    }
    Ok(())
}
