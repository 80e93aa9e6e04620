mod config;
mod error;
mod prompt_loader;
mod routes;

use crate::config::{Config, Provider};
use anyhow::{Context, Result};
use interview_core::feedback_service::FeedbackService;
use interview_core::scoring::{
    FeedbackGenerator, GeminiScoringClient, OpenAiScoringClient, ScoringPrompts,
};
use interview_core::store::InMemoryFeedbackStore;
use interview_core::token::HmacTokenVerifier;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

fn scoring_client(config: Config, prompts: ScoringPrompts) -> Result<Arc<dyn FeedbackGenerator>> {
    let client: Arc<dyn FeedbackGenerator> = match config.provider {
        Provider::OpenAI => Arc::new(OpenAiScoringClient::new(
            config.openai_api_key.context("OPENAI_API_KEY is not set")?,
            config.chat_model,
            prompts,
        )),
        Provider::Gemini => Arc::new(GeminiScoringClient::new(
            config.gemini_api_key.context("GEMINI_API_KEY is not set")?,
            config.chat_model,
            prompts,
        )),
    };
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = Config::from_env().context("Failed to load application configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    let prompts = prompt_loader::load_prompts(&config.prompts_dir)
        .context("Failed to load LLM prompts")?;
    info!("Loaded {} prompts successfully.", prompts.len());

    let verifier = match config.id_token_secret.take() {
        Some(secret) => Some(HmacTokenVerifier::new(secret)),
        None => {
            tracing::warn!("ID_TOKEN_SECRET not set, identity tokens will not verify");
            None
        }
    };

    let addr = config.bind_address;
    info!("Scoring with {:?} model '{}'", config.provider, config.chat_model);
    let generator = scoring_client(config, ScoringPrompts::from_map(&prompts))?;
    let service = FeedbackService::new(generator, InMemoryFeedbackStore::new(), verifier);
    let app = routes::router(routes::AppState::new(service));

    info!("Starting feedback API, listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
