use crate::error::ApiError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use interview_core::feedback_service::FeedbackService;
use interview_core::scoring::FeedbackGenerator;
use interview_core::store::InMemoryFeedbackStore;
use interview_core::token::HmacTokenVerifier;
use interview_types::{CreateFeedbackParams, Feedback, FeedbackOutcome};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub type Service =
    FeedbackService<Arc<dyn FeedbackGenerator>, InMemoryFeedbackStore, HmacTokenVerifier>;

#[derive(Clone)]
pub struct AppState {
    service: Arc<Service>,
}

impl AppState {
    pub fn new(service: Service) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackQuery {
    interview_id: String,
    user_id: String,
}

/// `POST /api/feedback`: scores and stores a transcript.
async fn create_feedback(
    State(state): State<AppState>,
    body: Result<Json<CreateFeedbackParams>, JsonRejection>,
) -> Result<Json<FeedbackOutcome>, ApiError> {
    let Json(params) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(state.service.create(params).await))
}

/// `GET /api/feedback?interviewId=..&userId=..`
async fn get_feedback(
    State(state): State<AppState>,
    query: Result<Query<FeedbackQuery>, QueryRejection>,
) -> Result<Json<Feedback>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    state
        .service
        .get_feedback_by_interview_id(&query.interview_id, &query.user_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub fn router(state: AppState) -> Router {
    // Permissive CORS so a separate frontend can call the API.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/feedback", post(create_feedback).get(get_feedback))
        .layer(cors)
        .with_state(state)
}
