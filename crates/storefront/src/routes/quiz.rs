//! Product recommendation quiz route handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::error::{ApiJson, AppError, Result};
use crate::services::quiz::{self, QUESTIONS, Question, QuizError, QuizSubmission, Recommendation};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quiz", get(questions))
        .route("/quiz/recommendation", post(recommendation))
}

pub async fn questions() -> Json<&'static [Question]> {
    Json(QUESTIONS)
}

pub async fn recommendation(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<QuizSubmission>,
) -> Result<Json<Recommendation>> {
    let recommendation = quiz::recommend(state.storage(), &body.answers)
        .await
        .map_err(|e| match e {
            QuizError::Repository(e) => AppError::Database(e),
            other => AppError::BadRequest(other.to_string()),
        })?;

    tracing::info!(
        primary_benefit = %recommendation.primary_benefit,
        products = recommendation.products.len(),
        "Quiz recommendation"
    );
    Ok(Json(recommendation))
}
