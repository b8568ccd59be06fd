//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and log include parameters and basic result info.

use std::sync::Arc;
use axum::{body::Bytes, extract::{Path, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::logic::*;
use crate::protocol::*;
use crate::session::{AnswerFeedback, QuizResult};
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_bank(State(state): State<Arc<AppState>>) -> Json<BankOut> {
  Json(bank_overview(&state))
}

/// An empty body starts a default-sized session; anything else must parse as `StartIn`.
#[instrument(level = "info", skip(state, body), fields(body_len = body.len()))]
pub async fn http_post_session(
  State(state): State<Arc<AppState>>,
  body: Bytes,
) -> Result<Json<StartOut>, ApiError> {
  let start = if body.iter().all(u8::is_ascii_whitespace) {
    StartIn::default()
  } else {
    serde_json::from_slice::<StartIn>(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?
  };
  let out = start_quiz(&state, start.count).await?;
  info!(target: "quiz", session_id = %out.session_id, total = out.total_questions, "HTTP session started");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn http_get_question(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<Option<QuestionOut>>, ApiError> {
  Ok(Json(current_question(&state, &session_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%session_id, question_id = body.question_id))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerFeedback>, ApiError> {
  Ok(Json(submit_answer(&state, &session_id, &body).await?))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn http_post_next(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<NextOut>, ApiError> {
  Ok(Json(next_question(&state, &session_id).await?))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn http_get_result(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<QuizResult>, ApiError> {
  Ok(Json(quiz_result(&state, &session_id).await?))
}
