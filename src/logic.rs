//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Starting a session and showing its first question
//!   - Answering the current question, advancing the cursor
//!   - Assembling the final result once every question is answered, which
//!     also closes the session

use std::collections::BTreeMap;

use tracing::{info, instrument};

use crate::domain::Dimension;
use crate::error::ApiError;
use crate::protocol::{to_out, AnswerIn, BankOut, NextOut, QuestionOut, StartOut};
use crate::session::{AnswerFeedback, QuizResult};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn start_quiz(state: &AppState, count: Option<usize>) -> Result<StartOut, ApiError> {
  let session_id = state.start_session(count).await;
  let (total_questions, question) = state
    .with_session(&session_id, |s, _| {
      let q = s.current_question().map(|q| to_out(q, s.ledger()));
      Ok((s.ledger().total_questions(), q))
    })
    .await?;
  Ok(StartOut { session_id, total_questions, question })
}

#[instrument(level = "info", skip(state))]
pub async fn current_question(state: &AppState, session_id: &str) -> Result<Option<QuestionOut>, ApiError> {
  state
    .with_session(session_id, |s, _| Ok(s.current_question().map(|q| to_out(q, s.ledger()))))
    .await
}

#[instrument(level = "info", skip(state, answer), fields(question_id = answer.question_id, option_id = %answer.option_id))]
pub async fn submit_answer(state: &AppState, session_id: &str, answer: &AnswerIn) -> Result<AnswerFeedback, ApiError> {
  let feedback = state
    .with_session(session_id, |s, bank| {
      s.answer(bank, answer.question_id, &answer.option_id, answer.elapsed_ms)
    })
    .await?;
  info!(target: "quiz", %session_id, question_id = answer.question_id, correct = feedback.correct, "Answer evaluated");
  Ok(feedback)
}

#[instrument(level = "info", skip(state))]
pub async fn next_question(state: &AppState, session_id: &str) -> Result<NextOut, ApiError> {
  state
    .with_session(session_id, |s, _| {
      s.advance()?;
      let question = s.current_question().map(|q| to_out(q, s.ledger()));
      Ok(NextOut { finished: s.is_finished(), question })
    })
    .await
}

#[instrument(level = "info", skip(state))]
pub async fn quiz_result(state: &AppState, session_id: &str) -> Result<QuizResult, ApiError> {
  let result = state.finish_session(session_id).await?;
  info!(
    target: "quiz",
    %session_id,
    category = result.category.key,
    total_score = result.total_score,
    correct = result.correct_count,
    total = result.total_questions,
    "Quiz result computed"
  );
  Ok(result)
}

pub fn bank_overview(state: &AppState) -> BankOut {
  let dimension_max = Dimension::ALL
    .iter()
    .map(|d| (d.key().to_string(), state.bank.dimension_max(*d)))
    .collect::<BTreeMap<_, _>>();
  BankOut {
    inventory: state.bank.inventory(),
    dimension_max,
    count_choices: state.config.count_choices.clone(),
    default_count: state.config.default_count,
  }
}
