//! Error types for bank loading, session driving, and the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::domain::QuestionId;

/// Any of these means the quiz cannot start.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("cannot read question bank {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed question bank: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("question bank is empty")]
    Empty,
    #[error("duplicate question id {0}")]
    DuplicateId(QuestionId),
    #[error("question {id} has non-positive weight {weight}")]
    InvalidWeight { id: QuestionId, weight: f64 },
    #[error("question {id}: correct answer '{correct}' matches {matches} options, expected exactly one")]
    CorrectAnswer {
        id: QuestionId,
        correct: String,
        matches: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("all questions have already been answered")]
    Finished,
    #[error("question {got} is not the current question (expected {expected})")]
    WrongQuestion { expected: QuestionId, got: QuestionId },
    #[error("question {0} was already answered")]
    AlreadyAnswered(QuestionId),
    #[error("question {0} has not been answered yet")]
    NotAnswered(QuestionId),
    #[error("quiz not finished: {answered}/{total} answered")]
    NotFinished { answered: usize, total: usize },
}

/// Errors surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown session: {0}")]
    UnknownSession(String),
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::UnknownSession(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Session(_) => StatusCode::CONFLICT,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
