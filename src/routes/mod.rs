//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/bank", get(http::http_get_bank))
        .route("/api/v1/session", post(http::http_post_session))
        .route("/api/v1/session/:id/question", get(http::http_get_question))
        .route("/api/v1/session/:id/answer", post(http::http_post_answer))
        .route("/api/v1/session/:id/next", post(http::http_post_next))
        .route("/api/v1/session/:id/result", get(http::http_get_result))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::fixtures::twenty_question_bank;
    use crate::config::QuizConfig;
    use crate::protocol::ClientWsMessage;
    use crate::protocol::ServerWsMessage;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::with_bank(twenty_question_bank(), QuizConfig::default()))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = build_router(test_state());
        let (status, body) = call(&app, "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn bank_overview_lists_choices() {
        let app = build_router(test_state());
        let (status, body) = call(&app, "GET", "/api/v1/bank", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["inventory"]["total"], 20);
        assert_eq!(body["count_choices"], json!([10, 25, 50]));
        assert_eq!(body["dimension_max"]["memory"], 20.0);
    }

    #[tokio::test]
    async fn full_play_through_over_http() {
        let app = build_router(test_state());
        let (status, started) = call(&app, "POST", "/api/v1/session", Some(json!({ "count": 3 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(started["total_questions"], 3);
        assert!(started["question"].get("correct_answer").is_none());
        assert!(started["question"].get("correctAnswer").is_none());
        let sid = started["session_id"].as_str().unwrap().to_string();

        let (status, _) = call(&app, "GET", &format!("/api/v1/session/{sid}/result"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let mut question_id = started["question"]["id"].as_u64().unwrap();
        for round in 0..3 {
            let (status, fb) = call(
                &app,
                "POST",
                &format!("/api/v1/session/{sid}/answer"),
                Some(json!({ "questionId": question_id, "optionId": "a", "elapsedMs": 900 })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(fb["correct"], true);
            assert_eq!(fb["is_last"], round == 2);

            let (status, next) = call(&app, "POST", &format!("/api/v1/session/{sid}/next"), None).await;
            assert_eq!(status, StatusCode::OK);
            if round < 2 {
                assert_eq!(next["finished"], false);
                question_id = next["question"]["id"].as_u64().unwrap();
            } else {
                assert_eq!(next["finished"], true);
                assert!(next["question"].is_null());
            }
        }

        let (status, result) = call(&app, "GET", &format!("/api/v1/session/{sid}/result"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["total_score"], 100);
        assert_eq!(result["correct_count"], 3);
        assert_eq!(result["category"]["key"], "explorer");
        assert_eq!(result["answers"].as_array().map(Vec::len), Some(3));

        // The result closes the session.
        let (status, _) = call(&app, "GET", &format!("/api/v1/session/{sid}/result"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_start_body_is_rejected() {
        let state = test_state();
        let app = build_router(state.clone());
        for body in [json!({ "count": -1 }), json!({ "count": "abc" }), json!("ten")] {
            let (status, reply) = call(&app, "POST", "/api/v1/session", Some(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert!(reply["error"].as_str().unwrap().contains("invalid request body"));
        }
        assert!(state.sessions.read().await.is_empty());

        let (status, started) = call(&app, "POST", "/api/v1/session", Some(json!({ "count": 0 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(started["total_questions"], 0);
        assert!(started["question"].is_null());

        let (status, started) = call(&app, "POST", "/api/v1/session", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(started["total_questions"], 10);
    }

    #[tokio::test]
    async fn expired_sessions_are_swept_on_start() {
        let config = QuizConfig { session_ttl_secs: 0, ..QuizConfig::default() };
        let state = AppState::with_bank(twenty_question_bank(), config);
        for _ in 0..5 {
            state.start_session(Some(2)).await;
        }
        assert_eq!(state.sessions.read().await.len(), 1);

        let state = test_state();
        for _ in 0..5 {
            state.start_session(Some(2)).await;
        }
        assert_eq!(state.sessions.read().await.len(), 5);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let app = build_router(test_state());
        let (status, body) = call(&app, "GET", "/api/v1/session/nope/question", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn double_answer_conflicts() {
        let app = build_router(test_state());
        let (_, started) = call(&app, "POST", "/api/v1/session", None).await;
        assert_eq!(started["total_questions"], 10);
        let sid = started["session_id"].as_str().unwrap().to_string();
        let qid = started["question"]["id"].as_u64().unwrap();
        let answer = json!({ "questionId": qid, "optionId": "b" });

        let (status, fb) = call(&app, "POST", &format!("/api/v1/session/{sid}/answer"), Some(answer.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fb["correct"], false);
        assert_eq!(fb["correct_answer"], "a");

        let (status, _) = call(&app, "POST", &format!("/api/v1/session/{sid}/answer"), Some(answer)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn ws_messages_drive_a_session() {
        let state = test_state();
        let started = ws::handle_client_ws(ClientWsMessage::StartQuiz { count: Some(1) }, &state).await;
        let ServerWsMessage::Started { session } = started else {
            panic!("expected started, got {started:?}");
        };
        let qid = session.question.as_ref().unwrap().id;

        let msg: ClientWsMessage = serde_json::from_value(json!({
            "type": "answer",
            "sessionId": session.session_id,
            "questionId": qid,
            "optionId": "a"
        }))
        .unwrap();
        let reply = ws::handle_client_ws(msg, &state).await;
        assert!(matches!(reply, ServerWsMessage::AnswerResult { ref feedback } if feedback.correct && feedback.is_last));

        let reply = ws::handle_client_ws(ClientWsMessage::Result { session_id: session.session_id.clone() }, &state).await;
        assert!(matches!(reply, ServerWsMessage::Error { .. }));

        ws::handle_client_ws(ClientWsMessage::Next { session_id: session.session_id.clone() }, &state).await;
        let reply = ws::handle_client_ws(ClientWsMessage::Result { session_id: session.session_id }, &state).await;
        let ServerWsMessage::Result { result } = reply else {
            panic!("expected result, got {reply:?}");
        };
        assert_eq!(result.total_score, 100);
        assert!(state.sessions.read().await.is_empty());
    }
}
