//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bank::BankInventory;
use crate::domain::{AnswerOption, QuestionId, QuestionRecord, QuestionType};
use crate::ledger::ScoringLedger;
use crate::session::{AnswerFeedback, QuizResult};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartQuiz {
        #[serde(default)]
        count: Option<usize>,
    },
    CurrentQuestion {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Answer {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(flatten)]
        answer: AnswerIn,
    },
    Next {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Result {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Started {
        session: StartOut,
    },
    Question {
        question: Option<QuestionOut>,
    },
    AnswerResult {
        feedback: AnswerFeedback,
    },
    Next {
        next: NextOut,
    },
    Result {
        result: QuizResult,
    },
    Error {
        message: String,
    },
}

/// Question as shown before answering. Never carries the correct option.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionOut {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub category: String,
    pub question: String,
    pub options: Vec<AnswerOption>,
    /// 1-based position within the session.
    pub number: usize,
    pub total: usize,
    pub stage: usize,
    pub stage_name: String,
    pub progress: f64,
}

/// Convert a selected question plus the ledger position into the public DTO.
pub fn to_out(q: &QuestionRecord, ledger: &ScoringLedger) -> QuestionOut {
    QuestionOut {
        id: q.id,
        kind: q.kind,
        category: q.category_label().to_string(),
        question: q.question.clone(),
        options: q.options.clone(),
        number: ledger.current_question() + 1,
        total: ledger.total_questions(),
        stage: ledger.current_stage(),
        stage_name: ledger.stage_name().to_string(),
        progress: ledger.progress_percent(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Default, Deserialize)]
pub struct StartIn {
    #[serde(default)]
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct StartOut {
    pub session_id: String,
    pub total_questions: usize,
    pub question: Option<QuestionOut>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "questionId")]
    pub question_id: QuestionId,
    #[serde(rename = "optionId")]
    pub option_id: String,
    #[serde(rename = "elapsedMs", default)]
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct NextOut {
    pub finished: bool,
    pub question: Option<QuestionOut>,
}

#[derive(Debug, Serialize)]
pub struct BankOut {
    pub inventory: BankInventory,
    pub dimension_max: BTreeMap<String, f64>,
    pub count_choices: Vec<usize>,
    pub default_count: usize,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
