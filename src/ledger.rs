//! Per-play-through scoring ledger.
//!
//! The ledger only records; pacing (moving the cursor) belongs to the session
//! controller, which calls `advance` after the player has seen the feedback.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::bank::QuestionBank;
use crate::domain::{Dimension, QuestionId};

/// Questions per stage; stage numbers start at 1.
const QUESTIONS_PER_STAGE: usize = 5;

#[derive(Clone, Debug, Serialize)]
pub struct AnswerEvent {
    pub question_id: QuestionId,
    pub selected_option: String,
    pub is_correct: bool,
    pub elapsed_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Raw accumulated weight per dimension, indexed by `Dimension::index`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RawScores([f64; 5]);

impl RawScores {
    #[cfg(test)]
    pub fn new(values: [f64; 5]) -> Self {
        Self(values)
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        self.0[dimension.index()]
    }

    fn add(&mut self, dimension: Dimension, weight: f64) {
        self.0[dimension.index()] += weight;
    }
}

#[derive(Clone, Debug)]
pub struct ScoringLedger {
    current_question: usize,
    total_questions: usize,
    scores: RawScores,
    correct_count: usize,
    answers: Vec<AnswerEvent>,
}

impl ScoringLedger {
    pub fn new(total_questions: usize) -> Self {
        Self {
            current_question: 0,
            total_questions,
            scores: RawScores::default(),
            correct_count: 0,
            answers: Vec::with_capacity(total_questions),
        }
    }

    /// Record one answer against the bank entry `question_id`.
    ///
    /// Returns `false` and leaves the ledger untouched when the id is unknown.
    pub fn record_answer(
        &mut self,
        bank: &QuestionBank,
        question_id: QuestionId,
        selected_option: &str,
        elapsed_ms: u64,
    ) -> bool {
        let Some(question) = bank.get(question_id) else {
            warn!(target: "quiz", question_id, "Answer for unknown question ignored");
            return false;
        };

        let is_correct = question.is_correct(selected_option);
        self.answers.push(AnswerEvent {
            question_id,
            selected_option: selected_option.to_string(),
            is_correct,
            elapsed_ms,
            timestamp: Utc::now(),
        });

        if is_correct {
            self.correct_count += 1;
            self.scores.add(question.dimension, question.weight);
        }
        debug!(target: "quiz", question_id, is_correct, dimension = question.dimension.key(), "Answer recorded");
        true
    }

    pub fn advance(&mut self) {
        self.current_question += 1;
    }

    pub fn current_question(&self) -> usize {
        self.current_question
    }

    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn scores(&self) -> &RawScores {
        &self.scores
    }

    pub fn answers(&self) -> &[AnswerEvent] {
        &self.answers
    }

    pub fn is_complete(&self) -> bool {
        self.current_question >= self.total_questions
    }

    /// `round(correct / total * 100)`; undefined for an empty quiz.
    pub fn total_score_percent(&self) -> Option<u8> {
        if self.total_questions == 0 {
            return None;
        }
        let pct = (self.correct_count as f64 / self.total_questions as f64 * 100.0).round();
        Some(pct.clamp(0.0, 100.0) as u8)
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_questions == 0 {
            return 100.0;
        }
        (self.current_question as f64 / self.total_questions as f64 * 100.0).min(100.0)
    }

    pub fn current_stage(&self) -> usize {
        self.current_question / QUESTIONS_PER_STAGE + 1
    }

    pub fn stage_name(&self) -> &'static str {
        match self.current_stage() {
            1 => "友情回憶",
            _ => "測驗中",
        }
    }
}
