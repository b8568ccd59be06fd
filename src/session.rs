//! One play-through: the selected questions, the ledger, and the rules for
//! driving them (answer the current question once, then advance).

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{info, instrument};

use crate::bank::QuestionBank;
use crate::classifier::{commentary, Classifier, Commentary, ResultCategory};
use crate::domain::{Conversation, QuestionId, QuestionRecord};
use crate::error::SessionError;
use crate::ledger::{AnswerEvent, ScoringLedger};
use crate::normalizer::{normalize, NormalizedScores};
use crate::sampler::{select, TypeRatios};

/// What the player sees right after answering.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerFeedback {
    pub question_id: QuestionId,
    pub correct: bool,
    pub correct_answer: String,
    pub explanation: String,
    pub conversation: Conversation,
    pub is_last: bool,
}

/// Final outcome handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct QuizResult {
    pub total_score: u8,
    pub correct_count: usize,
    pub total_questions: usize,
    pub scores: NormalizedScores,
    pub category: ResultCategory,
    pub commentary: Commentary,
    pub elapsed_ms: i64,
    /// Every answer in play order, with its timing.
    pub answers: Vec<AnswerEvent>,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    selection: Vec<QuestionRecord>,
    ledger: ScoringLedger,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl GameSession {
    #[instrument(level = "info", skip(bank, ratios, rng))]
    pub fn start<R: Rng>(bank: &QuestionBank, count: usize, ratios: &TypeRatios, rng: &mut R) -> Self {
        let selection = select(bank, count, ratios, rng);
        let ledger = ScoringLedger::new(selection.len());
        info!(target: "quiz", requested = count, selected = selection.len(), "Session started");
        let started_at = Utc::now();
        Self {
            finished_at: selection.is_empty().then_some(started_at),
            selection,
            ledger,
            started_at,
        }
    }

    #[cfg(test)]
    pub fn selection(&self) -> &[QuestionRecord] {
        &self.selection
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ledger(&self) -> &ScoringLedger {
        &self.ledger
    }

    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.selection.get(self.ledger.current_question())
    }

    pub fn is_finished(&self) -> bool {
        self.ledger.is_complete()
    }

    fn current_answered(&self) -> bool {
        self.ledger.answers().len() > self.ledger.current_question()
    }

    /// Answer the current question. Each question accepts exactly one answer.
    pub fn answer(
        &mut self,
        bank: &QuestionBank,
        question_id: QuestionId,
        option_id: &str,
        elapsed_ms: u64,
    ) -> Result<AnswerFeedback, SessionError> {
        let current = self.current_question().ok_or(SessionError::Finished)?;
        if current.id != question_id {
            return Err(SessionError::WrongQuestion {
                expected: current.id,
                got: question_id,
            });
        }
        if self.current_answered() {
            return Err(SessionError::AlreadyAnswered(question_id));
        }

        let feedback = AnswerFeedback {
            question_id,
            correct: current.is_correct(option_id),
            correct_answer: current.correct_answer.clone(),
            explanation: current.explanation.clone(),
            conversation: current.conversation.clone(),
            is_last: self.ledger.current_question() + 1 == self.ledger.total_questions(),
        };
        // Selection entries come from the bank, so the lookup always succeeds.
        self.ledger.record_answer(bank, question_id, option_id, elapsed_ms);
        Ok(feedback)
    }

    /// Move past an answered question. Returns the next one, or `None` once finished.
    pub fn advance(&mut self) -> Result<Option<&QuestionRecord>, SessionError> {
        let current = self.current_question().ok_or(SessionError::Finished)?;
        if !self.current_answered() {
            return Err(SessionError::NotAnswered(current.id));
        }
        self.ledger.advance();
        if self.ledger.is_complete() {
            self.finished_at = Some(Utc::now());
        }
        Ok(self.current_question())
    }

    pub fn result(&self, bank: &QuestionBank, classifier: &Classifier) -> Result<QuizResult, SessionError> {
        if !self.is_finished() {
            return Err(SessionError::NotFinished {
                answered: self.ledger.answers().len(),
                total: self.ledger.total_questions(),
            });
        }

        let scores = normalize(self.ledger.scores(), &bank.dimension_max_scores());
        let category = *classifier.classify(&scores);
        let finished_at = self.finished_at.unwrap_or_else(Utc::now);
        Ok(QuizResult {
            total_score: self.ledger.total_score_percent().unwrap_or(0),
            correct_count: self.ledger.correct_count(),
            total_questions: self.ledger.total_questions(),
            scores,
            category,
            commentary: commentary(&scores),
            elapsed_ms: (finished_at - self.started_at).num_milliseconds(),
            answers: self.ledger.answers().to_vec(),
        })
    }
}
