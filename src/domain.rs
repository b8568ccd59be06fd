//! Domain models used by the quiz: dimensions, question types, and the question record itself.

use serde::{Deserialize, Serialize};

/// Personality-like axis a question scores into.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
  Observation,
  Empathy,
  Memory,
  Understanding,
  Care,
}

impl Dimension {
  /// Fixed display/iteration order.
  pub const ALL: [Dimension; 5] = [
    Dimension::Observation,
    Dimension::Empathy,
    Dimension::Memory,
    Dimension::Understanding,
    Dimension::Care,
  ];

  pub fn index(self) -> usize {
    match self {
      Dimension::Observation => 0,
      Dimension::Empathy => 1,
      Dimension::Memory => 2,
      Dimension::Understanding => 3,
      Dimension::Care => 4,
    }
  }

  pub fn key(self) -> &'static str {
    match self {
      Dimension::Observation => "observation",
      Dimension::Empathy => "empathy",
      Dimension::Memory => "memory",
      Dimension::Understanding => "understanding",
      Dimension::Care => "care",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Dimension::Observation => "觀察力",
      Dimension::Empathy => "同理心",
      Dimension::Memory => "記憶力",
      Dimension::Understanding => "默契度",
      Dimension::Care => "細心度",
    }
  }
}

/// Cognitive style of a question. Only drives stratified sampling.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
  DetailObservation,
  ContextRecall,
  OpinionExpression,
  ActionMotivation,
  ActionIntention,
  PreferenceMemory,
}

impl QuestionType {
  pub fn label(self) -> &'static str {
    match self {
      QuestionType::ContextRecall => "情境回憶",
      QuestionType::DetailObservation => "細節觀察",
      QuestionType::PreferenceMemory => "偏好記憶",
      QuestionType::OpinionExpression => "評價觀點",
      QuestionType::ActionMotivation => "行為動機",
      QuestionType::ActionIntention => "行為意圖",
    }
  }
}

/// One selectable answer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnswerOption {
  pub id: String,
  pub text: String,
}

/// One line of the replayed chat log.
/// Older bank files use `sender`/`text`, newer ones `user`/`content`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
  #[serde(alias = "user", default)]
  pub sender: String,
  #[serde(alias = "content", default)]
  pub text: String,
  #[serde(alias = "timestamp", default)]
  pub time: String,
}

/// Chat transcript shown after answering. Presentation only.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
  #[serde(default)] pub date: String,
  #[serde(default)] pub context: Vec<ChatMessage>,
  #[serde(default)] pub highlight_index: usize,
}

pub type QuestionId = u32;

/// Immutable question as stored in the bank file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
  pub id: QuestionId,
  #[serde(rename = "type")]
  pub kind: QuestionType,
  #[serde(default)] pub category: Option<String>,
  pub dimension: Dimension,
  pub weight: f64,
  pub question: String,
  pub options: Vec<AnswerOption>,
  pub correct_answer: String,
  #[serde(default)] pub explanation: String,
  #[serde(default)] pub conversation: Conversation,

  // Authoring metadata; carried through but unused by scoring.
  #[serde(default)] pub difficulty: Option<String>,
  #[serde(default)] pub period: Option<String>,
  #[serde(default)] pub tags: Vec<String>,
}

impl QuestionRecord {
  pub fn is_correct(&self, option_id: &str) -> bool {
    option_id == self.correct_answer
  }

  /// Display label for the type; the record's own category wins when set.
  pub fn category_label(&self) -> &str {
    self.category.as_deref().unwrap_or_else(|| self.kind.label())
  }
}
