//! Question bank: loaded once at startup, validated, then read-only.
//!
//! The bank file is JSON, either a bare array of questions or an object
//! wrapping the array under `questions`. Anything missing, malformed or
//! empty is an error; the server must not start without a usable bank.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::{Dimension, QuestionId, QuestionRecord, QuestionType};
use crate::error::BankError;

#[derive(Deserialize)]
#[serde(untagged)]
enum BankDocument {
    List(Vec<QuestionRecord>),
    Wrapped { questions: Vec<QuestionRecord> },
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<QuestionRecord>,
    by_id: HashMap<QuestionId, usize>,
    dimension_max: [f64; 5],
}

/// Counts used for the startup log and the `/bank` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BankInventory {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_dimension: BTreeMap<String, usize>,
}

impl QuestionBank {
    /// Read and validate the bank file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BankError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let bank = Self::from_json_str(&raw)?;
        info!(target: "quiz", path = %path.display(), questions = bank.len(), "Loaded question bank");
        Ok(bank)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, BankError> {
        let questions = match serde_json::from_str::<BankDocument>(raw)? {
            BankDocument::List(qs) => qs,
            BankDocument::Wrapped { questions } => questions,
        };
        Self::from_questions(questions)
    }

    pub fn from_questions(questions: Vec<QuestionRecord>) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }

        let mut by_id = HashMap::with_capacity(questions.len());
        let mut dimension_max = [0.0; 5];
        for (idx, q) in questions.iter().enumerate() {
            validate_record(q)?;
            if by_id.insert(q.id, idx).is_some() {
                return Err(BankError::DuplicateId(q.id));
            }
            dimension_max[q.dimension.index()] += q.weight;
        }

        Ok(Self {
            questions,
            by_id,
            dimension_max,
        })
    }

    pub fn get(&self, id: QuestionId) -> Option<&QuestionRecord> {
        self.by_id.get(&id).map(|&idx| &self.questions[idx])
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn of_type(&self, kind: QuestionType) -> impl Iterator<Item = &QuestionRecord> {
        self.questions.iter().filter(move |q| q.kind == kind)
    }

    /// Sum of weights of every question tagged with `dimension`:
    /// the best raw score a player could reach there.
    pub fn dimension_max(&self, dimension: Dimension) -> f64 {
        self.dimension_max[dimension.index()]
    }

    pub fn dimension_max_scores(&self) -> [f64; 5] {
        self.dimension_max
    }

    pub fn inventory(&self) -> BankInventory {
        let mut by_type = BTreeMap::new();
        let mut by_dimension = BTreeMap::new();
        for q in &self.questions {
            *by_type.entry(q.kind.label().to_string()).or_insert(0) += 1;
            *by_dimension.entry(q.dimension.key().to_string()).or_insert(0) += 1;
        }
        BankInventory {
            total: self.questions.len(),
            by_type,
            by_dimension,
        }
    }
}

fn validate_record(q: &QuestionRecord) -> Result<(), BankError> {
    if !(q.weight.is_finite() && q.weight > 0.0) {
        return Err(BankError::InvalidWeight {
            id: q.id,
            weight: q.weight,
        });
    }

    let matches = q
        .options
        .iter()
        .filter(|o| o.id == q.correct_answer)
        .count();
    if matches != 1 {
        return Err(BankError::CorrectAnswer {
            id: q.id,
            correct: q.correct_answer.clone(),
            matches,
        });
    }
    Ok(())
}

/// Builders shared by the unit tests of every module.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::{AnswerOption, Conversation};

    pub fn question(id: QuestionId, kind: QuestionType, dimension: Dimension, weight: f64) -> QuestionRecord {
        QuestionRecord {
            id,
            kind,
            category: None,
            dimension,
            weight,
            question: format!("question {id}"),
            options: ["a", "b", "c", "d"]
                .iter()
                .map(|o| AnswerOption {
                    id: o.to_string(),
                    text: format!("option {o}"),
                })
                .collect(),
            correct_answer: "a".into(),
            explanation: format!("explanation {id}"),
            conversation: Conversation::default(),
            difficulty: None,
            period: None,
            tags: Vec::new(),
        }
    }

    /// Bank from `(type, count)` pairs; ids are assigned sequentially from 1.
    pub fn bank_with(layout: &[(QuestionType, usize)]) -> QuestionBank {
        let mut questions = Vec::new();
        let mut next_id = 1;
        for &(kind, count) in layout {
            for _ in 0..count {
                questions.push(question(next_id, kind, Dimension::Memory, 1.0));
                next_id += 1;
            }
        }
        QuestionBank::from_questions(questions).unwrap()
    }

    /// 20 questions spread over every type.
    pub fn twenty_question_bank() -> QuestionBank {
        bank_with(&[
            (QuestionType::DetailObservation, 6),
            (QuestionType::ContextRecall, 5),
            (QuestionType::OpinionExpression, 3),
            (QuestionType::ActionMotivation, 2),
            (QuestionType::ActionIntention, 2),
            (QuestionType::PreferenceMemory, 2),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    const SAMPLE: &str = r#"{
      "id": 7,
      "type": "context-recall",
      "category": "情境回憶",
      "dimension": "memory",
      "conversation": {
        "date": "2019/09/28",
        "context": [
          {"user": "李宜潔", "content": "我手機的對話紀錄全部掰掰了", "time": "18:27"},
          {"sender": "量角器📐", "text": "蛤", "time": "18:28"}
        ],
        "highlightIndex": 0
      },
      "question": "宜潔的手機發生了什麼事？",
      "options": [
        {"id": "a", "text": "對話紀錄不見了", "isCorrect": true},
        {"id": "b", "text": "螢幕破了", "isCorrect": false}
      ],
      "correctAnswer": "a",
      "explanation": "對話紀錄全部掰掰了",
      "weight": 1.2,
      "difficulty": "中等",
      "period": "2019",
      "tags": ["phone"]
    }"#;

    #[test]
    fn loads_bare_list() {
        let bank = QuestionBank::from_json_str(&format!("[{SAMPLE}]")).unwrap();
        assert_eq!(bank.len(), 1);
        let q = bank.get(7).expect("question 7 present");
        assert_eq!(q.kind, QuestionType::ContextRecall);
        assert_eq!(q.conversation.context.len(), 2);
        assert_eq!(q.conversation.context[0].sender, "李宜潔");
        assert_eq!(q.conversation.context[1].text, "蛤");
    }

    #[test]
    fn loads_wrapped_object() {
        let bank = QuestionBank::from_json_str(&format!(r#"{{"questions": [{SAMPLE}]}}"#)).unwrap();
        assert_eq!(bank.len(), 1);
        assert!((bank.dimension_max(Dimension::Memory) - 1.2).abs() < 1e-9);
        assert_eq!(bank.dimension_max(Dimension::Care), 0.0);
    }

    #[test]
    fn rejects_empty_bank() {
        assert!(matches!(QuestionBank::from_json_str("[]"), Err(BankError::Empty)));
        assert!(matches!(
            QuestionBank::from_json_str(r#"{"questions": []}"#),
            Err(BankError::Empty)
        ));
    }

    #[test]
    fn rejects_malformed_document() {
        assert!(matches!(
            QuestionBank::from_json_str("{not json"),
            Err(BankError::Malformed(_))
        ));
        assert!(matches!(
            QuestionBank::from_json_str(r#"{"items": []}"#),
            Err(BankError::Malformed(_))
        ));
    }

    #[test]
    fn loads_sample_bank_from_disk() {
        let bank = QuestionBank::load(concat!(env!("CARGO_MANIFEST_DIR"), "/data/questions.sample.json")).unwrap();
        assert_eq!(bank.len(), 6);
        assert!((bank.dimension_max(Dimension::Understanding) - 2.7).abs() < 1e-9);
        assert_eq!(bank.get(6).map(|q| q.category_label()), Some("偏好記憶"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = QuestionBank::load("./definitely/not/here.json").unwrap_err();
        assert!(matches!(err, BankError::Io { .. }));
    }

    #[test]
    fn rejects_invalid_records() {
        let mut q = question(1, QuestionType::ContextRecall, Dimension::Memory, 0.0);
        assert!(matches!(
            QuestionBank::from_questions(vec![q.clone()]),
            Err(BankError::InvalidWeight { id: 1, .. })
        ));

        q.weight = 1.0;
        q.correct_answer = "z".into();
        assert!(matches!(
            QuestionBank::from_questions(vec![q]),
            Err(BankError::CorrectAnswer { id: 1, matches: 0, .. })
        ));

        let a = question(3, QuestionType::ContextRecall, Dimension::Memory, 1.0);
        let b = question(3, QuestionType::DetailObservation, Dimension::Care, 1.0);
        assert!(matches!(
            QuestionBank::from_questions(vec![a, b]),
            Err(BankError::DuplicateId(3))
        ));
    }

    #[test]
    fn dimension_max_sums_weights() {
        let bank = QuestionBank::from_questions(vec![
            question(1, QuestionType::ContextRecall, Dimension::Memory, 1.0),
            question(2, QuestionType::ContextRecall, Dimension::Memory, 1.5),
            question(3, QuestionType::DetailObservation, Dimension::Observation, 1.2),
        ])
        .unwrap();
        assert!((bank.dimension_max(Dimension::Memory) - 2.5).abs() < 1e-9);
        assert!((bank.dimension_max(Dimension::Observation) - 1.2).abs() < 1e-9);
        assert_eq!(bank.dimension_max(Dimension::Empathy), 0.0);
    }

    #[test]
    fn inventory_counts_types() {
        let bank = twenty_question_bank();
        let inv = bank.inventory();
        assert_eq!(inv.total, 20);
        assert_eq!(inv.by_type.get("細節觀察"), Some(&6));
        assert_eq!(inv.by_dimension.get("memory"), Some(&20));
        assert_eq!(bank.of_type(QuestionType::ActionIntention).count(), 2);
    }
}
