//! Stratified question selection.
//!
//! Slots are split across question types by fixed ratios. Every type but the
//! last gets `floor(count * ratio)`; the last type absorbs the remainder so the
//! allocations always add up to `count`. Types that run short leave gaps that
//! are filled with random unpicked questions from the whole bank.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::bank::QuestionBank;
use crate::domain::{QuestionId, QuestionRecord, QuestionType};

const RATIO_SUM_TOLERANCE: f64 = 1e-6;

/// One row of the ratio table, as written in the TOML config.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TypeRatio {
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub ratio: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum RatioError {
    #[error("ratio table is empty")]
    Empty,
    #[error("ratio for {0:?} must be a finite non-negative number")]
    Invalid(QuestionType),
    #[error("question type {0:?} listed twice")]
    Duplicate(QuestionType),
    #[error("ratios sum to {0}, expected 1.0")]
    BadSum(f64),
}

/// Ordered ratio table. Order matters: the last entry takes the remainder.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeRatios(Vec<TypeRatio>);

impl TypeRatios {
    pub fn new(entries: Vec<TypeRatio>) -> Result<Self, RatioError> {
        if entries.is_empty() {
            return Err(RatioError::Empty);
        }
        let mut seen = HashSet::new();
        for e in &entries {
            if !e.ratio.is_finite() || e.ratio < 0.0 {
                return Err(RatioError::Invalid(e.kind));
            }
            if !seen.insert(e.kind) {
                return Err(RatioError::Duplicate(e.kind));
            }
        }
        let sum: f64 = entries.iter().map(|e| e.ratio).sum();
        if (sum - 1.0).abs() > RATIO_SUM_TOLERANCE {
            return Err(RatioError::BadSum(sum));
        }
        Ok(Self(entries))
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[TypeRatio] {
        &self.0
    }
}

impl Default for TypeRatios {
    fn default() -> Self {
        use QuestionType::*;
        Self(
            [
                (DetailObservation, 0.35),
                (ContextRecall, 0.30),
                (OpinionExpression, 0.15),
                (ActionMotivation, 0.10),
                (ActionIntention, 0.05),
                (PreferenceMemory, 0.05),
            ]
            .into_iter()
            .map(|(kind, ratio)| TypeRatio { kind, ratio })
            .collect(),
        )
    }
}

/// Slots per type for `count`, in table order.
pub fn allocate(count: usize, ratios: &TypeRatios) -> Vec<(QuestionType, usize)> {
    let last = ratios.0.len() - 1;
    let mut allocated = 0usize;
    ratios
        .0
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let slots = if i == last {
                count.saturating_sub(allocated)
            } else {
                let s = (count as f64 * r.ratio).floor() as usize;
                allocated += s;
                s
            };
            (r.kind, slots)
        })
        .collect()
}

/// Pick `count` questions from `bank`.
///
/// Output order is type blocks in table order followed by fill-ins. Asking for
/// the whole bank (or more) returns every question shuffled.
pub fn select<R: Rng>(
    bank: &QuestionBank,
    count: usize,
    ratios: &TypeRatios,
    rng: &mut R,
) -> Vec<QuestionRecord> {
    if count == 0 {
        return Vec::new();
    }
    if count >= bank.len() {
        let mut all = bank.questions().to_vec();
        all.shuffle(rng);
        return all;
    }

    let mut picked: Vec<&QuestionRecord> = Vec::with_capacity(count);
    for (kind, slots) in allocate(count, ratios) {
        let mut pool: Vec<&QuestionRecord> = bank.of_type(kind).collect();
        pool.shuffle(rng);
        pool.truncate(slots);
        picked.extend(pool);
    }

    if picked.len() < count {
        let chosen: HashSet<QuestionId> = picked.iter().map(|q| q.id).collect();
        let mut remaining: Vec<&QuestionRecord> = bank
            .questions()
            .iter()
            .filter(|q| !chosen.contains(&q.id))
            .collect();
        let shortfall = count - picked.len();
        while picked.len() < count && !remaining.is_empty() {
            let idx = rng.gen_range(0..remaining.len());
            picked.push(remaining.swap_remove(idx));
        }
        debug!(target: "quiz", count, shortfall, "Filled type shortfall from whole bank");
    }

    picked.truncate(count);
    picked.into_iter().cloned().collect()
}
