//! Raw dimension totals to 0-100 scores.
//!
//! Each dimension is measured against the best score the whole bank allows
//! for it (sum of weights of its questions), so a dimension with few questions
//! is not penalised against one with many.

use serde::Serialize;

use crate::domain::Dimension;
use crate::ledger::RawScores;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NormalizedScores {
    pub observation: u8,
    pub empathy: u8,
    pub memory: u8,
    pub understanding: u8,
    pub care: u8,
}

impl NormalizedScores {
    pub fn from_array(values: [u8; 5]) -> Self {
        let [observation, empathy, memory, understanding, care] = values.map(|v| v.min(100));
        Self {
            observation,
            empathy,
            memory,
            understanding,
            care,
        }
    }

    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Observation => self.observation,
            Dimension::Empathy => self.empathy,
            Dimension::Memory => self.memory,
            Dimension::Understanding => self.understanding,
            Dimension::Care => self.care,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, u8)> + '_ {
        Dimension::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    pub fn average(&self) -> f64 {
        self.iter().map(|(_, v)| f64::from(v)).sum::<f64>() / Dimension::ALL.len() as f64
    }
}

/// `round(raw / max * 100)` per dimension, clamped to `[0, 100]`.
/// A dimension with no reachable points scores 0.
pub fn normalize(raw: &RawScores, dimension_max: &[f64; 5]) -> NormalizedScores {
    let mut out = [0u8; 5];
    for d in Dimension::ALL {
        out[d.index()] = scale(raw.get(d), dimension_max[d.index()]);
    }
    NormalizedScores::from_array(out)
}

fn scale(raw: f64, max: f64) -> u8 {
    if !(max > 0.0) || !raw.is_finite() {
        return 0;
    }
    (raw / max * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_marks_normalize_to_hundred() {
        let raw = RawScores::new([0.0, 0.0, 100.0, 0.0, 0.0]);
        let max = [50.0, 50.0, 100.0, 50.0, 50.0];
        let n = normalize(&raw, &max);
        assert_eq!(n.memory, 100);
        assert_eq!(n.observation, 0);
    }

    #[test]
    fn zero_max_and_zero_raw_are_safe() {
        let n = normalize(&RawScores::default(), &[0.0; 5]);
        assert_eq!(n, NormalizedScores::from_array([0; 5]));

        let n = normalize(&RawScores::new([3.0; 5]), &[0.0; 5]);
        assert_eq!(n, NormalizedScores::from_array([0; 5]));
    }

    #[test]
    fn output_is_clamped_and_rounded() {
        let raw = RawScores::new([12.0, 2.5, 1.0, 7.0, -1.0]);
        let max = [10.0, 4.0, 3.0, 7.0, 5.0];
        let n = normalize(&raw, &max);
        assert_eq!(n.observation, 100);
        assert_eq!(n.empathy, 63);
        assert_eq!(n.memory, 33);
        assert_eq!(n.understanding, 100);
        assert_eq!(n.care, 0);
    }

    #[test]
    fn every_value_stays_in_range() {
        let maxes = [0.0, 0.5, 1.0, 3.7, 120.0];
        for raw in [0.0, 0.2, 1.0, 5.5, 200.0] {
            for max in maxes {
                let n = normalize(&RawScores::new([raw; 5]), &[max; 5]);
                assert!(n.iter().all(|(_, v)| v <= 100));
            }
        }
    }

    #[test]
    fn average_of_five() {
        let n = NormalizedScores::from_array([50, 60, 70, 80, 90]);
        assert_eq!(n.average(), 70.0);
    }
}
