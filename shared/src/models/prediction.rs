//! Ranked classifier output

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

/// A crop label with the probability the classifier assigned to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropProbability {
    pub crop: String,
    pub probability: f64,
}

#[derive(Error, Debug, PartialEq)]
pub enum PredictionError {
    #[error("classifier returned {got} probabilities for {expected} labels")]
    LengthMismatch { expected: usize, got: usize },

    #[error("classifier label {0} appears more than once")]
    DuplicateLabel(String),

    #[error("classifier has no labels")]
    Empty,
}

/// Full probability distribution over every classifier label, most likely first.
///
/// Equal probabilities are ordered by label, ascending, so the ranking never
/// depends on the classifier's internal label order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPrediction {
    entries: Vec<CropProbability>,
}

impl RankedPrediction {
    /// Pair each label with its probability and rank the result
    pub fn from_distribution(labels: &[String], probabilities: &[f64]) -> Result<Self, PredictionError> {
        if labels.is_empty() {
            return Err(PredictionError::Empty);
        }
        if labels.len() != probabilities.len() {
            return Err(PredictionError::LengthMismatch {
                expected: labels.len(),
                got: probabilities.len(),
            });
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for label in labels {
            if !seen.insert(label.as_str()) {
                return Err(PredictionError::DuplicateLabel(label.clone()));
            }
        }

        let mut entries: Vec<CropProbability> = labels
            .iter()
            .zip(probabilities)
            .map(|(crop, &probability)| CropProbability {
                crop: crop.clone(),
                probability,
            })
            .collect();
        entries.sort_by(rank_order);

        Ok(Self { entries })
    }

    /// The most likely label
    pub fn top(&self) -> &CropProbability {
        // Construction guarantees at least one entry
        &self.entries[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CropProbability> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of a label in the ranking
    pub fn rank_of(&self, crop: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.crop == crop)
    }

    pub fn as_slice(&self) -> &[CropProbability] {
        &self.entries
    }
}

fn rank_order(a: &CropProbability, b: &CropProbability) -> Ordering {
    b.probability
        .total_cmp(&a.probability)
        .then_with(|| a.crop.cmp(&b.crop))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sorted_descending() {
        let ranked =
            RankedPrediction::from_distribution(&labels(&["maize", "rice", "wheat"]), &[0.2, 0.3, 0.5])
                .unwrap();
        let order: Vec<_> = ranked.iter().map(|e| e.crop.as_str()).collect();
        assert_eq!(order, vec!["wheat", "rice", "maize"]);
        assert_eq!(ranked.top().crop, "wheat");
        assert_eq!(ranked.rank_of("maize"), Some(2));
    }

    #[test]
    fn test_ties_broken_by_label() {
        let ranked = RankedPrediction::from_distribution(
            &labels(&["papaya", "banana", "coconut", "apple"]),
            &[0.3, 0.3, 0.1, 0.3],
        )
        .unwrap();
        let order: Vec<_> = ranked.iter().map(|e| e.crop.as_str()).collect();
        assert_eq!(order, vec!["apple", "banana", "papaya", "coconut"]);
    }

    #[test]
    fn test_length_mismatch() {
        let err = RankedPrediction::from_distribution(&labels(&["rice", "maize"]), &[1.0]).unwrap_err();
        assert_eq!(err, PredictionError::LengthMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let err =
            RankedPrediction::from_distribution(&labels(&["rice", "rice"]), &[0.5, 0.5]).unwrap_err();
        assert_eq!(err, PredictionError::DuplicateLabel("rice".to_string()));
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            RankedPrediction::from_distribution(&[], &[]).unwrap_err(),
            PredictionError::Empty
        );
    }
}
