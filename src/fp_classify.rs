//! Outcome Classifier
//!
//! Buckets the final opinion of every normal peer: above `neutral_range`
//! follows anchor A, below `-neutral_range` follows anchor B, anything in the
//! closed band between is neutral.

use crate::fp_graph::WeightedMultigraph;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    #[error("neutral range {0} must be a non-negative number")]
    InvalidNeutralRange(f64),

    #[error("no normal peers to classify")]
    EmptyPopulation,
}

/// Follower counts of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl Outcome {
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Fraction following anchor A
    pub fn positive_fraction(&self) -> f64 {
        self.positive as f64 / self.total() as f64
    }

    /// Fraction following anchor B
    pub fn negative_fraction(&self) -> f64 {
        self.negative as f64 / self.total() as f64
    }

    pub fn neutral_fraction(&self) -> f64 {
        self.neutral as f64 / self.total() as f64
    }

    /// `(positive, negative, neutral)` fractions
    pub fn fractions(&self) -> (f64, f64, f64) {
        (
            self.positive_fraction(),
            self.negative_fraction(),
            self.neutral_fraction(),
        )
    }
}

/// Classify raw opinions
pub fn classify_opinions(opinions: &[f64], neutral_range: f64) -> Result<Outcome, ClassifyError> {
    if !(neutral_range >= 0.0) {
        return Err(ClassifyError::InvalidNeutralRange(neutral_range));
    }
    if opinions.is_empty() {
        return Err(ClassifyError::EmptyPopulation);
    }

    let mut outcome = Outcome::default();
    for &opinion in opinions {
        if opinion > neutral_range {
            outcome.positive += 1;
        } else if opinion < -neutral_range {
            outcome.negative += 1;
        } else {
            outcome.neutral += 1;
        }
    }
    Ok(outcome)
}

/// Classify the normal peers of `graph` by their current opinion
pub fn classify(graph: &WeightedMultigraph, neutral_range: f64) -> Result<Outcome, ClassifyError> {
    classify_opinions(&graph.opinions(), neutral_range)
}
