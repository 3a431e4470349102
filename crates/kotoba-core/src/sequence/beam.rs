//! Hypotheses of the per-token beam search.

use std::cmp::Ordering;

use serde::Serialize;

/// A labeled sequence and its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sequence {
    outcomes: Vec<String>,
    probs: Vec<f64>,
    score: f64,
}

impl Sequence {
    pub(crate) fn empty(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
            probs: Vec::with_capacity(capacity),
            score: 0.0,
        }
    }

    pub(crate) fn extend(&self, outcome: &str, prob: f64) -> Self {
        let mut next = self.clone();
        next.outcomes.push(outcome.to_string());
        next.probs.push(prob);
        next.score += prob.ln();
        next
    }

    pub fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<String> {
        self.outcomes
    }

    /// Per-position probabilities of the chosen outcomes.
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Sum of the log-probabilities.
    pub fn score(&self) -> f64 {
        self.score
    }

    pub(crate) fn outcomes_mut(&mut self) -> &mut [String] {
        &mut self.outcomes
    }
}

/// Descending by score. `sort_by` is stable, so equal scores keep insertion order.
pub(crate) fn by_score_desc(a: &Sequence, b: &Sequence) -> Ordering {
    b.score.total_cmp(&a.score)
}

/// Keep the `size` best hypotheses.
pub(crate) fn prune(beam: &mut Vec<Sequence>, size: usize) {
    beam.sort_by(by_score_desc);
    beam.truncate(size);
}
