use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A labeled half-open interval `[start, end)` over token indices.
///
/// Spans order by `(start, end)` and then by label, which is the order the
/// codec decodes them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    start: usize,
    end: usize,
    label: String,
    /// Probability of the span, when produced by a scored decoder.
    pub prob: Option<f64>,
}

impl Span {
    /// Creates a span.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    #[must_use]
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        assert!(start <= end, "span start {start} is after end {end}");
        Self {
            start,
            end,
            label: label.into(),
            prob: None,
        }
    }

    /// Attaches a probability to the span.
    #[must_use]
    pub fn with_prob(mut self, prob: f64) -> Self {
        self.prob = Some(prob);
        self
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of tokens covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if the two spans share at least one token.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns `true` if `other` lies within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

// Probabilities are annotations; identity is position and label.
impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end && self.label == other.label
    }
}

impl Eq for Span {}

impl std::hash::Hash for Span {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.end.hash(state);
        self.label.hash(state);
    }
}

impl PartialOrd for Span {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Span {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then(self.end.cmp(&other.end))
            .then_with(|| self.label.cmp(&other.label))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}) {}", self.start, self.end, self.label)
    }
}
