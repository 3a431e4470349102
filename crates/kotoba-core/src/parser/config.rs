use serde::{Deserialize, Serialize};

/// Beam search settings for the transition system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamConfig {
    /// Live states kept after each expansion.
    pub beam_size: usize,
    /// Actions below this fraction of the best admissible action's
    /// probability are not explored.
    pub advance_ratio: f64,
    /// Actions at or below this probability are never explored.
    pub min_probability: f64,
    /// Longest chain of single-child constituents the system may build.
    pub max_unary_chain: usize,
    /// Search iterations allowed per buffer item before giving up.
    pub max_iterations_per_item: usize,
    /// Beam width of the tagging and chunking passes.
    pub sequence_beam_size: usize,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            beam_size: 20,
            advance_ratio: 0.01,
            min_probability: 0.0,
            max_unary_chain: 3,
            max_iterations_per_item: 16,
            sequence_beam_size: 3,
        }
    }
}

impl BeamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_beam_size(mut self, beam_size: usize) -> Self {
        self.beam_size = beam_size.max(1);
        self
    }

    /// Set the advance ratio, clamped to `[0, 1]`.
    pub fn with_advance_ratio(mut self, ratio: f64) -> Self {
        self.advance_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_min_probability(mut self, probability: f64) -> Self {
        self.min_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Set the unary chain limit.
    ///
    /// Each buffer item may carry up to `length` unary constituents, each one
    /// a BUILD and a COMPLETE, so the per-item iteration budget is raised to
    /// at least `4 * (length + 1)`. Set the budget afterwards to override it.
    pub fn with_max_unary_chain(mut self, length: usize) -> Self {
        self.max_unary_chain = length;
        self.max_iterations_per_item = self.max_iterations_per_item.max(4 * (length + 1));
        self
    }

    pub fn with_max_iterations_per_item(mut self, iterations: usize) -> Self {
        self.max_iterations_per_item = iterations.max(1);
        self
    }

    pub fn with_sequence_beam_size(mut self, beam_size: usize) -> Self {
        self.sequence_beam_size = beam_size.max(1);
        self
    }

    /// Iteration cap for a buffer of `items` items.
    pub fn iteration_cap(&self, items: usize) -> usize {
        self.max_iterations_per_item * (items + 1)
    }
}
