//! Beam search over transition sequences.

use super::action::Action;
use super::config::BeamConfig;
use super::context::ParserContextGenerator;
use super::state::{ParserState, by_score_desc};
use crate::classifier::Classifier;
use crate::error::{KotobaError, Result};
use crate::headrules::HeadRules;

/// Terminated derivations, best first, plus search statistics.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub derivations: Vec<ParserState>,
    pub iterations: usize,
    /// Largest live beam seen after pruning.
    pub peak_beam: usize,
}

/// Everything the search reads but never mutates.
#[derive(Clone, Copy)]
pub(crate) struct Search<'a, C: ?Sized> {
    pub model: &'a C,
    pub rules: &'a HeadRules,
    pub generator: &'a ParserContextGenerator,
    pub config: &'a BeamConfig,
}

impl<C: Classifier + ?Sized> Search<'_, C> {
    /// Run the search from `initial` and return up to `n` derivations.
    ///
    /// # Errors
    ///
    /// `KotobaError::IterationCapExceeded` when the search runs past the cap
    /// and `KotobaError::NoDerivation` when every branch dies out.
    pub(crate) fn run(&self, initial: ParserState, n: usize) -> Result<SearchOutcome> {
        let config = self.config;
        let cap = config.iteration_cap(initial.buffer_len());
        let tokens = initial.sentence_len();
        let keep = n.clamp(1, config.beam_size);

        let mut live = vec![initial];
        let mut finished: Vec<ParserState> = Vec::new();
        let mut iterations = 0;
        let mut peak_beam = live.len();

        while !live.is_empty() {
            if iterations == cap {
                tracing::warn!(tokens, cap, "transition search hit its iteration cap");
                return Err(KotobaError::IterationCapExceeded { iterations: cap });
            }
            iterations += 1;

            let mut next = Vec::with_capacity(live.len() * 4);
            for state in &live {
                for (action, prob) in self.candidates(state)? {
                    let child = state.apply(&action, prob, self.rules)?;
                    if child.is_terminal() {
                        finished.push(child);
                    } else {
                        next.push(child);
                    }
                }
            }

            next.sort_by(by_score_desc);
            next.truncate(config.beam_size);

            finished.sort_by(by_score_desc);
            finished.truncate(keep);
            if finished.len() == keep {
                // scores only decrease, so these can no longer place
                let bar = finished[keep - 1].score();
                next.retain(|state| state.score() > bar);
            }

            peak_beam = peak_beam.max(next.len());
            live = next;
        }

        if finished.is_empty() {
            return Err(KotobaError::NoDerivation { tokens });
        }
        tracing::debug!(
            tokens,
            iterations,
            derivations = finished.len(),
            best = finished[0].score(),
            "transition search finished"
        );
        Ok(SearchOutcome {
            derivations: finished,
            iterations,
            peak_beam,
        })
    }

    /// Admissible actions worth exploring from `state`, in outcome order.
    fn candidates(&self, state: &ParserState) -> Result<Vec<(Action, f64)>> {
        let features = self.generator.context(state, self.rules);
        let admissible: Vec<(Action, f64)> = self
            .model
            .distribution(&features)?
            .into_iter()
            .filter_map(|(outcome, prob)| {
                let action = Action::from_outcome(outcome)?;
                state
                    .is_admissible(&action, self.config)
                    .then_some((action, prob))
            })
            .collect();

        let best = admissible.iter().map(|(_, p)| *p).fold(0.0, f64::max);
        let floor = best * self.config.advance_ratio;
        Ok(admissible
            .into_iter()
            .filter(|(_, p)| *p > 0.0 && *p > self.config.min_probability && *p >= floor)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::headrules::Language;
    use crate::tree::ParseNode;

    /// Returns the same distribution whatever the context.
    struct Fixed {
        outcomes: Vec<String>,
        probs: Vec<f64>,
    }

    impl Classifier for Fixed {
        fn outcomes(&self) -> &[String] {
            &self.outcomes
        }

        fn predict(&self, _context: &[String]) -> Vec<f64> {
            self.probs.clone()
        }
    }

    fn fixed() -> Fixed {
        Fixed {
            outcomes: ["SHIFT", "BUILD-TOP", "COMPLETE"].map(String::from).to_vec(),
            probs: vec![0.5, 0.3, 0.2],
        }
    }

    fn run(config: &BeamConfig) -> Result<SearchOutcome> {
        let rules = HeadRules::builtin(Language::En).unwrap();
        let model = fixed();
        let generator = ParserContextGenerator::new();
        let search = Search {
            model: &model,
            rules: &rules,
            generator: &generator,
            config,
        };
        let initial = ParserState::new(vec![Arc::new(ParseNode::leaf("VBZ", "barks", 0))]);
        search.run(initial, 1)
    }

    #[test]
    fn single_word_derivation() {
        let outcome = run(&BeamConfig::default()).unwrap();
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.derivations.len(), 1);

        let best = &outcome.derivations[0];
        let expected = 0.5f64.ln() + 0.3f64.ln() + 0.2f64.ln();
        assert!((best.score() - expected).abs() < 1e-9);
        let parse = best.to_parse().unwrap();
        assert_eq!(parse.to_string(), "(TOP (VBZ barks))");
    }

    #[test]
    fn probability_floor_can_starve_the_beam() {
        let config = BeamConfig::default().with_min_probability(0.25);
        assert!(matches!(
            run(&config),
            Err(KotobaError::NoDerivation { tokens: 1 })
        ));
    }
}
