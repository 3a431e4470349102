//! Averaged perceptron classifier.
//!
//! Weights are learned with the standard mistake-driven perceptron update and
//! averaged over every example seen. Scores are turned into a probability
//! distribution with a softmax, which is what the beam searches consume.

use std::collections::{BTreeSet, HashMap};

use kotoba_core::classifier::{Classifier, ClassifierTrainer, Event};
use kotoba_core::error::{KotobaError, Result};
use serde::{Deserialize, Serialize};

/// Perceptron training settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerceptronConfig {
    /// Passes over the training events.
    pub iterations: usize,
    /// Features seen fewer times than this are dropped.
    pub cutoff: usize,
    /// Seed for the per-iteration shuffle.
    pub seed: u64,
}

impl Default for PerceptronConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            cutoff: 1,
            seed: 42,
        }
    }
}

impl PerceptronConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    pub fn with_cutoff(mut self, cutoff: usize) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A trained perceptron: one weight row per feature, one column per outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptronModel {
    outcomes: Vec<String>,
    weights: HashMap<String, Vec<f64>>,
}

impl PerceptronModel {
    /// Number of features with weights.
    pub fn num_features(&self) -> usize {
        self.weights.len()
    }

    fn scores(&self, context: &[String]) -> Vec<f64> {
        let mut scores = vec![0.0; self.outcomes.len()];
        for row in context.iter().filter_map(|f| self.weights.get(f)) {
            for (score, weight) in scores.iter_mut().zip(row) {
                *score += weight;
            }
        }
        scores
    }
}

impl Classifier for PerceptronModel {
    fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    fn predict(&self, context: &[String]) -> Vec<f64> {
        softmax(&self.scores(context))
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / total).collect()
}

/// Trains [`PerceptronModel`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerceptronTrainer {
    config: PerceptronConfig,
}

impl PerceptronTrainer {
    pub fn new(config: PerceptronConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PerceptronConfig {
        &self.config
    }
}

/// Events with outcomes and features replaced by their indices.
struct Encoded<'a> {
    outcomes: Vec<String>,
    features: Vec<&'a str>,
    examples: Vec<(usize, Vec<usize>)>,
}

impl<'a> Encoded<'a> {
    fn new(events: &'a [Event], cutoff: usize) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for feature in events.iter().flat_map(|e| &e.context) {
            *counts.entry(feature.as_str()).or_default() += 1;
        }

        let mut features: Vec<&str> = counts
            .into_iter()
            .filter(|(_, count)| *count >= cutoff)
            .map(|(feature, _)| feature)
            .collect();
        features.sort_unstable();
        let feature_index: HashMap<&str, usize> =
            features.iter().enumerate().map(|(i, f)| (*f, i)).collect();

        let outcomes: Vec<String> = events
            .iter()
            .map(|e| e.outcome.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let outcome_index: HashMap<&str, usize> = outcomes
            .iter()
            .enumerate()
            .map(|(i, o)| (o.as_str(), i))
            .collect();

        let examples = events
            .iter()
            .map(|e| {
                let context = e
                    .context
                    .iter()
                    .filter_map(|f| feature_index.get(f.as_str()).copied())
                    .collect();
                (outcome_index[e.outcome.as_str()], context)
            })
            .collect();

        Self {
            outcomes,
            features,
            examples,
        }
    }
}

impl ClassifierTrainer for PerceptronTrainer {
    type Model = PerceptronModel;

    fn train(&self, events: &[Event]) -> Result<PerceptronModel> {
        if events.is_empty() {
            return Err(KotobaError::Classifier("no training events".to_string()));
        }

        let data = Encoded::new(events, self.config.cutoff);
        let n_outcomes = data.outcomes.len();
        let width = data.features.len() * n_outcomes;

        // Averaging keeps `weights - totals / step`, with `totals` weighting
        // each update by the step it happened at.
        let mut weights = vec![0.0f64; width];
        let mut totals = vec![0.0f64; width];
        let mut step = 1.0f64;

        let mut rng = oorandom::Rand64::new(u128::from(self.config.seed));
        let mut order: Vec<usize> = (0..data.examples.len()).collect();

        for iteration in 1..=self.config.iterations {
            shuffle(&mut order, &mut rng);

            let mut mistakes = 0usize;
            for &idx in &order {
                let (gold, context) = &data.examples[idx];
                let guess = argmax(&weights, context, n_outcomes);
                if guess != *gold {
                    mistakes += 1;
                    for &f in context {
                        let row = f * n_outcomes;
                        weights[row + gold] += 1.0;
                        totals[row + gold] += step;
                        weights[row + guess] -= 1.0;
                        totals[row + guess] -= step;
                    }
                }
                step += 1.0;
            }

            let accuracy = 1.0 - mistakes as f64 / data.examples.len() as f64;
            tracing::debug!(iteration, mistakes, accuracy, "perceptron iteration");
            if mistakes == 0 {
                break;
            }
        }

        let weights: HashMap<String, Vec<f64>> = data
            .features
            .iter()
            .enumerate()
            .filter_map(|(f, feature)| {
                let row = f * n_outcomes;
                let averaged: Vec<f64> = (row..row + n_outcomes)
                    .map(|i| weights[i] - totals[i] / step)
                    .collect();
                averaged
                    .iter()
                    .any(|w| *w != 0.0)
                    .then(|| ((*feature).to_string(), averaged))
            })
            .collect();

        tracing::info!(
            events = events.len(),
            outcomes = n_outcomes,
            features = weights.len(),
            "trained perceptron"
        );
        Ok(PerceptronModel {
            outcomes: data.outcomes,
            weights,
        })
    }
}

/// Highest-scoring outcome; ties go to the lowest index.
fn argmax(weights: &[f64], context: &[usize], n_outcomes: usize) -> usize {
    let mut scores = vec![0.0f64; n_outcomes];
    for &f in context {
        let row = &weights[f * n_outcomes..(f + 1) * n_outcomes];
        for (score, weight) in scores.iter_mut().zip(row) {
            *score += weight;
        }
    }
    let mut best = 0;
    for (i, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = i;
        }
    }
    best
}

/// Fisher-Yates shuffle driven by the trainer's seeded generator.
fn shuffle(order: &mut [usize], rng: &mut oorandom::Rand64) {
    for i in (1..order.len()).rev() {
        let j = rng.rand_range(0..(i as u64 + 1)) as usize;
        order.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(outcome: &str, features: &[&str]) -> Event {
        Event::new(outcome, features.iter().map(|f| f.to_string()).collect())
    }

    fn features(items: &[&str]) -> Vec<String> {
        items.iter().map(|f| f.to_string()).collect()
    }

    fn training_events() -> Vec<Event> {
        vec![
            event("DT", &["w=the", "suf=he"]),
            event("NN", &["w=dog", "suf=og"]),
            event("VBZ", &["w=barks", "suf=ks"]),
            event("DT", &["w=a", "suf=a"]),
            event("NN", &["w=cat", "suf=at"]),
            event("VBZ", &["w=runs", "suf=ns"]),
        ]
    }

    #[test]
    fn learns_separable_events() {
        let model = PerceptronTrainer::default().train(&training_events()).unwrap();
        assert_eq!(model.outcomes(), ["DT", "NN", "VBZ"]);

        for (words, expected) in [("w=dog", "NN"), ("w=runs", "VBZ"), ("suf=at", "NN")] {
            let dist = model.distribution(&features(&[words])).unwrap();
            let (best, _) = dist
                .iter()
                .copied()
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .unwrap();
            assert_eq!(best, expected);
        }

        // DT is the tie-break guess, so its events never cause an update
        let probs = model.predict(&features(&["w=the"]));
        assert!(probs[0] >= probs[1] && probs[0] >= probs[2]);
    }

    #[test]
    fn predictions_are_distributions() {
        let model = PerceptronTrainer::default().train(&training_events()).unwrap();
        for context in [features(&["w=dog"]), features(&["unseen"]), vec![]] {
            let probs = model.predict(&context);
            assert_eq!(probs.len(), 3);
            assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(probs.iter().all(|p| *p > 0.0));
        }
        let uniform = model.predict(&features(&["unseen"]));
        assert!(uniform.iter().all(|p| (*p - 1.0 / 3.0).abs() < 1e-9));
    }

    #[test]
    fn cutoff_drops_rare_features() {
        let trainer = PerceptronTrainer::new(PerceptronConfig::new().with_cutoff(2));
        let model = trainer.train(&training_events()).unwrap();
        assert_eq!(model.num_features(), 0);
    }

    #[test]
    fn training_is_deterministic_per_seed() {
        let config = PerceptronConfig::new().with_iterations(5).with_seed(7);
        let a = PerceptronTrainer::new(config).train(&training_events()).unwrap();
        let b = PerceptronTrainer::new(config).train(&training_events()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn no_events_is_an_error() {
        assert!(matches!(
            PerceptronTrainer::default().train(&[]),
            Err(KotobaError::Classifier(_))
        ));
    }

    #[test]
    fn model_round_trips_through_json() {
        let model = PerceptronTrainer::default().train(&training_events()).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let back: PerceptronModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
