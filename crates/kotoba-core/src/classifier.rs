//! # Classifier Seam
//!
//! The labelers and the transition system only need a probability
//! distribution over named outcomes for a list of feature strings. Training
//! and prediction live behind these traits.

use serde::{Deserialize, Serialize};

use crate::error::{KotobaError, Result};

/// One training example: the outcome chosen in a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub outcome: String,
    pub context: Vec<String>,
}

impl Event {
    pub fn new(outcome: impl Into<String>, context: Vec<String>) -> Self {
        Self {
            outcome: outcome.into(),
            context,
        }
    }
}

/// A trained model mapping features to a distribution over outcomes.
pub trait Classifier: Send + Sync {
    /// All outcomes the model can predict, in a fixed order.
    fn outcomes(&self) -> &[String];

    /// Probabilities aligned with [`Classifier::outcomes`], summing to 1.
    fn predict(&self, context: &[String]) -> Vec<f64>;

    /// Predicted outcomes paired with their probabilities.
    ///
    /// # Errors
    ///
    /// `KotobaError::Classifier` if the distribution does not line up with
    /// the outcome list.
    fn distribution(&self, context: &[String]) -> Result<Vec<(&str, f64)>> {
        let probs = self.predict(context);
        let outcomes = self.outcomes();
        if probs.len() != outcomes.len() {
            return Err(KotobaError::Classifier(format!(
                "{} probabilities for {} outcomes",
                probs.len(),
                outcomes.len()
            )));
        }
        Ok(outcomes.iter().map(String::as_str).zip(probs).collect())
    }
}

/// Builds a [`Classifier`] from training events.
pub trait ClassifierTrainer {
    type Model: Classifier;

    fn train(&self, events: &[Event]) -> Result<Self::Model>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! A memorizing classifier for exercising the search code.

    use std::collections::{BTreeSet, HashMap};

    use super::*;

    const KEY_SEPARATOR: &str = "\u{1}";

    /// Puts most of the mass on the outcome seen with an identical context
    /// during training, and spreads it uniformly for unseen contexts.
    #[derive(Debug, Serialize, Deserialize)]
    pub(crate) struct MemoryClassifier {
        outcomes: Vec<String>,
        seen: HashMap<String, usize>,
    }

    pub(crate) struct MemoryTrainer;

    impl ClassifierTrainer for MemoryTrainer {
        type Model = MemoryClassifier;

        fn train(&self, events: &[Event]) -> Result<MemoryClassifier> {
            let outcomes: Vec<String> = events
                .iter()
                .map(|e| e.outcome.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let seen = events
                .iter()
                .filter_map(|e| {
                    let idx = outcomes.iter().position(|o| *o == e.outcome)?;
                    Some((e.context.join(KEY_SEPARATOR), idx))
                })
                .collect();
            Ok(MemoryClassifier { outcomes, seen })
        }
    }

    impl Classifier for MemoryClassifier {
        fn outcomes(&self) -> &[String] {
            &self.outcomes
        }

        fn predict(&self, context: &[String]) -> Vec<f64> {
            let n = self.outcomes.len();
            match self.seen.get(&context.join(KEY_SEPARATOR)) {
                Some(&best) if n > 1 => {
                    let rest = 0.1 / (n - 1) as f64;
                    (0..n).map(|i| if i == best { 0.9 } else { rest }).collect()
                }
                _ => vec![1.0 / n as f64; n],
            }
        }
    }

    #[test]
    fn memorizes_contexts() {
        let events = vec![
            Event::new("A", vec!["x".into()]),
            Event::new("B", vec!["y".into()]),
            Event::new("C", vec!["z".into()]),
        ];
        let model = MemoryTrainer.train(&events).unwrap();
        let probs = model.predict(&["y".to_string()]);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(probs[1], 0.9);

        let dist = model.distribution(&["unseen".to_string()]).unwrap();
        assert_eq!(dist.len(), 3);
        assert!(dist.iter().all(|(_, p)| (*p - 1.0 / 3.0).abs() < 1e-9));
    }
}
