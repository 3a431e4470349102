//! Bracket F-measure evaluation.
//!
//! Labeled spans of every constituent except words and the root are compared
//! as multisets between the gold and predicted trees.

use std::collections::HashMap;
use std::fmt;

use kotoba_core::classifier::Classifier;
use kotoba_core::parser::ShiftReduceParser;
use kotoba_core::tree::Parse;
use kotoba_core::types::Span;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Matched, predicted and gold bracket counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FMeasure {
    pub matched: usize,
    pub predicted: usize,
    pub gold: usize,
}

impl FMeasure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sentence's brackets.
    pub fn update(&mut self, gold: &[Span], predicted: &[Span]) {
        let mut remaining: HashMap<&Span, usize> = HashMap::new();
        for span in gold {
            *remaining.entry(span).or_default() += 1;
        }
        for span in predicted {
            if let Some(count) = remaining.get_mut(span).filter(|c| **c > 0) {
                *count -= 1;
                self.matched += 1;
            }
        }
        self.predicted += predicted.len();
        self.gold += gold.len();
    }

    /// Combine counts from separately scored sentences.
    pub fn merge(self, other: Self) -> Self {
        Self {
            matched: self.matched + other.matched,
            predicted: self.predicted + other.predicted,
            gold: self.gold + other.gold,
        }
    }

    pub fn precision(&self) -> f64 {
        ratio(self.matched, self.predicted)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.matched, self.gold)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl fmt::Display for FMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P={:.4} R={:.4} F1={:.4}",
            self.precision(),
            self.recall(),
            self.f1()
        )
    }
}

/// Result of decoding a held-out set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub fmeasure: FMeasure,
    /// Sentences attempted.
    pub sentences: usize,
    /// Sentences the parser failed on; they are not scored.
    pub failures: usize,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} over {} sentences ({} failed)",
            self.fmeasure, self.sentences, self.failures
        )
    }
}

/// Decode every gold sentence and score the result.
pub fn evaluate<C: Classifier>(parser: &ShiftReduceParser<C>, gold: &[Parse]) -> Evaluation {
    let scored: Vec<Option<FMeasure>> = gold
        .par_iter()
        .enumerate()
        .map(|(idx, expected)| {
            let tokens: Vec<String> = expected.words().into_iter().map(String::from).collect();
            match parser.parse(&tokens) {
                Ok(predicted) => {
                    let mut score = FMeasure::new();
                    score.update(&expected.constituents(), &predicted.constituents());
                    Some(score)
                }
                Err(e) => {
                    tracing::warn!(sentence = idx, error = %e, "failed to parse sentence");
                    None
                }
            }
        })
        .collect();

    let failures = scored.iter().filter(|s| s.is_none()).count();
    let fmeasure = scored
        .into_iter()
        .flatten()
        .fold(FMeasure::new(), FMeasure::merge);

    let evaluation = Evaluation {
        fmeasure,
        sentences: gold.len(),
        failures,
    };
    tracing::info!(%evaluation, "evaluation finished");
    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_right_brackets() {
        let gold = [Span::new(0, 2, "NP"), Span::new(2, 4, "VP")];
        let predicted = [Span::new(0, 2, "NP"), Span::new(2, 3, "VB")];

        let mut score = FMeasure::new();
        score.update(&gold, &predicted);
        assert_eq!(score.precision(), 0.5);
        assert_eq!(score.recall(), 0.5);
        assert_eq!(score.f1(), 0.5);
    }

    #[test]
    fn nothing_predicted_scores_zero() {
        let mut score = FMeasure::new();
        score.update(&[Span::new(0, 1, "NP")], &[]);
        assert_eq!(score.precision(), 0.0);
        assert_eq!(score.recall(), 0.0);
        assert_eq!(score.f1(), 0.0);
        assert_eq!(FMeasure::new().f1(), 0.0);
    }

    #[test]
    fn duplicate_brackets_match_once_each() {
        // a unary NP over NP yields the same span twice
        let gold = [Span::new(0, 2, "NP"), Span::new(0, 2, "NP")];
        let predicted = [Span::new(0, 2, "NP"), Span::new(0, 2, "NP"), Span::new(0, 2, "NP")];

        let mut score = FMeasure::new();
        score.update(&gold, &predicted);
        assert_eq!(score.matched, 2);
        assert_eq!(score.recall(), 1.0);
        assert!((score.precision() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn merge_adds_counts() {
        let mut a = FMeasure::new();
        a.update(&[Span::new(0, 2, "NP")], &[Span::new(0, 2, "NP")]);
        let mut b = FMeasure::new();
        b.update(&[Span::new(0, 1, "NP")], &[Span::new(0, 1, "VP")]);

        let total = a.merge(b);
        assert_eq!((total.matched, total.predicted, total.gold), (1, 2, 2));
        assert_eq!(total.to_string(), "P=0.5000 R=0.5000 F1=0.5000");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn spans() -> impl Strategy<Value = Vec<Span>> {
            let label = prop::sample::select(vec!["NP", "VP", "PP"]);
            prop::collection::vec((0usize..8, 1usize..4, label), 0..10).prop_map(|raw| {
                raw.into_iter()
                    .map(|(start, len, label)| Span::new(start, start + len, label))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn scores_stay_in_unit_interval(gold in spans(), predicted in spans()) {
                let mut score = FMeasure::new();
                score.update(&gold, &predicted);
                prop_assert!(score.matched <= gold.len().min(predicted.len()));
                for value in [score.precision(), score.recall(), score.f1()] {
                    prop_assert!((0.0..=1.0).contains(&value));
                }
            }

            #[test]
            fn identical_brackets_score_one(gold in spans()) {
                prop_assume!(!gold.is_empty());
                let mut score = FMeasure::new();
                score.update(&gold, &gold);
                prop_assert_eq!(score.f1(), 1.0);
            }
        }
    }
}
