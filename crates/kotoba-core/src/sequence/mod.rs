//! # Sequence Labeling
//!
//! Beam search over per-token outcomes, used for POS tagging and chunking.
//! Each position is scored by a [`Classifier`] over the features of a
//! [`ContextGenerator`]; a codec, when present, restricts the search to
//! well-formed BIO/BILOU sequences.

mod beam;

use std::sync::Arc;

pub use beam::Sequence;

use crate::classifier::{Classifier, Event};
use crate::codec::SequenceCodec;
use crate::error::{KotobaError, Result};
use crate::features::{ContextGenerator, SentenceContext};
use crate::resources::DictionaryTagger;

pub const DEFAULT_SEQUENCE_BEAM: usize = 3;

/// Beam-search sequence labeler for one task.
#[derive(Debug, Clone)]
pub struct SequenceLabeler {
    generator: ContextGenerator,
    codec: Option<SequenceCodec>,
    dictionary: Option<Arc<DictionaryTagger>>,
    beam_size: usize,
}

impl SequenceLabeler {
    pub fn new(generator: ContextGenerator) -> Self {
        Self {
            generator,
            codec: None,
            dictionary: None,
            beam_size: DEFAULT_SEQUENCE_BEAM,
        }
    }

    /// Only explore sequences that are well formed under `codec`.
    pub fn with_codec(mut self, codec: SequenceCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Override the final outcome of listed words with their dictionary tag.
    pub fn with_dictionary(mut self, dictionary: Arc<DictionaryTagger>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn with_beam_size(mut self, beam_size: usize) -> Self {
        self.beam_size = beam_size.max(1);
        self
    }

    pub fn generator(&self) -> &ContextGenerator {
        &self.generator
    }

    /// The best sequence for the sentence.
    pub fn label<C: Classifier + ?Sized>(
        &self,
        model: &C,
        sentence: &SentenceContext<'_>,
    ) -> Result<Sequence> {
        let mut ranked = self.label_n(model, sentence, 1)?;
        ranked.pop().ok_or(KotobaError::InvalidTagSequence {
            position: sentence.len(),
            reason: "no well-formed sequence".to_string(),
        })
    }

    /// Up to `n` best sequences, best first.
    ///
    /// # Errors
    ///
    /// `KotobaError::EmptyInput` for an empty sentence and
    /// `KotobaError::InvalidTagSequence` if the codec rules out every
    /// candidate.
    pub fn label_n<C: Classifier + ?Sized>(
        &self,
        model: &C,
        sentence: &SentenceContext<'_>,
        n: usize,
    ) -> Result<Vec<Sequence>> {
        if sentence.is_empty() {
            return Err(KotobaError::EmptyInput);
        }

        let mut beam = vec![Sequence::empty(sentence.len())];
        for index in 0..sentence.len() {
            let last = index + 1 == sentence.len();
            let mut next = Vec::with_capacity(beam.len() * self.beam_size);
            for hyp in &beam {
                let features = self.generator.context(sentence, index, hyp.outcomes())?;
                let mut candidates = model.distribution(&features)?;
                candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

                let allowed = candidates
                    .into_iter()
                    .filter(|(outcome, prob)| {
                        *prob > 0.0
                            && self.allows(hyp.outcomes(), outcome)
                            && (!last || self.ends(outcome))
                    })
                    .take(self.beam_size);
                next.extend(allowed.map(|(outcome, prob)| hyp.extend(outcome, prob)));
            }

            if next.is_empty() {
                return Err(KotobaError::InvalidTagSequence {
                    position: index,
                    reason: "no admissible outcome".to_string(),
                });
            }
            beam::prune(&mut next, self.beam_size);
            beam = next;
        }

        if let Some(codec) = &self.codec {
            beam.retain(|seq| {
                seq.outcomes()
                    .last()
                    .is_none_or(|last| codec.is_valid_ending(last))
            });
        }
        if beam.is_empty() {
            return Err(KotobaError::InvalidTagSequence {
                position: sentence.len(),
                reason: "no sequence ends well formed".to_string(),
            });
        }

        beam.truncate(n);
        if let Some(dictionary) = &self.dictionary {
            for seq in &mut beam {
                for (word, outcome) in sentence.tokens.iter().zip(seq.outcomes_mut()) {
                    if let Some(tag) = dictionary.lookup(word) {
                        *outcome = tag.to_string();
                    }
                }
            }
        }
        tracing::trace!(tokens = sentence.len(), sequences = beam.len(), "labeled sentence");
        Ok(beam)
    }

    /// Training events for a gold outcome sequence, with the gold outcomes
    /// as the previous outcomes at each position.
    pub fn events<S: AsRef<str>>(
        &self,
        sentence: &SentenceContext<'_>,
        gold: &[S],
    ) -> Result<Vec<Event>> {
        if gold.len() != sentence.len() {
            return Err(KotobaError::InvalidTagSequence {
                position: gold.len().min(sentence.len()),
                reason: format!("{} outcomes for {} tokens", gold.len(), sentence.len()),
            });
        }
        gold.iter()
            .enumerate()
            .map(|(i, outcome)| {
                let context = self.generator.context(sentence, i, &gold[..i])?;
                Ok(Event::new(outcome.as_ref(), context))
            })
            .collect()
    }

    fn ends(&self, outcome: &str) -> bool {
        self.codec
            .as_ref()
            .is_none_or(|codec| codec.is_valid_ending(outcome))
    }

    fn allows(&self, previous: &[String], outcome: &str) -> bool {
        self.codec
            .as_ref()
            .is_none_or(|codec| codec.is_valid_outcome(previous, outcome))
    }
}
