//! Staged parser training.
//!
//! Every gold tree yields three event streams: POS tag events, chunk tag
//! events and the build/complete events of its oracle trace. Streams are
//! generated in parallel across sentences, then each trains one classifier.

use std::sync::Arc;

use kotoba_core::classifier::{ClassifierTrainer, Event};
use kotoba_core::codec::SequenceCodec;
use kotoba_core::features::{ContextGenerator, FeatureConfig, SentenceContext};
use kotoba_core::headrules::{HeadRules, Language};
use kotoba_core::parser::{BeamConfig, ParserContextGenerator, ParserModel, oracle_events};
use kotoba_core::resources::DictionaryTagger;
use kotoba_core::sequence::SequenceLabeler;
use kotoba_core::tree::Parse;
use kotoba_core::TagScheme;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainError};
use crate::model::PerceptronConfig;

/// Everything a parser model is trained under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub language: Language,
    pub codec: SequenceCodec,
    pub beam: BeamConfig,
    pub tagger_features: FeatureConfig,
    pub chunker_features: FeatureConfig,
    pub dictionary: Option<Arc<DictionaryTagger>>,
    pub perceptron: PerceptronConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            language: Language::En,
            codec: SequenceCodec::new(TagScheme::Bio),
            beam: BeamConfig::default(),
            tagger_features: FeatureConfig::pos_tagger(),
            chunker_features: FeatureConfig::chunker(),
            dictionary: None,
            perceptron: PerceptronConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_codec(mut self, codec: SequenceCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_beam(mut self, beam: BeamConfig) -> Self {
        self.beam = beam;
        self
    }

    pub fn with_features(mut self, tagger: FeatureConfig, chunker: FeatureConfig) -> Self {
        self.tagger_features = tagger;
        self.chunker_features = chunker;
        self
    }

    pub fn with_dictionary(mut self, dictionary: Arc<DictionaryTagger>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn with_perceptron(mut self, perceptron: PerceptronConfig) -> Self {
        self.perceptron = perceptron;
        self
    }
}

/// The three training streams drawn from a treebank.
#[derive(Debug, Clone, Default)]
pub struct EventStreams {
    pub tag: Vec<Event>,
    pub chunk: Vec<Event>,
    pub build: Vec<Event>,
    /// Sentences that produced no events.
    pub skipped: usize,
}

/// Per-sentence event generation. Shared read-only across worker threads.
struct EventSource<'a> {
    tagger: SequenceLabeler,
    chunker: SequenceLabeler,
    generator: ParserContextGenerator,
    rules: &'a HeadRules,
    codec: SequenceCodec,
    beam: &'a BeamConfig,
    with_tags: bool,
}

impl EventSource<'_> {
    fn sentence(
        &self,
        parse: &Parse,
    ) -> kotoba_core::Result<(Vec<Event>, Vec<Event>, Vec<Event>)> {
        let tokens: Vec<String> = parse.words().into_iter().map(String::from).collect();
        let tags: Vec<String> = parse.tags().into_iter().map(String::from).collect();
        let chunk_tags = self.codec.encode(&parse.chunk_spans(), tokens.len())?;

        let sentence = SentenceContext::new(&tokens);
        let tag = if self.with_tags {
            self.tagger.events(&sentence, &tags)?
        } else {
            Vec::new()
        };
        let chunk = self.chunker.events(&sentence.with_pos_tags(&tags), &chunk_tags)?;
        let build = oracle_events(parse, self.rules, &self.generator, self.beam)?;
        Ok((tag, chunk, build))
    }
}

/// Trains a [`ParserModel`] with classifiers from `T`.
pub struct ParserTrainer<T> {
    config: TrainingConfig,
    head_rules: HeadRules,
    trainer: T,
}

impl<T> ParserTrainer<T>
where
    T: ClassifierTrainer + Sync,
{
    /// Create a trainer using the built-in head rules of the configured language.
    pub fn new(config: TrainingConfig, trainer: T) -> Result<Self> {
        let head_rules = HeadRules::builtin(config.language)?;
        Ok(Self {
            config,
            head_rules,
            trainer,
        })
    }

    /// Replace the head rule table.
    pub fn with_head_rules(mut self, rules: HeadRules) -> Self {
        self.head_rules = rules;
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn head_rules(&self) -> &HeadRules {
        &self.head_rules
    }

    /// Generate the training events of every tree.
    ///
    /// Sentences failing with a per-sentence error are logged and left out.
    ///
    /// # Errors
    ///
    /// Configuration errors, such as a chunker feature set needing
    /// annotations that are never supplied, abort generation.
    pub fn events(&self, parses: &[Parse]) -> Result<EventStreams> {
        self.generate(parses, true)
    }

    fn generate(&self, parses: &[Parse], with_tags: bool) -> Result<EventStreams> {
        let source = EventSource {
            tagger: SequenceLabeler::new(ContextGenerator::new(
                self.config.tagger_features.clone(),
            )?),
            chunker: SequenceLabeler::new(ContextGenerator::new(
                self.config.chunker_features.clone(),
            )?),
            generator: ParserContextGenerator::new(),
            rules: &self.head_rules,
            codec: self.config.codec,
            beam: &self.config.beam,
            with_tags,
        };

        let results: Vec<kotoba_core::Result<_>> =
            parses.par_iter().map(|parse| source.sentence(parse)).collect();

        let mut streams = EventStreams::default();
        for (idx, result) in results.into_iter().enumerate() {
            match result {
                Ok((tag, chunk, build)) => {
                    streams.tag.extend(tag);
                    streams.chunk.extend(chunk);
                    streams.build.extend(build);
                }
                Err(e) if e.is_per_sentence() => {
                    tracing::warn!(sentence = idx, error = %e, "skipping training sentence");
                    streams.skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(
            tag = streams.tag.len(),
            chunk = streams.chunk.len(),
            build = streams.build.len(),
            skipped = streams.skipped,
            "generated training events"
        );
        Ok(streams)
    }

    /// Train the tagger, chunker and build/complete classifiers.
    pub fn train(&self, parses: &[Parse]) -> Result<ParserModel<T::Model>> {
        let streams = self.generate(parses, true)?;
        Self::ensure_trainable(&streams)?;

        let (tagger, (chunker, builder)) = rayon::join(
            || self.train_stream("tagger", &streams.tag),
            || {
                rayon::join(
                    || self.train_stream("chunker", &streams.chunk),
                    || self.train_stream("builder", &streams.build),
                )
            },
        );
        self.assemble(tagger?, chunker?, builder?)
    }

    /// Train the chunker and build/complete classifiers around an already
    /// trained POS tagger. No tag events are generated.
    ///
    /// The tagger must have been trained on `tagger_features` of this
    /// trainer's configuration.
    pub fn train_with_tagger(
        &self,
        parses: &[Parse],
        tagger: T::Model,
    ) -> Result<ParserModel<T::Model>> {
        let streams = self.generate(parses, false)?;
        Self::ensure_trainable(&streams)?;

        let (chunker, builder) = rayon::join(
            || self.train_stream("chunker", &streams.chunk),
            || self.train_stream("builder", &streams.build),
        );
        self.assemble(tagger, chunker?, builder?)
    }

    fn ensure_trainable(streams: &EventStreams) -> Result<()> {
        if streams.build.is_empty() {
            return Err(TrainError::EmptyTrainingSet {
                skipped: streams.skipped,
            });
        }
        Ok(())
    }

    fn assemble(
        &self,
        tagger: T::Model,
        chunker: T::Model,
        builder: T::Model,
    ) -> Result<ParserModel<T::Model>> {
        Ok(ParserModel {
            language: self.config.language,
            codec: self.config.codec,
            beam: self.config.beam.clone(),
            head_rules: self.head_rules.clone(),
            tagger_features: self.config.tagger_features.clone(),
            chunker_features: self.config.chunker_features.clone(),
            dictionary: self.config.dictionary.clone(),
            tagger,
            chunker,
            builder,
        })
    }

    fn train_stream(&self, stream: &str, events: &[Event]) -> kotoba_core::Result<T::Model> {
        tracing::info!(stream, events = events.len(), "training classifier");
        self.trainer.train(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::evaluate;
    use crate::model::{PerceptronModel, PerceptronTrainer};
    use kotoba_core::parser::ShiftReduceParser;

    const TREES: [&str; 4] = [
        "(S (NP (DT The) (NN dog)) (VP (VBD chased) (NP (DT the) (NN cat))) (. .))",
        "(S (NP (NNP Kim)) (VP (VBD said) (SBAR (S (NP (PRP she)) (VP (VBD left))))) (. .))",
        "(S (NP (DT A) (NN cat)) (VP (VBD slept)) (. .))",
        "(FRAG (NP (JJ Good) (NN morning)) (. !))",
    ];

    fn trainer() -> ParserTrainer<PerceptronTrainer> {
        let config =
            TrainingConfig::new().with_perceptron(PerceptronConfig::new().with_iterations(20));
        let perceptron = PerceptronTrainer::new(config.perceptron);
        ParserTrainer::new(config, perceptron).unwrap()
    }

    fn parses(trainer: &ParserTrainer<PerceptronTrainer>, trees: &[&str]) -> Vec<Parse> {
        trees
            .iter()
            .map(|t| Parse::from_bracketed(t, trainer.head_rules()).unwrap())
            .collect()
    }

    #[test]
    fn one_event_per_token_and_action() {
        let trainer = trainer();
        let gold = parses(&trainer, &TREES[..1]);
        let streams = trainer.events(&gold).unwrap();

        assert_eq!(streams.tag.len(), 6);
        assert_eq!(streams.chunk.len(), 6);
        assert_eq!(streams.tag[1].outcome, "NN");
        assert_eq!(streams.chunk[0].outcome, "B-NP");
        assert_eq!(streams.build[0].outcome, "SHIFT");
        assert_eq!(streams.build.last().unwrap().outcome, "COMPLETE");
        assert_eq!(streams.skipped, 0);
    }

    #[test]
    fn unreproducible_trees_are_skipped() {
        let trainer = trainer();
        // S would sit on a unary chain of three, past the default limit
        let mut gold = parses(&trainer, &["(S (VP (ADJP (NP (NN x)))))"]);
        gold.extend(parses(&trainer, &TREES[..1]));

        let streams = trainer.events(&gold).unwrap();
        assert_eq!(streams.skipped, 1);
        assert_eq!(streams.tag.len(), 6);
    }

    #[test]
    fn nothing_to_train_on() {
        let trainer = trainer();
        assert!(matches!(
            trainer.train(&[]),
            Err(TrainError::EmptyTrainingSet { skipped: 0 })
        ));
    }

    #[test]
    fn trains_a_working_parser() {
        let trainer = trainer();
        let gold = parses(&trainer, &TREES);
        let model = trainer.train(&gold).unwrap();
        assert_eq!(model.language, Language::En);

        let mut bytes = Vec::new();
        model.to_writer(&mut bytes).unwrap();
        let model: ParserModel<PerceptronModel> = ParserModel::from_reader(bytes.as_slice()).unwrap();

        let parser = ShiftReduceParser::new(model).unwrap();
        let evaluation = evaluate(&parser, &gold);
        assert_eq!(evaluation.sentences, TREES.len());
        assert_eq!(evaluation.failures, 0);
        assert_eq!(evaluation.fmeasure.f1(), 1.0);

        let words: Vec<String> = gold[0].words().into_iter().map(String::from).collect();
        let decoded = parser.parse(&words).unwrap();
        assert_eq!(decoded.constituents(), gold[0].constituents());

        let tokens = ["The", "dog", "chased", "the", "cat", "."].map(String::from);
        assert_eq!(parser.tag(&tokens).unwrap().len(), tokens.len());
    }

    #[test]
    fn reuses_a_trained_tagger() {
        let trainer = trainer();
        let gold = parses(&trainer, &TREES);
        let first = trainer.train(&gold).unwrap();

        let streams = trainer.generate(&gold, false).unwrap();
        assert!(streams.tag.is_empty());
        assert!(!streams.chunk.is_empty());

        let tagger = first.tagger.clone();
        let model = trainer.train_with_tagger(&gold, tagger).unwrap();
        assert_eq!(model.tagger, first.tagger);
        assert_eq!(model.chunker, first.chunker);

        let parser = ShiftReduceParser::new(model).unwrap();
        assert_eq!(evaluate(&parser, &gold).failures, 0);
    }

    #[test]
    fn reusing_a_tagger_still_needs_trees() {
        let trainer = trainer();
        let tagger = PerceptronTrainer::default()
            .train(&[Event::new("NN", vec!["w0=x".to_string()])])
            .unwrap();
        assert!(matches!(
            trainer.train_with_tagger(&[], tagger),
            Err(TrainError::EmptyTrainingSet { skipped: 0 })
        ));
    }
}
