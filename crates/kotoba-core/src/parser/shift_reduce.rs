//! # Shift-Reduce Parser
//!
//! Runs the three stages over a sentence: POS tagging, chunking, then the
//! build/complete transition search.

use std::sync::Arc;

use super::config::BeamConfig;
use super::context::ParserContextGenerator;
use super::model::ParserModel;
use super::search::{Search, SearchOutcome};
use super::state::ParserState;
use crate::classifier::Classifier;
use crate::error::{KotobaError, Result};
use crate::features::{ContextGenerator, SentenceContext};
use crate::headrules::HeadRules;
use crate::sequence::SequenceLabeler;
use crate::tokenizer::Tokenizer;
use crate::tree::{Parse, ParseNode};
use crate::types::{Span, token};

/// A trained shift-reduce parser.
pub struct ShiftReduceParser<C> {
    model: ParserModel<C>,
    tagger: SequenceLabeler,
    chunker: SequenceLabeler,
    generator: ParserContextGenerator,
    tokenizer: Tokenizer,
}

impl<C: Classifier> ShiftReduceParser<C> {
    /// Create a parser from a trained model.
    pub fn new(model: ParserModel<C>) -> Result<Self> {
        let beam = model.beam.sequence_beam_size;

        let mut tagger = SequenceLabeler::new(ContextGenerator::new(model.tagger_features.clone())?)
            .with_beam_size(beam);
        if let Some(dictionary) = &model.dictionary {
            tagger = tagger.with_dictionary(Arc::clone(dictionary));
        }
        let chunker = SequenceLabeler::new(ContextGenerator::new(model.chunker_features.clone())?)
            .with_codec(model.codec)
            .with_beam_size(beam);

        Ok(Self {
            model,
            tagger,
            chunker,
            generator: ParserContextGenerator::new(),
            tokenizer: Tokenizer::new(),
        })
    }

    pub fn model(&self) -> &ParserModel<C> {
        &self.model
    }

    pub fn config(&self) -> &BeamConfig {
        &self.model.beam
    }

    pub fn head_rules(&self) -> &HeadRules {
        &self.model.head_rules
    }

    /// Parse a whitespace-separated sentence.
    ///
    /// # Errors
    ///
    /// `KotobaError::EmptyInput` for blank input, otherwise as [`Self::parse`].
    pub fn parse_text(&self, input: &str) -> Result<Parse> {
        let tokens = token::texts(&self.tokenizer.tokenize(input));
        self.parse(&tokens)
    }

    /// The best parse of a tokenized sentence.
    pub fn parse(&self, tokens: &[String]) -> Result<Parse> {
        let mut parses = self.parse_n(tokens, 1)?;
        parses
            .pop()
            .ok_or(KotobaError::NoDerivation { tokens: tokens.len() })
    }

    /// Up to `n` parses, best first.
    ///
    /// # Errors
    ///
    /// Per-sentence errors: `EmptyInput`, `InvalidTagSequence` from the
    /// chunker, `IterationCapExceeded` and `NoDerivation` from the search.
    pub fn parse_n(&self, tokens: &[String], n: usize) -> Result<Vec<Parse>> {
        let outcome = self.search(tokens, n)?;
        Ok(outcome
            .derivations
            .iter()
            .filter_map(ParserState::to_parse)
            .collect())
    }

    /// Run all stages and return the raw search result.
    pub fn search(&self, tokens: &[String], n: usize) -> Result<SearchOutcome> {
        if tokens.is_empty() {
            return Err(KotobaError::EmptyInput);
        }
        let tags = self.tag(tokens)?;
        let chunks = self.chunk(tokens, &tags)?;
        let buffer = initial_buffer(tokens, &tags, &chunks, &self.model.head_rules)?;
        tracing::debug!(tokens = tokens.len(), items = buffer.len(), "parsing sentence");

        let search = Search {
            model: &self.model.builder,
            rules: &self.model.head_rules,
            generator: &self.generator,
            config: &self.model.beam,
        };
        search.run(ParserState::new(buffer), n)
    }

    /// POS tags of a sentence.
    pub fn tag(&self, tokens: &[String]) -> Result<Vec<String>> {
        let sentence = SentenceContext::new(tokens);
        Ok(self.tagger.label(&self.model.tagger, &sentence)?.into_outcomes())
    }

    /// Chunk spans of a tagged sentence.
    pub fn chunk(&self, tokens: &[String], tags: &[String]) -> Result<Vec<Span>> {
        let sentence = SentenceContext::new(tokens).with_pos_tags(tags);
        let outcomes = self.chunker.label(&self.model.chunker, &sentence)?;
        self.model.codec.decode(outcomes.outcomes())
    }
}

/// Buffer items for a tagged and chunked sentence: one node per chunk and
/// one word node per token outside any chunk.
///
/// # Errors
///
/// `KotobaError::InvalidSpan` if the chunks overlap or run past the sentence.
pub fn initial_buffer(
    tokens: &[String],
    tags: &[String],
    chunks: &[Span],
    rules: &HeadRules,
) -> Result<Vec<Arc<ParseNode>>> {
    let leaves: Vec<Arc<ParseNode>> = tokens
        .iter()
        .zip(tags)
        .enumerate()
        .map(|(i, (word, tag))| Arc::new(ParseNode::leaf(tag.as_str(), word.as_str(), i)))
        .collect();

    let mut chunks: Vec<&Span> = chunks.iter().collect();
    chunks.sort();

    let mut buffer = Vec::with_capacity(leaves.len());
    let mut position = 0;
    for chunk in chunks {
        if chunk.start() < position || chunk.end() > leaves.len() || chunk.is_empty() {
            return Err(KotobaError::InvalidSpan {
                start: chunk.start(),
                end: chunk.end(),
                len: leaves.len(),
                reason: "chunk overlaps or exceeds the sentence".to_string(),
            });
        }
        buffer.extend(leaves[position..chunk.start()].iter().cloned());
        let children = leaves[chunk.start()..chunk.end()].to_vec();
        buffer.push(Arc::new(ParseNode::new(chunk.label(), children, rules, true)?));
        position = chunk.end();
    }
    buffer.extend(leaves[position..].iter().cloned());
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::testing::{MemoryClassifier, MemoryTrainer};
    use crate::classifier::{ClassifierTrainer, Event};
    use crate::codec::{SequenceCodec, TagScheme};
    use crate::features::FeatureConfig;
    use crate::headrules::Language;
    use crate::parser::oracle_events;

    const TREES: [&str; 3] = [
        "(TOP (S (NP (DT The) (NN dog)) (VP (VBD chased) (NP (DT the) (NN cat))) (. .)))",
        "(TOP (S (NP (NNP Kim)) (VP (VBD said) (SBAR (S (NP (PRP she)) (VP (VBD left))))) (. .)))",
        "(TOP (FRAG (NP (JJ Good) (NN morning)) (. !)))",
    ];

    fn words(parse: &Parse) -> Vec<String> {
        parse.words().into_iter().map(String::from).collect()
    }

    fn train(trees: &[&str]) -> ParserModel<MemoryClassifier> {
        let rules = HeadRules::builtin(Language::En).unwrap();
        let codec = SequenceCodec::new(TagScheme::Bio);
        let beam = BeamConfig::default();
        let tagger =
            SequenceLabeler::new(ContextGenerator::new(FeatureConfig::pos_tagger()).unwrap());
        let chunker = SequenceLabeler::new(ContextGenerator::new(FeatureConfig::chunker()).unwrap());

        let (mut tag_events, mut chunk_events, mut build_events) = (vec![], vec![], vec![]);
        for text in trees {
            let parse = Parse::from_bracketed(text, &rules).unwrap();
            let tokens = words(&parse);
            let tags: Vec<String> = parse.tags().into_iter().map(String::from).collect();
            let chunk_tags = codec.encode(&parse.chunk_spans(), tokens.len()).unwrap();

            let sentence = SentenceContext::new(&tokens);
            tag_events.extend(tagger.events(&sentence, &tags).unwrap());
            chunk_events.extend(chunker.events(&sentence.with_pos_tags(&tags), &chunk_tags).unwrap());
            build_events.extend(
                oracle_events(&parse, &rules, &ParserContextGenerator::new(), &beam).unwrap(),
            );
        }

        ParserModel {
            language: Language::En,
            codec,
            beam,
            head_rules: rules,
            tagger_features: FeatureConfig::pos_tagger(),
            chunker_features: FeatureConfig::chunker(),
            dictionary: None,
            tagger: MemoryTrainer.train(&tag_events).unwrap(),
            chunker: MemoryTrainer.train(&chunk_events).unwrap(),
            builder: MemoryTrainer.train(&build_events).unwrap(),
        }
    }

    #[test]
    fn reproduces_training_trees() {
        let parser = ShiftReduceParser::new(train(&TREES)).unwrap();
        for text in TREES {
            let gold = Parse::from_bracketed(text, parser.head_rules()).unwrap();
            let parse = parser.parse(&words(&gold)).unwrap();
            assert_eq!(parse.to_string(), text);
            assert!(parse.score() < 0.0);
        }
    }

    #[test]
    fn parse_text_tokenizes() {
        let parser = ShiftReduceParser::new(train(&TREES[2..])).unwrap();
        let parse = parser.parse_text("  Good morning ! ").unwrap();
        assert_eq!(parse.to_string(), TREES[2]);
    }

    #[test]
    fn derivations_cover_every_word_once() {
        let parser = ShiftReduceParser::new(train(&TREES)).unwrap();
        let gold = Parse::from_bracketed(TREES[1], parser.head_rules()).unwrap();
        let tokens = words(&gold);

        let parses = parser.parse_n(&tokens, 5).unwrap();
        assert!(!parses.is_empty());
        for pair in parses.windows(2) {
            assert!(pair[0].score() >= pair[1].score());
        }
        for parse in &parses {
            let leaves = parse.root().leaves();
            assert_eq!(leaves.len(), tokens.len());
            for (i, leaf) in leaves.iter().enumerate() {
                assert_eq!((leaf.start(), leaf.end()), (i, i + 1));
            }
        }
    }

    #[test]
    fn live_beam_never_exceeds_beam_size() {
        let mut model = train(&TREES);
        model.beam = model.beam.with_beam_size(2);
        let parser = ShiftReduceParser::new(model).unwrap();
        let gold = Parse::from_bracketed(TREES[0], parser.head_rules()).unwrap();

        let outcome = parser.search(&words(&gold), 3).unwrap();
        assert!(outcome.peak_beam <= 2);
        assert!(outcome.derivations.len() <= 2);
    }

    #[test]
    fn dead_end_is_reported_as_no_derivation() {
        let mut model = train(&TREES);
        model.builder = MemoryTrainer.train(&[Event::new("SHIFT", vec![])]).unwrap();
        let parser = ShiftReduceParser::new(model).unwrap();

        let tokens: Vec<String> = ["Good", "morning", "!"].map(String::from).to_vec();
        assert!(matches!(
            parser.parse(&tokens),
            Err(KotobaError::NoDerivation { tokens: 3 })
        ));
    }

    #[test]
    fn iteration_cap_is_an_error() {
        let mut model = train(&TREES);
        model.beam = model.beam.with_max_iterations_per_item(1);
        let parser = ShiftReduceParser::new(model).unwrap();
        let gold = Parse::from_bracketed(TREES[0], parser.head_rules()).unwrap();

        assert!(matches!(
            parser.parse(&words(&gold)),
            Err(KotobaError::IterationCapExceeded { .. })
        ));
    }

    #[test]
    fn empty_sentence_is_rejected() {
        let parser = ShiftReduceParser::new(train(&TREES)).unwrap();
        assert!(matches!(parser.parse(&[]), Err(KotobaError::EmptyInput)));
        assert!(matches!(parser.parse_text("   "), Err(KotobaError::EmptyInput)));
    }

    #[test]
    fn model_round_trips_through_json() {
        let model = train(&TREES);
        let mut bytes = Vec::new();
        model.to_writer(&mut bytes).unwrap();
        let restored: ParserModel<MemoryClassifier> =
            ParserModel::from_reader(bytes.as_slice()).unwrap();

        let parser = ShiftReduceParser::new(restored).unwrap();
        let gold = Parse::from_bracketed(TREES[0], parser.head_rules()).unwrap();
        assert_eq!(parser.parse(&words(&gold)).unwrap().to_string(), TREES[0]);
    }

    #[test]
    fn initial_buffer_groups_chunks() {
        let rules = HeadRules::builtin(Language::En).unwrap();
        let tokens: Vec<String> = ["the", "dog", "barks"].map(String::from).to_vec();
        let tags: Vec<String> = ["DT", "NN", "VBZ"].map(String::from).to_vec();

        let buffer = initial_buffer(&tokens, &tags, &[Span::new(0, 2, "NP")], &rules).unwrap();
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer[0].to_string(), "(NP (DT the) (NN dog))");
        assert_eq!(buffer[0].head_word(), "dog");
        assert!(buffer[1].is_leaf());

        let overlapping = [Span::new(0, 2, "NP"), Span::new(1, 3, "VP")];
        assert!(initial_buffer(&tokens, &tags, &overlapping, &rules).is_err());
    }
}
