//! # Kotoba Core
//!
//! Constituency parsing for English and Spanish. A sentence is POS tagged,
//! chunked, and then assembled into a tree by a left-corner shift-reduce
//! parser under beam search. Head rules, feature extraction and the BIO/BILOU
//! span codec are usable on their own.
//!
//! ## Quick Start
//!
//! ```rust
//! use kotoba_core::headrules::{HeadRules, Language};
//! use kotoba_core::tree::Parse;
//!
//! let rules = HeadRules::builtin(Language::En).unwrap();
//! let parse = Parse::from_bracketed("(S (NP (DT The) (NN dog)) (VP (VBZ barks)))", &rules).unwrap();
//!
//! assert_eq!(parse.root().head_word(), "barks");
//! assert_eq!(parse.chunk_spans().len(), 2);
//! ```
//!
//! Trained parsers are built from a [`parser::ParserModel`], which pairs three
//! [`Classifier`]s with the configuration they were trained under.
pub mod classifier;
pub mod codec;
pub mod error;
pub mod features;
pub mod headrules;
pub mod parser;
pub mod resources;
pub mod sequence;
pub mod tokenizer;
pub mod tree;
pub mod types;

// Re-export primary API
pub use classifier::{Classifier, ClassifierTrainer, Event};
pub use codec::{DecodePolicy, SequenceCodec, Tag, TagScheme};
pub use error::{KotobaError, Result};
pub use features::{ContextGenerator, DocumentContext, FeatureConfig, FeatureKind, SentenceContext};
pub use headrules::{HeadRules, Language};
pub use parser::{Action, BeamConfig, ParserModel, ParserState, ShiftReduceParser};
pub use resources::{ClusterLexicon, DictionaryTagger, LoadReport};
pub use sequence::{Sequence, SequenceLabeler};
pub use tokenizer::Tokenizer;
pub use tree::{Parse, ParseNode, TOP_LABEL};
pub use types::{Span, Token};
