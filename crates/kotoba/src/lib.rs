//! # Kotoba
//!
//! Statistical constituency parsing: POS tagging, chunking and a
//! shift-reduce tree builder under beam search, with the training and
//! evaluation tools to produce models.
//!
//! The parsing pipeline lives in [`core`]; model training and bracket
//! F-measure scoring live in [`trainer`].

pub use kotoba_core as core;
pub use kotoba_trainer as trainer;

pub use kotoba_core::{
    BeamConfig, Classifier, ClassifierTrainer, HeadRules, KotobaError, Language, Parse,
    ParserModel, Result, SequenceCodec, ShiftReduceParser, Span, TagScheme,
};
pub use kotoba_trainer::{
    FMeasure, ParserTrainer, PerceptronConfig, PerceptronModel, PerceptronTrainer, TrainingConfig,
};
