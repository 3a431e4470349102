//! # Kotoba Trainer
//!
//! Trains shift-reduce parser models from bracketed treebanks and scores
//! them with bracket F-measure. Classifiers are averaged perceptrons; any
//! other [`kotoba_core::ClassifierTrainer`] plugs into [`ParserTrainer`].

pub mod data;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod trainer;

pub use data::{Treebank, load_treebank, read_treebank};
pub use error::{Result, TrainError};
pub use evaluate::{Evaluation, FMeasure, evaluate};
pub use model::{PerceptronConfig, PerceptronModel, PerceptronTrainer};
pub use trainer::{EventStreams, ParserTrainer, TrainingConfig};
