//! # Shift-Reduce Parsing
//!
//! A left-corner transition system under beam search.
//!
//! Words are POS tagged and chunked first; chunks and the words outside them
//! form the buffer. Three actions then build the tree:
//!
//! - `SHIFT` pushes the next buffer item;
//! - `BUILD(X)` turns the completed top item into the first child of a new,
//!   still open constituent `X`;
//! - `COMPLETE` closes the innermost open constituent over the completed
//!   items above it.
//!
//! A derivation ends with a single complete `TOP` node spanning the sentence.

mod action;
mod config;
mod context;
mod model;
mod oracle;
mod search;
mod shift_reduce;
mod state;

pub use action::Action;
pub use config::BeamConfig;
pub use context::ParserContextGenerator;
pub use model::ParserModel;
pub use oracle::{gold_buffer, oracle_actions, oracle_events};
pub use search::SearchOutcome;
pub use shift_reduce::{ShiftReduceParser, initial_buffer};
pub use state::ParserState;
