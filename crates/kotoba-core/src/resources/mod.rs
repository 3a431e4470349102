//! # Auxiliary Resources
//!
//! Read-only lexicons consulted by feature generators and the POS tagger.
//! Loaders never fail on a bad row: each row is either kept or recorded in a
//! [`LoadReport`] with the reason it was skipped.

mod cluster;
mod dictionary;
mod report;

pub use cluster::ClusterLexicon;
pub use dictionary::DictionaryTagger;
pub use report::{LoadReport, SkipReason, SkippedLine};
