//! Per-line outcome of loading a tab-separated resource file.

use std::fmt;

use serde::Serialize;

/// Why a resource line was not loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// A `class\tword\tfrequency` row at or under the frequency threshold.
    BelowFrequency(u64),
    /// The frequency column is not a non-negative integer.
    BadFrequency(String),
    /// The row has a column count the format does not allow.
    WrongColumnCount(usize),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BelowFrequency(freq) => write!(f, "frequency {freq} below threshold"),
            Self::BadFrequency(raw) => write!(f, "bad frequency {raw:?}"),
            Self::WrongColumnCount(n) => write!(f, "unexpected column count {n}"),
        }
    }
}

/// A skipped line and its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line: usize,
    pub reason: SkipReason,
}

/// Summary of a resource load: how many rows were kept and which were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedLine>,
}

impl LoadReport {
    pub(crate) fn keep(&mut self) {
        self.loaded += 1;
    }

    pub(crate) fn skip(&mut self, line: usize, reason: SkipReason) {
        tracing::debug!(line, %reason, "skipping resource line");
        self.skipped.push(SkippedLine { line, reason });
    }

    /// Returns `true` if every non-blank line was loaded.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    pub(crate) fn log_summary(&self, resource: &str) {
        tracing::info!(
            resource,
            loaded = self.loaded,
            skipped = self.skipped.len(),
            "resource loaded"
        );
    }
}
