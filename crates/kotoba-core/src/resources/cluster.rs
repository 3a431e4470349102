use std::collections::HashMap;
use std::io::BufRead;

use serde::{Deserialize, Serialize};

use super::report::{LoadReport, SkipReason};
use crate::error::Result;

/// Rows of the three-column format are kept only above this frequency.
const MIN_FREQUENCY: u64 = 5;

/// Turkish dotted capital I, folded to a plain `I` in cluster keys.
const DOTTED_CAPITAL_I: char = '\u{130}';

fn normalize(word: &str) -> String {
    word.replace(DOTTED_CAPITAL_I, "I")
}

/// Word to cluster id mapping built from Brown or Clark style cluster files.
///
/// Two row layouts are accepted:
/// - `class\tword\tfrequency`, kept when `frequency > 5`
/// - `word\tclass`, always kept
///
/// Words are stored and looked up with `İ` folded to `I`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterLexicon {
    clusters: HashMap<String, String>,
}

impl ClusterLexicon {
    /// Load a cluster file, reporting every row that was not kept.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<(Self, LoadReport)> {
        let mut clusters = HashMap::new();
        let mut report = LoadReport::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let cols: Vec<&str> = line.split('\t').collect();
            match cols.as_slice() {
                [class, word, freq] => match freq.trim().parse::<u64>() {
                    Ok(freq) if freq > MIN_FREQUENCY => {
                        clusters.insert(normalize(word), (*class).to_string());
                        report.keep();
                    }
                    Ok(freq) => report.skip(line_no, SkipReason::BelowFrequency(freq)),
                    Err(_) => {
                        report.skip(line_no, SkipReason::BadFrequency((*freq).to_string()))
                    }
                },
                [word, class] => {
                    clusters.insert(normalize(word), (*class).to_string());
                    report.keep();
                }
                other => report.skip(line_no, SkipReason::WrongColumnCount(other.len())),
            }
        }

        report.log_summary("cluster lexicon");
        Ok((Self { clusters }, report))
    }

    /// Cluster id of a word, if listed.
    pub fn lookup(&self, word: &str) -> Option<&str> {
        if word.contains(DOTTED_CAPITAL_I) {
            self.clusters.get(&normalize(word)).map(String::as_str)
        } else {
            self.clusters.get(word).map(String::as_str)
        }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
