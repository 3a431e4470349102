use std::collections::HashMap;
use std::io::BufRead;

use serde::{Deserialize, Serialize};

use super::report::{LoadReport, SkipReason};
use crate::error::Result;

/// Dictionary of closed-class POS tags that override the tagger's output.
///
/// Built from `word\tlemma\tpostag` rows and keyed by the lower-cased word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryTagger {
    tags: HashMap<String, String>,
}

impl DictionaryTagger {
    pub fn from_reader<R: BufRead>(reader: R) -> Result<(Self, LoadReport)> {
        let mut tags = HashMap::new();
        let mut report = LoadReport::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() < 3 {
                report.skip(idx + 1, SkipReason::WrongColumnCount(cols.len()));
                continue;
            }
            tags.insert(cols[0].to_lowercase(), cols[2].to_string());
            report.keep();
        }

        report.log_summary("dictionary");
        Ok((Self { tags }, report))
    }

    /// Dictionary tag of a word, compared case-insensitively.
    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.tags.get(&word.to_lowercase()).map(String::as_str)
    }

    /// The final tag for `word`: the dictionary entry if listed, `proposed` otherwise.
    pub fn tag<'a>(&'a self, word: &str, proposed: &'a str) -> &'a str {
        self.lookup(word).unwrap_or(proposed)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> DictionaryTagger {
        DictionaryTagger::from_reader("run\trun\tVB\nthe\tthe\tDT\n".as_bytes())
            .unwrap()
            .0
    }

    #[test]
    fn overrides_case_insensitively() {
        let dict = dictionary();
        assert_eq!(dict.tag("Run", "NN"), "VB");
        assert_eq!(dict.tag("THE", "NNP"), "DT");
    }

    #[test]
    fn keeps_proposal_for_unknown_words() {
        assert_eq!(dictionary().tag("dog", "NN"), "NN");
    }

    #[test]
    fn short_rows_are_reported() {
        let (dict, report) =
            DictionaryTagger::from_reader("run\trun\tVB\nbroken\tline\n".as_bytes()).unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(report.skipped[0].line, 2);
        assert_eq!(report.skipped[0].reason, SkipReason::WrongColumnCount(2));
    }
}
