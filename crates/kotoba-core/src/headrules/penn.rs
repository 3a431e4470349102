//! Penn Treebank head rule format.
//!
//! One entry per line: `<count> <PARENT> <dir> <labels...>`, where `count`
//! is the number of fields after itself and `dir` is `1` for left-to-right,
//! `0` for right-to-left. Blank lines and `#` comments are ignored.

use super::{Direction, HeadRuleEntry, LabelPattern, rule_error};
use crate::error::Result;

pub(super) fn parse(text: &str) -> Result<Vec<(String, HeadRuleEntry)>> {
    let mut entries = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(rule_error(line_no, "expected <count> <parent> <dir> [labels]"));
        }

        let count: usize = fields[0]
            .parse()
            .map_err(|_| rule_error(line_no, format!("bad field count {:?}", fields[0])))?;
        if count != fields.len() - 1 {
            return Err(rule_error(
                line_no,
                format!("field count {count} but {} fields follow", fields.len() - 1),
            ));
        }

        let direction = match fields[2] {
            "1" => Direction::LeftToRight,
            "0" => Direction::RightToLeft,
            other => {
                return Err(rule_error(line_no, format!("bad direction {other:?}")));
            }
        };

        let labels = fields[3..]
            .iter()
            .map(|l| LabelPattern::Exact((*l).to_string()))
            .collect();

        entries.push((fields[1].to_string(), HeadRuleEntry { direction, labels }));
    }

    Ok(entries)
}

pub(super) fn punctuation() -> Vec<LabelPattern> {
    ["``", "''", ".", ",", ":", "-LRB-", "-RRB-"]
        .into_iter()
        .map(|tag| LabelPattern::Exact(tag.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KotobaError;

    #[test]
    fn parses_entries_and_directions() {
        let entries = parse("4 PP 0 IN TO\n3 NP 1 NN\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "PP");
        assert_eq!(entries[0].1.direction, Direction::RightToLeft);
        assert_eq!(entries[1].1.direction, Direction::LeftToRight);
        assert_eq!(entries[1].1.labels, vec![LabelPattern::Exact("NN".into())]);
    }

    #[test]
    fn parent_without_labels() {
        let entries = parse("2 FRAG 0\n").unwrap();
        assert!(entries[0].1.labels.is_empty());
    }

    #[test]
    fn rejects_wrong_count() {
        let err = parse("# header\n5 PP 0 IN TO\n").unwrap_err();
        assert!(matches!(err, KotobaError::HeadRules { line: 2, .. }));
    }

    #[test]
    fn rejects_bad_direction() {
        let err = parse("4 PP left IN TO\n").unwrap_err();
        assert!(matches!(err, KotobaError::HeadRules { line: 1, .. }));
    }

    #[test]
    fn rejects_truncated_line() {
        assert!(parse("PP 0\n").is_err());
    }
}
