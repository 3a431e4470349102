//! Ancora head rule format.
//!
//! Tab separated: `<PARENT>\t<left|right>\t<label> <label> ...`. Labels
//! ending in `*` match by prefix, which suits the positional EAGLES tags
//! (`ncms000` is matched by `n*`).

use super::{Direction, HeadRuleEntry, LabelPattern, rule_error};
use crate::error::Result;

pub(super) fn parse(text: &str) -> Result<Vec<(String, HeadRuleEntry)>> {
    let mut entries = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(rule_error(
                line_no,
                format!("expected 3 tab-separated fields, found {}", fields.len()),
            ));
        }

        let parent = fields[0].trim();
        if parent.is_empty() {
            return Err(rule_error(line_no, "empty parent label"));
        }

        let direction = match fields[1].trim() {
            "left" => Direction::LeftToRight,
            "right" => Direction::RightToLeft,
            other => {
                return Err(rule_error(line_no, format!("bad direction {other:?}")));
            }
        };

        let labels = fields[2].split_whitespace().map(LabelPattern::parse).collect();
        entries.push((parent.to_string(), HeadRuleEntry { direction, labels }));
    }

    Ok(entries)
}

/// EAGLES punctuation tags all start with `f`.
pub(super) fn punctuation() -> Vec<LabelPattern> {
    vec![LabelPattern::Prefix("f".to_string())]
}
