//! Treebank loading.
//!
//! Trees are Penn-style brackets. A tree may span several lines; a new tree
//! starts once the brackets of the previous one balance. Lines starting with
//! `#` outside a tree are comments.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use kotoba_core::headrules::HeadRules;
use kotoba_core::tree::Parse;

use crate::error::{Result, TrainError};

/// Gold trees read from a treebank, plus the number of trees that failed to read.
#[derive(Debug, Clone, Default)]
pub struct Treebank {
    pub parses: Vec<Parse>,
    pub skipped: usize,
}

impl Treebank {
    pub fn len(&self) -> usize {
        self.parses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parses.is_empty()
    }
}

/// Load a treebank file.
pub fn load_treebank<P: AsRef<Path>>(path: P, rules: &HeadRules) -> Result<Treebank> {
    let file = File::open(path.as_ref())?;
    let treebank = read_treebank(BufReader::new(file), rules)?;
    tracing::info!(
        path = %path.as_ref().display(),
        trees = treebank.len(),
        skipped = treebank.skipped,
        "loaded treebank"
    );
    Ok(treebank)
}

/// Read trees from a reader. Malformed trees are logged and skipped;
/// unbalanced brackets at end of input are an error.
pub fn read_treebank<R: BufRead>(reader: R, rules: &HeadRules) -> Result<Treebank> {
    let mut treebank = Treebank::default();
    let mut current = String::new();
    let mut depth = 0i64;
    let mut start_line = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if current.is_empty() && (trimmed.is_empty() || trimmed.starts_with('#')) {
            continue;
        }
        if current.is_empty() {
            start_line = idx + 1;
        } else {
            current.push(' ');
        }
        current.push_str(trimmed);
        depth += bracket_balance(trimmed);

        if depth <= 0 {
            match Parse::from_bracketed(&current, rules) {
                Ok(parse) => treebank.parses.push(parse),
                Err(e) => {
                    tracing::warn!(line = start_line, error = %e, "skipping malformed tree");
                    treebank.skipped += 1;
                }
            }
            current.clear();
            depth = 0;
        }
    }

    if !current.is_empty() {
        return Err(TrainError::Treebank {
            line: start_line,
            source: kotoba_core::KotobaError::MalformedTree(
                "unbalanced brackets at end of input".to_string(),
            ),
        });
    }
    Ok(treebank)
}

fn bracket_balance(line: &str) -> i64 {
    line.chars().fold(0, |acc, c| match c {
        '(' => acc + 1,
        ')' => acc - 1,
        _ => acc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kotoba_core::headrules::Language;

    fn rules() -> HeadRules {
        HeadRules::builtin(Language::En).unwrap()
    }

    #[test]
    fn reads_one_tree_per_line_and_multiline_trees() {
        let text = "# corpus\n\
                    (S (NP (DT The) (NN dog)) (VP (VBZ barks)))\n\
                    \n\
                    ( (S (NP (PRP It))\n  (VP (VBZ rains))))\n";
        let treebank = read_treebank(text.as_bytes(), &rules()).unwrap();
        assert_eq!(treebank.len(), 2);
        assert_eq!(treebank.skipped, 0);
        assert_eq!(
            treebank.parses[1].to_string(),
            "(TOP (S (NP (PRP It)) (VP (VBZ rains))))"
        );
    }

    #[test]
    fn skips_malformed_trees() {
        let text = "(S (NP (DT The) (NN dog)) (VP (VBZ barks)))\n()\n(NP (NN cat))\n";
        let treebank = read_treebank(text.as_bytes(), &rules()).unwrap();
        assert_eq!(treebank.len(), 2);
        assert_eq!(treebank.skipped, 1);
    }

    #[test]
    fn unbalanced_tail_is_an_error() {
        let text = "(S (NP (NN cat))\n";
        assert!(matches!(
            read_treebank(text.as_bytes(), &rules()),
            Err(TrainError::Treebank { line: 1, .. })
        ));
    }
}
