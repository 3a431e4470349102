use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{KotobaError, Result};
use crate::headrules::HeadRules;

/// A constituent or a POS-tagged word.
///
/// Nodes are immutable once built. Children are shared through `Arc` so
/// that parser states can branch without copying subtrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseNode {
    label: String,
    start: usize,
    end: usize,
    children: Vec<Arc<ParseNode>>,
    /// `None` for a word, which is its own head.
    head_index: Option<usize>,
    head_word: String,
    head_tag: String,
    complete: bool,
    score: f64,
    word: Option<String>,
}

impl ParseNode {
    /// A POS-tagged word at sentence position `index`.
    pub fn leaf(tag: impl Into<String>, word: impl Into<String>, index: usize) -> Self {
        let tag = tag.into();
        let word = word.into();
        Self {
            head_word: word.clone(),
            head_tag: tag.clone(),
            label: tag,
            start: index,
            end: index + 1,
            children: Vec::new(),
            head_index: None,
            complete: true,
            score: 0.0,
            word: Some(word),
        }
    }

    /// A constituent over `children`, with its head chosen by `rules`.
    ///
    /// # Errors
    ///
    /// `KotobaError::MalformedTree` if `children` is empty or not contiguous.
    pub fn new(
        label: impl Into<String>,
        children: Vec<Arc<ParseNode>>,
        rules: &HeadRules,
        complete: bool,
    ) -> Result<Self> {
        let label = label.into();
        let (Some(first), Some(last)) = (children.first(), children.last()) else {
            return Err(KotobaError::MalformedTree(format!("{label} has no children")));
        };
        if let Some(pair) = children.windows(2).find(|w| w[0].end != w[1].start) {
            return Err(KotobaError::MalformedTree(format!(
                "{label} children are not contiguous at {}..{}",
                pair[0].end, pair[1].start
            )));
        }
        let (start, end) = (first.start, last.end);

        let child_labels: Vec<&str> = children.iter().map(|c| c.label()).collect();
        let head = rules.head_index(&label, &child_labels);
        let head_word = children[head].head_word.clone();
        let head_tag = children[head].head_tag.clone();

        Ok(Self {
            label,
            start,
            end,
            children,
            head_index: Some(head),
            head_word,
            head_tag,
            complete,
            score: 0.0,
            word: None,
        })
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn children(&self) -> &[Arc<ParseNode>] {
        &self.children
    }

    pub fn head_index(&self) -> Option<usize> {
        self.head_index
    }

    /// The head child; `None` for a word.
    pub fn head_child(&self) -> Option<&ParseNode> {
        self.head_index.map(|i| self.children[i].as_ref())
    }

    pub fn head_word(&self) -> &str {
        &self.head_word
    }

    pub fn head_tag(&self) -> &str {
        &self.head_tag
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    /// A POS-tagged word (a preterminal).
    pub fn is_leaf(&self) -> bool {
        self.word.is_some()
    }

    /// A flat constituent whose children are all words.
    pub fn is_chunk(&self) -> bool {
        !self.children.is_empty() && self.children.iter().all(|c| c.is_leaf())
    }

    /// The words under this node, in order.
    pub fn leaves(&self) -> Vec<&ParseNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ParseNode>) {
        if self.is_leaf() {
            out.push(self);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.word {
            Some(word) => write!(f, "({} {})", self.label, word),
            None => {
                write!(f, "({}", self.label)?;
                for child in &self.children {
                    write!(f, " {child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headrules::Language;

    fn leaf(tag: &str, word: &str, i: usize) -> Arc<ParseNode> {
        Arc::new(ParseNode::leaf(tag, word, i))
    }

    #[test]
    fn head_word_follows_head_chain() {
        let rules = HeadRules::builtin(Language::En).unwrap();
        let children = vec![leaf("DT", "the", 0), leaf("NN", "dog", 1)];
        let np = ParseNode::new("NP", children, &rules, true).unwrap();
        assert_eq!(np.head_index(), Some(1));
        assert_eq!(np.head_word(), "dog");
        assert_eq!(np.head_tag(), "NN");
        assert_eq!((np.start(), np.end()), (0, 2));
        assert!(np.is_chunk());

        let vp = ParseNode::new("VP", vec![leaf("VBZ", "barks", 2)], &rules, true).unwrap();
        let s = ParseNode::new("S", vec![Arc::new(np), Arc::new(vp)], &rules, true).unwrap();
        assert_eq!(s.head_index(), Some(1));
        assert_eq!(s.head_word(), "barks");
        assert_eq!(s.head_tag(), "VBZ");
        assert!(!s.is_chunk());
        assert_eq!(s.leaves().len(), 3);
        assert_eq!(s.to_string(), "(S (NP (DT the) (NN dog)) (VP (VBZ barks)))");
    }

    #[test]
    fn rejects_empty_and_gapped_children() {
        let rules = HeadRules::builtin(Language::En).unwrap();
        assert!(ParseNode::new("NP", vec![], &rules, true).is_err());
        let gapped = vec![leaf("DT", "the", 0), leaf("NN", "dog", 2)];
        assert!(matches!(
            ParseNode::new("NP", gapped, &rules, true),
            Err(KotobaError::MalformedTree(_))
        ));
    }
}
