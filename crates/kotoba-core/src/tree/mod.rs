//! # Parse Trees
//!
//! [`ParseNode`] is the constituent type shared by the transition system, the
//! oracle and the evaluator. [`Parse`] wraps a rooted tree with its derivation
//! score and reads or writes Penn-style brackets.

mod bracketed;
mod node;

use std::fmt;
use std::sync::Arc;

pub use node::ParseNode;

use bracketed::RawTree;

use crate::error::Result;
use crate::headrules::HeadRules;
use crate::types::Span;

/// Label of the root constituent of every parse.
pub const TOP_LABEL: &str = "TOP";

/// A complete parse tree rooted at a [`TOP_LABEL`] node.
#[derive(Debug, Clone, PartialEq)]
pub struct Parse {
    root: Arc<ParseNode>,
    score: f64,
}

impl Parse {
    pub fn new(root: Arc<ParseNode>) -> Self {
        let score = root.score();
        Self { root, score }
    }

    /// Read a bracketed tree and annotate its heads.
    ///
    /// An unlabeled outer bracket becomes the `TOP` node; any other root
    /// label is wrapped in a new `TOP` node.
    ///
    /// ```
    /// use kotoba_core::headrules::{HeadRules, Language};
    /// use kotoba_core::tree::Parse;
    ///
    /// let rules = HeadRules::builtin(Language::En).unwrap();
    /// let text = "(S (NP (DT the) (NN dog)) (VP (VBZ barks)))";
    /// let parse = Parse::from_bracketed(text, &rules).unwrap();
    ///
    /// assert_eq!(parse.words(), vec!["the", "dog", "barks"]);
    /// assert_eq!(parse.to_string(), "(TOP (S (NP (DT the) (NN dog)) (VP (VBZ barks))))");
    /// ```
    ///
    /// # Errors
    ///
    /// `KotobaError::MalformedTree` if the brackets do not form a tree.
    pub fn from_bracketed(text: &str, rules: &HeadRules) -> Result<Self> {
        let raw = bracketed::read(text)?;
        let mut next_word = 0;
        let root = match raw {
            RawTree::Phrase { label, children } if label.is_empty() || label == TOP_LABEL => {
                let children = children
                    .into_iter()
                    .map(|child| build(child, rules, &mut next_word))
                    .collect::<Result<Vec<_>>>()?;
                ParseNode::new(TOP_LABEL, children, rules, true)?
            }
            other => {
                let child = build(other, rules, &mut next_word)?;
                ParseNode::new(TOP_LABEL, vec![child], rules, true)?
            }
        };
        Ok(Self::new(Arc::new(root)))
    }

    pub fn root(&self) -> &ParseNode {
        &self.root
    }

    /// Sum of the log-probabilities of the actions that built this parse.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.root.end() - self.root.start()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn words(&self) -> Vec<&str> {
        self.root.leaves().iter().filter_map(|l| l.word()).collect()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.root.leaves().iter().map(|l| l.label()).collect()
    }

    /// Labeled spans of every constituent except words and the root.
    pub fn constituents(&self) -> Vec<Span> {
        let mut spans = Vec::new();
        for child in self.root.children() {
            collect_constituents(child, &mut spans);
        }
        spans
    }

    /// The flat chunk-level nodes: maximal constituents whose children are all
    /// words, excluding the root.
    pub fn chunks(&self) -> Vec<&ParseNode> {
        let mut chunks = Vec::new();
        collect_chunks(&self.root, &mut chunks);
        chunks
    }

    /// Labeled spans of [`Parse::chunks`].
    pub fn chunk_spans(&self) -> Vec<Span> {
        self.chunks()
            .into_iter()
            .map(|c| Span::new(c.start(), c.end(), c.label()))
            .collect()
    }
}

impl fmt::Display for Parse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

fn build(raw: RawTree, rules: &HeadRules, next_word: &mut usize) -> Result<Arc<ParseNode>> {
    let node = match raw {
        RawTree::Word { tag, word } => {
            let leaf = ParseNode::leaf(tag, word, *next_word);
            *next_word += 1;
            leaf
        }
        RawTree::Phrase { label, children } => {
            let children = children
                .into_iter()
                .map(|child| build(child, rules, next_word))
                .collect::<Result<Vec<_>>>()?;
            ParseNode::new(label, children, rules, true)?
        }
    };
    Ok(Arc::new(node))
}

fn collect_constituents(node: &ParseNode, spans: &mut Vec<Span>) {
    if node.is_leaf() {
        return;
    }
    spans.push(Span::new(node.start(), node.end(), node.label()));
    for child in node.children() {
        collect_constituents(child, spans);
    }
}

fn collect_chunks<'a>(node: &'a ParseNode, chunks: &mut Vec<&'a ParseNode>) {
    for child in node.children() {
        if child.is_chunk() {
            chunks.push(child);
        } else if !child.is_leaf() {
            collect_chunks(child, chunks);
        }
    }
}
