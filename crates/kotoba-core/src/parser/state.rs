use std::cmp::Ordering;
use std::sync::Arc;

use super::action::Action;
use super::config::BeamConfig;
use crate::error::{KotobaError, Result};
use crate::headrules::HeadRules;
use crate::tree::{Parse, ParseNode, TOP_LABEL};

/// A partial derivation.
///
/// Branching clones the stack of `Arc`s, never the nodes themselves.
#[derive(Debug, Clone)]
pub struct ParserState {
    stack: Vec<Arc<ParseNode>>,
    buffer: Arc<[Arc<ParseNode>]>,
    next: usize,
    actions: Vec<Action>,
    score: f64,
}

impl ParserState {
    /// Start state over a buffer of words and chunks.
    pub fn new(buffer: Vec<Arc<ParseNode>>) -> Self {
        Self {
            stack: Vec::new(),
            buffer: buffer.into(),
            next: 0,
            actions: Vec::new(),
            score: 0.0,
        }
    }

    pub fn stack(&self) -> &[Arc<ParseNode>] {
        &self.stack
    }

    /// Stack item `depth` positions below the top.
    pub fn stack_item(&self, depth: usize) -> Option<&ParseNode> {
        let idx = self.stack.len().checked_sub(depth + 1)?;
        Some(self.stack[idx].as_ref())
    }

    /// Buffer items not yet shifted.
    pub fn remaining(&self) -> &[Arc<ParseNode>] {
        &self.buffer[self.next..]
    }

    /// Total number of buffer items, shifted or not.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Number of words covered by the buffer.
    pub fn sentence_len(&self) -> usize {
        self.buffer.last().map_or(0, |item| item.end())
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Sum of the log-probabilities of the actions taken.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Stack index of the innermost open constituent.
    pub fn open_index(&self) -> Option<usize> {
        self.stack.iter().rposition(|node| !node.is_complete())
    }

    pub fn open_node(&self) -> Option<&ParseNode> {
        self.open_index().map(|i| self.stack[i].as_ref())
    }

    /// Buffer empty and a single complete `TOP` node on the stack.
    pub fn is_terminal(&self) -> bool {
        self.remaining().is_empty()
            && self.stack.len() == 1
            && self.stack[0].is_complete()
            && self.stack[0].label() == TOP_LABEL
    }

    /// Whether `action` may be taken from this state.
    pub fn is_admissible(&self, action: &Action, config: &BeamConfig) -> bool {
        match action {
            Action::Shift => {
                !self.remaining().is_empty()
                    && (self.stack.is_empty() || self.open_index().is_some())
            }
            Action::Build(label) => {
                let Some(top) = self.stack.last() else {
                    return false;
                };
                if !top.is_complete() || top.label() == TOP_LABEL {
                    return false;
                }
                label != TOP_LABEL || self.stack.len() == 1
            }
            Action::Complete => {
                let Some(open) = self.open_index() else {
                    return false;
                };
                let node = &self.stack[open];
                if node.label() == TOP_LABEL && !self.remaining().is_empty() {
                    return false;
                }
                if open + 1 < self.stack.len() {
                    return true;
                }
                // completing now would leave a single child
                let Some(corner) = node.children().first() else {
                    return false;
                };
                corner.label() != node.label() && unary_chain(corner) < config.max_unary_chain
            }
        }
    }

    /// The state reached by taking `action` with probability `prob`.
    ///
    /// # Errors
    ///
    /// `KotobaError::InvalidAction` if the stack or buffer cannot support the
    /// action. Admissibility constraints beyond that are the caller's job.
    pub fn apply(&self, action: &Action, prob: f64, rules: &HeadRules) -> Result<Self> {
        let mut next = self.clone();
        match action {
            Action::Shift => {
                let item = self
                    .buffer
                    .get(self.next)
                    .ok_or_else(|| invalid(action, "buffer is empty"))?;
                next.stack.push(Arc::clone(item));
                next.next += 1;
            }
            Action::Build(label) => {
                let top = next
                    .stack
                    .pop()
                    .ok_or_else(|| invalid(action, "stack is empty"))?;
                let node = ParseNode::new(label.as_str(), vec![top], rules, false)?;
                next.stack.push(Arc::new(node));
            }
            Action::Complete => {
                let open = self
                    .open_index()
                    .ok_or_else(|| invalid(action, "no open constituent"))?;
                let above: Vec<_> = next.stack.drain(open + 1..).collect();
                let node = next.stack.pop().ok_or_else(|| invalid(action, "stack is empty"))?;
                let mut children = node.children().to_vec();
                children.extend(above);
                let node = ParseNode::new(node.label(), children, rules, true)?;
                next.stack.push(Arc::new(node));
            }
        }
        next.actions.push(action.clone());
        next.score += prob.ln();
        Ok(next)
    }

    /// The finished tree of a terminal state.
    pub fn to_parse(&self) -> Option<Parse> {
        if !self.is_terminal() {
            return None;
        }
        let root = self.stack[0].as_ref().clone().with_score(self.score);
        Some(Parse::new(Arc::new(root)))
    }
}

/// Descending by score. Used with stable sorts, so ties keep discovery order.
pub(crate) fn by_score_desc(a: &ParserState, b: &ParserState) -> Ordering {
    b.score.total_cmp(&a.score)
}

/// Length of the chain of single-child constituents rooted at `node`.
fn unary_chain(node: &ParseNode) -> usize {
    match node.children() {
        [only] => 1 + unary_chain(only),
        _ => 0,
    }
}

fn invalid(action: &Action, reason: &str) -> KotobaError {
    KotobaError::InvalidAction {
        action: action.to_string(),
        reason: reason.to_string(),
    }
}
