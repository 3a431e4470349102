//! Features of a parser state for the build/complete classifier.

use super::state::ParserState;
use crate::headrules::HeadRules;
use crate::tree::ParseNode;

const STACK_WINDOW: usize = 3;
const BUFFER_WINDOW: usize = 2;
const MAX_ARITY: usize = 5;

/// Builds classifier features from the top of the stack, the next buffer
/// items, the innermost open constituent and the last actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserContextGenerator;

impl ParserContextGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn context(&self, state: &ParserState, rules: &HeadRules) -> Vec<String> {
        let mut features = Vec::with_capacity(32);

        let stack: Vec<Option<&ParseNode>> =
            (0..STACK_WINDOW).map(|depth| state.stack_item(depth)).collect();
        for (i, node) in stack.iter().enumerate() {
            match node {
                Some(node) => {
                    features.push(format!("s{i}={}", key(node)));
                    features.push(format!("s{i}w={}", node.head_word()));
                    features.push(format!("s{i}t={}", node.head_tag()));
                }
                None => features.push(format!("s{i}=bos")),
            }
        }

        let remaining = state.remaining();
        for i in 0..BUFFER_WINDOW {
            match remaining.get(i) {
                Some(node) => {
                    features.push(format!("b{i}={}", node.label()));
                    features.push(format!("b{i}w={}", node.head_word()));
                }
                None => features.push(format!("b{i}=eos")),
            }
        }
        if remaining
            .first()
            .is_some_and(|node| rules.is_punctuation(node.label()))
        {
            features.push("b0punct".to_string());
        }

        let open = match state.open_index() {
            Some(idx) => {
                let node = &state.stack()[idx];
                let arity = node.children().len() + state.stack().len() - idx - 1;
                features.push(format!("oa={}", arity.min(MAX_ARITY)));
                node.label()
            }
            None => "none",
        };
        features.push(format!("o={open}"));

        let s0 = stack[0].map_or_else(|| "bos".to_string(), key);
        let s1 = stack[1].map_or_else(|| "bos".to_string(), key);
        let b0 = remaining.first().map_or("eos", |n| n.label());
        let s0w = stack[0].map_or("bos", |n| n.head_word());
        let b0w = remaining.first().map_or("eos", |n| n.head_word());
        features.push(format!("s1,s0={s1},{s0}"));
        features.push(format!("s0,b0={s0},{b0}"));
        features.push(format!("o,s0={open},{s0}"));
        features.push(format!("s1,s0,b0={s1},{s0},{b0}"));
        features.push(format!("s0w,b0w={s0w},{b0w}"));

        let actions = state.actions();
        let a_1 = actions.last().map_or_else(|| "bos".to_string(), ToString::to_string);
        let a_2 = actions
            .len()
            .checked_sub(2)
            .map_or_else(|| "bos".to_string(), |i| actions[i].to_string());
        features.push(format!("a_1={a_1}"));
        features.push(format!("a_2,a_1={a_2},{a_1}"));
        features.push(format!("a_1,s0={a_1},{s0}"));

        features
    }
}

/// Label with a `*` marking a constituent that is still open.
fn key(node: &ParseNode) -> String {
    if node.is_complete() {
        node.label().to_string()
    } else {
        format!("{}*", node.label())
    }
}
