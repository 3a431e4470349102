//! Oracle traces: the action sequence that rebuilds a gold tree.

use std::sync::Arc;

use super::action::Action;
use super::config::BeamConfig;
use super::context::ParserContextGenerator;
use super::state::ParserState;
use crate::classifier::Event;
use crate::error::{KotobaError, Result};
use crate::headrules::HeadRules;
use crate::tree::{Parse, ParseNode};

/// The initial buffer of a gold tree: its chunks and the words outside them.
pub fn gold_buffer(parse: &Parse) -> Vec<Arc<ParseNode>> {
    fn collect(node: &ParseNode, out: &mut Vec<Arc<ParseNode>>) {
        for child in node.children() {
            if child.is_leaf() || child.is_chunk() {
                out.push(Arc::clone(child));
            } else {
                collect(child, out);
            }
        }
    }
    let mut buffer = Vec::new();
    collect(parse.root(), &mut buffer);
    buffer
}

/// Actions that rebuild `parse` from [`gold_buffer`].
///
/// Each constituent above chunk level yields the trace of its first child,
/// `BUILD`, the traces of the remaining children and `COMPLETE`.
pub fn oracle_actions(parse: &Parse) -> Vec<Action> {
    fn visit(node: &ParseNode, is_root: bool, out: &mut Vec<Action>) {
        if !is_root && (node.is_leaf() || node.is_chunk()) {
            out.push(Action::Shift);
            return;
        }
        let mut children = node.children().iter();
        if let Some(first) = children.next() {
            visit(first, false, out);
        }
        out.push(Action::Build(node.label().to_string()));
        for child in children {
            visit(child, false, out);
        }
        out.push(Action::Complete);
    }
    let mut actions = Vec::new();
    visit(parse.root(), true, &mut actions);
    actions
}

/// Replay the oracle trace of `parse` and record one training event per action.
///
/// # Errors
///
/// `KotobaError::OracleMismatch` if a gold action is not admissible or the
/// replay does not rebuild the gold bracketing.
pub fn oracle_events(
    parse: &Parse,
    rules: &HeadRules,
    generator: &ParserContextGenerator,
    config: &BeamConfig,
) -> Result<Vec<Event>> {
    let actions = oracle_actions(parse);
    let mut state = ParserState::new(gold_buffer(parse));
    let mut events = Vec::with_capacity(actions.len());

    for action in actions {
        if !state.is_admissible(&action, config) {
            return Err(KotobaError::OracleMismatch(format!(
                "{action} not admissible after {} actions",
                state.actions().len()
            )));
        }
        events.push(Event::new(action.to_string(), generator.context(&state, rules)));
        state = state.apply(&action, 1.0, rules)?;
    }

    let rebuilt = state
        .to_parse()
        .ok_or_else(|| KotobaError::OracleMismatch("replay did not terminate".to_string()))?;
    if rebuilt.to_string() != parse.to_string() {
        return Err(KotobaError::OracleMismatch(format!(
            "replay built {rebuilt} instead of {parse}"
        )));
    }
    Ok(events)
}
