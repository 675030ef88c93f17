//! Completion walk.

use super::parse::{step, Step};
use super::{CommandTree, NodeId, NodeKind};
use crate::arguments::{matches_prefix, InputReader};
use lectern_core::Invoker;

/// Completions for the last token of `input`.
///
/// Returns the byte offset where the completed token starts together with
/// raw candidates (unsorted, possibly repeated). Walking into a node the
/// invoker cannot see yields no candidates.
#[must_use]
pub fn suggest(tree: &CommandTree, input: &str, invoker: &dyn Invoker) -> (usize, Vec<String>) {
    let mut reader = InputReader::new(input);
    let mut current = NodeId::ROOT;

    loop {
        let node = tree.resolve(current);
        let start = reader.cursor();
        let rest = reader.remaining();

        if !rest.contains(char::is_whitespace) {
            return (start, candidates(tree, node, rest, invoker));
        }

        match step(tree, node, &mut reader) {
            Step::Matched { child, .. } => {
                if !tree.node(child).visibility.permits(invoker) {
                    return (start, Vec::new());
                }
                if !reader.can_read() {
                    // a greedy argument swallowed the rest of the line
                    return (start, candidates_of(tree, child, rest, invoker));
                }
                reader.skip_whitespace();
                current = child;
            }
            Step::NoMatch { .. } => return (start, Vec::new()),
        }
    }
}

fn candidates(tree: &CommandTree, node: NodeId, partial: &str, invoker: &dyn Invoker) -> Vec<String> {
    tree.node(node)
        .children
        .values()
        .flat_map(|child| candidates_of(tree, *child, partial, invoker))
        .collect()
}

fn candidates_of(tree: &CommandTree, child: NodeId, partial: &str, invoker: &dyn Invoker) -> Vec<String> {
    let node = tree.node(child);
    if !node.visibility.permits(invoker) {
        return Vec::new();
    }
    match &node.kind {
        NodeKind::Root => Vec::new(),
        NodeKind::Literal { literal } | NodeKind::Redirect { literal, .. } => {
            if matches_prefix(literal, partial) {
                vec![literal.clone()]
            } else {
                Vec::new()
            }
        }
        NodeKind::Argument { parameter } => parameter
            .suggest(partial, invoker)
            .into_iter()
            .filter(|candidate| matches_prefix(candidate, partial))
            .collect(),
    }
}
