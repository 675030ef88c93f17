//! Input parsing against a tree.
//!
//! The walk is greedy and never backtracks: at each node a literal child
//! matching the next word wins, otherwise argument children are tried in
//! registration order and the first that parses cleanly wins.

use super::{Binding, CommandTree, ExpectedToken, NodeId, Visibility};
use crate::arguments::InputReader;
use crate::error::UsageKind;
use lectern_core::{ArgumentError, ArgumentValue, Arguments};
use std::sync::Arc;

/// Candidate next token together with who may see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    /// The token
    pub token: ExpectedToken,
    /// Visibility of the node that would accept it
    pub visibility: Visibility,
}

/// How far the input got
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    /// The input ended on an executable node
    Resolved {
        /// Route bound at that node
        binding: Arc<Binding>,
        /// Parsed parameters in declaration order
        arguments: Arguments,
        /// Root label as written (lowercase)
        label: String,
    },
    /// The input could not be matched completely
    Partial {
        /// Byte offset where matching stopped
        cursor: usize,
        /// Failure class
        kind: UsageKind,
        /// Tokens accepted at `cursor`, unfiltered
        expected: Vec<Expectation>,
        /// First argument failure at `cursor`
        failure: Option<ArgumentError>,
    },
}

/// Invoker-independent result of one parse.
///
/// Safe to cache per tree version: permission filtering happens afterwards
/// using `requirements` and the visibilities in `expected`.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Normalized input that was parsed
    pub input: String,
    /// Outcome
    pub outcome: ParseOutcome,
    /// Visibility of every node walked, in order
    pub requirements: Vec<Visibility>,
}

impl ParseResult {
    /// Whether an executable node was reached
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self.outcome, ParseOutcome::Resolved { .. })
    }

    /// Approximate memory cost, used by the resolution cache
    #[must_use]
    pub fn weight(&self) -> usize {
        const SLOT: usize = 32;
        let outcome = match &self.outcome {
            ParseOutcome::Resolved {
                arguments, label, ..
            } => label.len() + arguments.len() * SLOT,
            ParseOutcome::Partial { expected, .. } => expected.len() * SLOT,
        };
        self.input.len() + outcome + self.requirements.len() * SLOT
    }
}

/// Result of trying to advance one token from a node
pub(crate) enum Step {
    /// Matched a child (literal, redirect or argument)
    Matched {
        child: NodeId,
        value: Option<ArgumentValue>,
    },
    /// Nothing matched; cursor is back at the token start
    NoMatch { failure: Option<ArgumentError> },
}

/// Advance one token from `node` (already redirect-resolved)
pub(crate) fn step(tree: &CommandTree, node: NodeId, reader: &mut InputReader<'_>) -> Step {
    let start = reader.cursor();

    let word = reader.peek_unquoted();
    if let Some(child) = tree.literal_child(node, word) {
        reader.set_cursor(start + word.len());
        return Step::Matched { child, value: None };
    }

    let mut failure = None;
    for (child, parameter) in tree.argument_children(node) {
        reader.set_cursor(start);
        match parameter.argument().parse(reader) {
            Ok(value) if reader.at_boundary() => {
                return Step::Matched {
                    child,
                    value: Some(value),
                };
            }
            Ok(_) => {
                let consumed = &reader.input()[start..reader.cursor()];
                let trailing = reader.peek_unquoted();
                failure.get_or_insert_with(|| {
                    ArgumentError::new(
                        parameter.argument().tag(),
                        format!("{consumed}{trailing}"),
                        "expected whitespace to end the argument",
                    )
                });
            }
            Err(err) => {
                failure.get_or_insert(err);
            }
        }
    }
    reader.set_cursor(start);
    Step::NoMatch { failure }
}

fn expectations(tree: &CommandTree, node: NodeId) -> Vec<Expectation> {
    tree.node(node)
        .children
        .values()
        .filter_map(|child| {
            let child = tree.node(*child);
            child.expected_token().map(|token| Expectation {
                token,
                visibility: child.visibility.clone(),
            })
        })
        .collect()
}

/// Parse normalized input
#[must_use]
pub fn parse(tree: &CommandTree, input: &str) -> ParseResult {
    let mut reader = InputReader::new(input);
    let mut arguments = Arguments::new();
    let mut requirements = Vec::new();
    let mut label = String::new();
    let mut current = NodeId::ROOT;

    let outcome = loop {
        let node = tree.resolve(current);
        reader.skip_whitespace();

        if !reader.can_read() {
            if let Some(binding) = &tree.node(node).binding {
                break ParseOutcome::Resolved {
                    binding: Arc::clone(binding),
                    arguments,
                    label,
                };
            }
            let kind = if current == NodeId::ROOT {
                UsageKind::UnknownCommand
            } else {
                UsageKind::Incomplete
            };
            break ParseOutcome::Partial {
                cursor: reader.cursor(),
                kind,
                expected: expectations(tree, node),
                failure: None,
            };
        }

        let start = reader.cursor();
        match step(tree, node, &mut reader) {
            Step::Matched { child, value } => {
                if current == NodeId::ROOT {
                    label = reader.input()[start..reader.cursor()].to_lowercase();
                }
                if let (Some(value), super::NodeKind::Argument { parameter }) =
                    (value, &tree.node(child).kind)
                {
                    arguments.insert(parameter.name(), value);
                }
                requirements.push(tree.node(child).visibility.clone());
                current = child;
            }
            Step::NoMatch { failure } => {
                let kind = if current == NodeId::ROOT {
                    UsageKind::UnknownCommand
                } else if failure.is_some() {
                    UsageKind::InvalidToken
                } else if tree.node(node).binding.is_some() {
                    UsageKind::TrailingInput
                } else {
                    UsageKind::InvalidToken
                };
                break ParseOutcome::Partial {
                    cursor: start,
                    kind,
                    expected: expectations(tree, node),
                    failure,
                };
            }
        }
    };

    ParseResult {
        input: input.to_string(),
        outcome,
        requirements,
    }
}
