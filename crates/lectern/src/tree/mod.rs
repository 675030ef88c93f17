//! Command tree
//!
//! Nodes live in an arena owned by [`CommandTree`] and refer to each other
//! by [`NodeId`]. Index 0 is the root. Children are keyed by [`NodeKey`] in
//! insertion order, which is also the tie-break order among argument
//! children. Redirect nodes point at another node instead of owning a
//! subtree, so aliases never duplicate a command's nodes.
//!
//! A tree is immutable once compiled; the registry publishes each version
//! behind an `Arc`.

mod compiler;
mod parse;
mod suggest;

pub use compiler::TreeCompiler;
pub use parse::{parse, Expectation, ParseOutcome, ParseResult};
pub use suggest::suggest;

use crate::descriptor::{CommandExecutor, Parameter};
use indexmap::{IndexMap, IndexSet};
use lectern_core::{Invoker, Permission};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Index of a node in its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique key of a child under its parent
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// Literal and redirect nodes, by lowercase text
    Literal(String),
    /// Argument nodes, by parameter name and type signature
    Argument {
        /// Parameter name
        name: String,
        /// Argument type signature
        signature: String,
    },
}

/// What a node matches
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The unnamed root
    Root,
    /// Exact word
    Literal {
        /// Lowercase text
        literal: String,
    },
    /// Typed parameter
    Argument {
        /// Parameter parsed at this node
        parameter: Parameter,
    },
    /// Alias label that continues at another node
    Redirect {
        /// Lowercase alias text
        literal: String,
        /// Node whose children and binding apply
        target: NodeId,
    },
}

/// Permissions under which a node is visible.
///
/// A node shared by several routes is visible to anyone holding the
/// permission of at least one of them; a route without a permission makes
/// the node public.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Everyone
    Public,
    /// Holders of any listed permission
    AnyOf(IndexSet<Permission>),
}

impl Visibility {
    /// Visibility of a node created for a route with this permission
    #[must_use]
    pub fn from_permission(permission: Option<&Permission>) -> Self {
        match permission {
            Some(permission) => Self::AnyOf(IndexSet::from([permission.clone()])),
            None => Self::Public,
        }
    }

    /// Widen to also admit holders of `permission` (or everyone)
    pub fn widen(&mut self, permission: Option<&Permission>) {
        match permission {
            None => *self = Self::Public,
            Some(permission) => {
                if let Self::AnyOf(set) = self {
                    set.insert(permission.clone());
                }
            }
        }
    }

    /// Whether the invoker may see the node
    #[must_use]
    pub fn permits(&self, invoker: &dyn Invoker) -> bool {
        match self {
            Self::Public => true,
            Self::AnyOf(set) => set.iter().any(|permission| invoker.permits(permission)),
        }
    }

    /// Permission to report when [`permits`](Self::permits) fails
    #[must_use]
    pub fn requirement(&self) -> Option<&Permission> {
        match self {
            Self::Public => None,
            Self::AnyOf(set) => set.first(),
        }
    }
}

/// Executable end of a route
#[derive(Clone)]
pub struct Binding {
    /// Root name of the owning command
    pub command: String,
    /// Route path joined with spaces
    pub route: String,
    /// Route permission, checked after the path
    pub permission: Option<Permission>,
    /// Per-invoker cooldown
    pub cooldown: Option<Duration>,
    /// Refuse non-player invokers
    pub player_only: bool,
    /// Handler
    pub executor: Arc<dyn CommandExecutor>,
    /// Usage line of the route
    pub usage: String,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("command", &self.command)
            .field("route", &self.route)
            .field("permission", &self.permission)
            .field("cooldown", &self.cooldown)
            .field("player_only", &self.player_only)
            .finish_non_exhaustive()
    }
}

/// One arena slot
#[derive(Debug, Clone)]
pub struct Node {
    /// What the node matches
    pub kind: NodeKind,
    /// Children in insertion order
    pub children: IndexMap<NodeKey, NodeId>,
    /// Who may see the node
    pub visibility: Visibility,
    /// Route executable at this node
    pub binding: Option<Arc<Binding>>,
}

impl Node {
    fn new(kind: NodeKind, visibility: Visibility) -> Self {
        Self {
            kind,
            children: IndexMap::new(),
            visibility,
            binding: None,
        }
    }

    /// The token this node accepts, for usage hints
    #[must_use]
    pub fn expected_token(&self) -> Option<ExpectedToken> {
        match &self.kind {
            NodeKind::Root => None,
            NodeKind::Literal { literal } | NodeKind::Redirect { literal, .. } => {
                Some(ExpectedToken::Literal(literal.clone()))
            }
            NodeKind::Argument { parameter } => Some(ExpectedToken::Argument {
                name: parameter.name().to_string(),
                signature: parameter.signature(),
            }),
        }
    }
}

/// A token the parser would have accepted
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpectedToken {
    /// Exact word
    Literal(String),
    /// Typed parameter
    Argument {
        /// Parameter name
        name: String,
        /// Argument type signature
        signature: String,
    },
}

impl fmt::Display for ExpectedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => f.write_str(literal),
            Self::Argument { name, signature } => write!(f, "<{name}:{signature}>"),
        }
    }
}

/// Arena of nodes rooted at [`NodeId::ROOT`]
#[derive(Debug, Clone)]
pub struct CommandTree {
    nodes: Vec<Node>,
}

impl Default for CommandTree {
    fn default() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root, Visibility::Public)],
        }
    }
}

impl CommandTree {
    /// Tree holding only the root
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Node by id.
    ///
    /// # Panics
    ///
    /// If `id` was not produced by this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Follow a redirect to the node whose children and binding apply
    #[must_use]
    pub fn resolve(&self, id: NodeId) -> NodeId {
        match self.node(id).kind {
            NodeKind::Redirect { target, .. } => target,
            _ => id,
        }
    }

    /// Child reached by a literal word (case-insensitive)
    #[must_use]
    pub fn literal_child(&self, id: NodeId, word: &str) -> Option<NodeId> {
        self.node(id)
            .children
            .get(&NodeKey::Literal(word.to_lowercase()))
            .copied()
    }

    /// Argument children in tie-break order
    pub fn argument_children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Parameter)> {
        self.node(id).children.values().filter_map(move |child| {
            match &self.node(*child).kind {
                NodeKind::Argument { parameter } => Some((*child, parameter)),
                _ => None,
            }
        })
    }

    /// Root labels, including aliases
    pub fn root_labels(&self) -> impl Iterator<Item = &str> {
        self.node(NodeId::ROOT)
            .children
            .keys()
            .filter_map(|key| match key {
                NodeKey::Literal(literal) => Some(literal.as_str()),
                NodeKey::Argument { .. } => None,
            })
    }

    /// Number of nodes, root included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}
