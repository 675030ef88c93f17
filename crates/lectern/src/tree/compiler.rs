//! Descriptor to tree compilation.

use super::{Binding, CommandTree, Node, NodeId, NodeKey, NodeKind, Visibility};
use crate::descriptor::CommandDescriptor;
use crate::error::MalformedCommandError;
use lectern_core::Permission;
use std::sync::Arc;
use tracing::trace;

/// Builds a [`CommandTree`] from descriptors, one at a time.
///
/// Every descriptor gets a literal under the root; each route extends it
/// with literal segments and then one argument node per parameter. Nodes
/// with the same key under the same parent are shared. Aliases become
/// redirect nodes onto the root literal.
#[derive(Debug, Default)]
pub struct TreeCompiler {
    tree: CommandTree,
}

impl TreeCompiler {
    /// Compiler over an empty tree
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a whole command list in order
    pub fn compile<'a, I>(descriptors: I) -> Result<CommandTree, MalformedCommandError>
    where
        I: IntoIterator<Item = &'a CommandDescriptor>,
    {
        let mut compiler = Self::new();
        for descriptor in descriptors {
            compiler.add(descriptor)?;
        }
        Ok(compiler.finish())
    }

    /// Add one descriptor.
    ///
    /// On error the compiler may hold a partially added command and should
    /// be discarded.
    pub fn add(&mut self, descriptor: &CommandDescriptor) -> Result<(), MalformedCommandError> {
        let name = descriptor.name();
        let root_visibility = Visibility::from_permission(descriptor.permission());

        let root_literal = self.attach_new(
            NodeId::ROOT,
            NodeKey::Literal(name.to_string()),
            NodeKind::Literal {
                literal: name.to_string(),
            },
            root_visibility.clone(),
            name,
        )?;

        for route in descriptor.routes() {
            let permission = route.permission();
            let mut node = root_literal;

            for segment in route.path() {
                node = self.descend(
                    node,
                    NodeKey::Literal(segment.clone()),
                    || NodeKind::Literal {
                        literal: segment.clone(),
                    },
                    permission,
                );
            }
            for parameter in route.parameters() {
                node = self.descend(
                    node,
                    NodeKey::Argument {
                        name: parameter.name().to_string(),
                        signature: parameter.signature(),
                    },
                    || NodeKind::Argument {
                        parameter: parameter.clone(),
                    },
                    permission,
                );
            }

            let usage = route.usage(name);
            let slot = self.tree.node_mut(node);
            if let Some(existing) = &slot.binding {
                return Err(MalformedCommandError::new(
                    name,
                    format!(
                        "'{usage}' is executable by both route '{}' and route '{}'",
                        existing.route,
                        route.path_string()
                    ),
                ));
            }
            slot.binding = Some(Arc::new(Binding {
                command: name.to_string(),
                route: route.path_string(),
                permission: route.permission().cloned(),
                cooldown: route.cooldown(),
                player_only: descriptor.is_player_only(),
                executor: Arc::clone(route.executor()),
                usage,
            }));
        }

        for alias in descriptor.aliases() {
            self.attach_new(
                NodeId::ROOT,
                NodeKey::Literal(alias.clone()),
                NodeKind::Redirect {
                    literal: alias.clone(),
                    target: root_literal,
                },
                root_visibility.clone(),
                name,
            )?;
        }

        trace!(command = %name, nodes = self.tree.len(), "Compiled command");
        Ok(())
    }

    /// Finished tree
    #[must_use]
    pub fn finish(self) -> CommandTree {
        self.tree
    }

    /// Insert a child that must not exist yet
    fn attach_new(
        &mut self,
        parent: NodeId,
        key: NodeKey,
        kind: NodeKind,
        visibility: Visibility,
        command: &str,
    ) -> Result<NodeId, MalformedCommandError> {
        if self.tree.node(parent).children.contains_key(&key) {
            let label = match &key {
                NodeKey::Literal(literal) => literal.clone(),
                NodeKey::Argument { name, .. } => name.clone(),
            };
            return Err(MalformedCommandError::new(
                command,
                format!("label '{label}' is already in the tree"),
            ));
        }
        let id = self.tree.push(Node::new(kind, visibility));
        self.tree.node_mut(parent).children.insert(key, id);
        Ok(id)
    }

    /// Shared child for `key`, created on first use
    fn descend(
        &mut self,
        parent: NodeId,
        key: NodeKey,
        kind: impl FnOnce() -> NodeKind,
        permission: Option<&Permission>,
    ) -> NodeId {
        if let Some(&existing) = self.tree.node(parent).children.get(&key) {
            self.tree.node_mut(existing).visibility.widen(permission);
            return existing;
        }
        let id = self
            .tree
            .push(Node::new(kind(), Visibility::from_permission(permission)));
        self.tree.node_mut(parent).children.insert(key, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::{ArgumentTypeRegistry, IntegerType};
    use crate::descriptor::{CommandContext, CommandDefinition, CommandReply};

    fn ok(_: &CommandContext<'_>) -> anyhow::Result<CommandReply> {
        Ok(CommandReply::Silent)
    }

    fn descriptor(definition: CommandDefinition) -> CommandDescriptor {
        CommandDescriptor::from_definition(definition, &ArgumentTypeRegistry::with_builtins())
            .unwrap()
    }

    #[test]
    fn test_alias_redirects_to_root_literal() {
        let tp = descriptor(
            CommandDefinition::new("tp")
                .alias("teleport")
                .argument("x", "integer")
                .executes(ok),
        );
        let tree = TreeCompiler::compile([&tp]).unwrap();

        let tp_node = tree.literal_child(NodeId::ROOT, "tp").unwrap();
        let alias = tree.literal_child(NodeId::ROOT, "TELEPORT").unwrap();
        assert_eq!(tree.resolve(alias), tp_node);
        // root + tp + teleport + <x>
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root_labels().collect::<Vec<_>>(), vec!["tp", "teleport"]);
    }

    #[test]
    fn test_routes_share_prefixes_and_widen_visibility() {
        let admin = descriptor(
            CommandDefinition::new("admin")
                .subcommand("player set", |route| {
                    route
                        .permission("admin.set")
                        .argument("target", "player")
                        .executes(ok)
                })
                .subcommand("player get", |route| {
                    route
                        .permission("admin.get")
                        .argument("target", "player")
                        .executes(ok)
                }),
        );
        let tree = TreeCompiler::compile([&admin]).unwrap();

        let root = tree.literal_child(NodeId::ROOT, "admin").unwrap();
        let player = tree.literal_child(root, "player").unwrap();
        assert_eq!(tree.node(player).children.len(), 2);
        match &tree.node(player).visibility {
            Visibility::AnyOf(set) => assert_eq!(set.len(), 2),
            Visibility::Public => panic!("shared node should stay restricted"),
        }
        let set = tree.literal_child(player, "set").unwrap();
        assert_eq!(
            tree.node(set).visibility.requirement().map(Permission::as_str),
            Some("admin.set")
        );
    }

    #[test]
    fn test_argument_overloads_diverge_by_signature() {
        let give = descriptor(
            CommandDefinition::new("give")
                .subcommand("item", |route| route.argument("amount", "integer").executes(ok))
                .subcommand("xp", |route| {
                    route
                        .argument_with("amount", Arc::new(IntegerType::bounded(0, 100)))
                        .executes(ok)
                }),
        );
        let tree = TreeCompiler::compile([&give]).unwrap();
        let root = tree.literal_child(NodeId::ROOT, "give").unwrap();
        let item = tree.literal_child(root, "item").unwrap();
        let xp = tree.literal_child(root, "xp").unwrap();
        assert_eq!(tree.argument_children(item).count(), 1);
        assert_eq!(
            tree.argument_children(xp).next().map(|(_, p)| p.signature()),
            Some("integer(0..=100)".to_string())
        );
    }

    #[test]
    fn test_label_collision_is_malformed() {
        let a = descriptor(CommandDefinition::new("a").alias("b").executes(ok));
        let b = descriptor(CommandDefinition::new("b").executes(ok));
        let err = TreeCompiler::compile([&a, &b]).unwrap_err();
        assert_eq!(err.command, "b");
    }
}
