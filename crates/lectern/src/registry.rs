//! Command registry
//!
//! Owns every registered [`CommandDescriptor`] and the tree compiled from
//! them. Each successful mutation recompiles the tree, publishes it as a new
//! [`TreeSnapshot`] and bumps the version; readers holding an older snapshot
//! keep a consistent view.

use crate::descriptor::CommandDescriptor;
use crate::error::{DuplicateCommandError, RegistryError};
use crate::tree::{CommandTree, TreeCompiler};
use indexmap::IndexMap;
use lectern_core::DuplicatePolicy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Compiled tree plus the version it belongs to
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    /// Immutable tree
    pub tree: Arc<CommandTree>,
    /// Registry version when the tree was published
    pub version: u64,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Root name -> descriptor, in registration order
    commands: IndexMap<String, Arc<CommandDescriptor>>,
    /// Root name or alias -> root name
    labels: HashMap<String, String>,
    tree: Arc<CommandTree>,
    version: u64,
}

impl RegistryState {
    fn owners_of(&self, descriptor: &CommandDescriptor) -> Vec<(String, String)> {
        descriptor
            .labels()
            .filter_map(|label| {
                self.labels
                    .get(label)
                    .map(|owner| (label.to_string(), owner.clone()))
            })
            .collect()
    }

    /// Rebuild labels and tree for a new command list, then commit
    fn commit(
        &mut self,
        commands: IndexMap<String, Arc<CommandDescriptor>>,
    ) -> Result<u64, RegistryError> {
        let tree = TreeCompiler::compile(commands.values().map(|descriptor| &**descriptor))?;
        let labels = commands
            .values()
            .flat_map(|descriptor| {
                descriptor
                    .labels()
                    .map(|label| (label.to_string(), descriptor.name().to_string()))
                    .collect::<Vec<_>>()
            })
            .collect();

        self.commands = commands;
        self.labels = labels;
        self.tree = Arc::new(tree);
        self.version += 1;
        Ok(self.version)
    }
}

/// Registered commands and their compiled tree.
///
/// Single writer, many readers: mutations take the write lock for the whole
/// recompile, lookups and snapshots take the read lock briefly. The current
/// version is mirrored in an atomic so it can be read without locking.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    state: RwLock<RegistryState>,
    version: AtomicU64,
    policy: DuplicatePolicy,
}

impl CommandRegistry {
    /// Empty registry rejecting duplicates
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry with an explicit duplicate policy
    #[must_use]
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Configured duplicate policy
    #[must_use]
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Register under the configured policy, returning the new version
    pub fn register(&self, descriptor: CommandDescriptor) -> Result<u64, RegistryError> {
        self.insert(descriptor, self.policy)
    }

    /// Register, replacing every command that owns a colliding label
    pub fn register_overriding(&self, descriptor: CommandDescriptor) -> Result<u64, RegistryError> {
        self.insert(descriptor, DuplicatePolicy::Replace)
    }

    fn insert(
        &self,
        descriptor: CommandDescriptor,
        policy: DuplicatePolicy,
    ) -> Result<u64, RegistryError> {
        let mut state = self.state.write();
        let owners = state.owners_of(&descriptor);

        if let (DuplicatePolicy::Reject, Some((label, existing))) = (policy, owners.first()) {
            debug!(command = %descriptor.name(), label = %label, existing = %existing, "Rejected duplicate command");
            return Err(DuplicateCommandError {
                label: label.clone(),
                existing: existing.clone(),
            }
            .into());
        }

        let mut commands = state.commands.clone();
        for (_, owner) in &owners {
            if commands.shift_remove(owner).is_some() {
                info!(command = %owner, replaced_by = %descriptor.name(), "Replaced command");
            }
        }
        let name = descriptor.name().to_string();
        let routes = descriptor.routes().len();
        commands.insert(name.clone(), Arc::new(descriptor));

        let version = state.commit(commands)?;
        self.version.store(version, Ordering::Release);
        info!(command = %name, routes, version, "Registered command");
        Ok(version)
    }

    /// Remove the command owning `label` (root name or alias) with all its
    /// labels
    pub fn unregister(&self, label: &str) -> Result<Arc<CommandDescriptor>, RegistryError> {
        let label = label.trim().to_lowercase();
        let mut state = self.state.write();
        let Some(owner) = state.labels.get(&label).cloned() else {
            return Err(RegistryError::UnknownCommand { label });
        };

        let mut commands = state.commands.clone();
        let removed = commands
            .shift_remove(&owner)
            .ok_or_else(|| RegistryError::UnknownCommand {
                label: label.clone(),
            })?;

        let version = state.commit(commands)?;
        self.version.store(version, Ordering::Release);
        info!(command = %owner, version, "Unregistered command");
        Ok(removed)
    }

    /// Current tree and version
    #[must_use]
    pub fn snapshot(&self) -> TreeSnapshot {
        let state = self.state.read();
        TreeSnapshot {
            tree: Arc::clone(&state.tree),
            version: state.version,
        }
    }

    /// Current version without locking
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Descriptor owning `label`
    #[must_use]
    pub fn resolve(&self, label: &str) -> Option<Arc<CommandDescriptor>> {
        let state = self.state.read();
        let owner = state.labels.get(&label.trim().to_lowercase())?;
        state.commands.get(owner).cloned()
    }

    /// Whether any command owns `label`
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.resolve(label).is_some()
    }

    /// Descriptors in registration order
    #[must_use]
    pub fn commands(&self) -> Vec<Arc<CommandDescriptor>> {
        self.state.read().commands.values().cloned().collect()
    }

    /// Number of registered commands
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().commands.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
