//! Dispatcher
//!
//! Entry point for command lines. A dispatch:
//!
//! 1. normalizes the input (trim, strip one leading `/`)
//! 2. parses it against the current tree snapshot, through the cache
//! 3. checks the invoker against every node on the walked path
//! 4. checks the route permission, player-only flag and cooldown
//! 5. runs the executor, turning errors and panics into internal failures
//!
//! Parsing is invoker-independent, which is what makes cached results safe
//! to share; everything invoker-specific happens after the lookup.

use crate::cache::ResolutionCache;
use crate::cooldown::{CooldownKey, CooldownService};
use crate::descriptor::{CommandContext, CommandReply};
use crate::error::{DispatchError, PermissionDeniedError, UsageError};
use crate::feedback::FeedbackFormatter;
use crate::registry::CommandRegistry;
use crate::tree::{self, ParseOutcome, ParseResult, Visibility};
use lectern_core::{Component, Invoker, InvokerKind, Permission};
use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Strip surrounding whitespace and one leading `/`
#[must_use]
pub fn normalize(input: &str) -> &str {
    let trimmed = input.trim();
    trimmed.strip_prefix('/').unwrap_or(trimmed).trim_start()
}

/// Result of [`Dispatcher::dispatch`]: the typed outcome plus the message to
/// show the invoker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Typed outcome
    pub outcome: Result<CommandReply, DispatchError>,
    /// Rendered feedback, `None` for silent successes
    pub message: Option<Component>,
}

impl DispatchReport {
    /// Whether the executor ran and did not fail
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(&self.outcome, Ok(reply) if !reply.is_failure())
    }
}

/// Completions for a partial command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    /// Byte offset in the raw input where the completed token starts
    pub start: usize,
    /// Sorted, de-duplicated candidates
    pub candidates: Vec<String>,
}

impl Suggestions {
    /// Whether there is nothing to offer
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Tunables of a dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Enforce declared cooldowns
    pub cooldowns_enabled: bool,
    /// Maximum suggestion candidates
    pub suggestion_limit: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            cooldowns_enabled: true,
            suggestion_limit: 50,
        }
    }
}

/// Dispatches command lines against a registry
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    cache: Arc<ResolutionCache>,
    cooldowns: Arc<CooldownService>,
    formatter: Arc<FeedbackFormatter>,
    settings: DispatchSettings,
}

fn first_denied<'a>(
    mut visibilities: impl Iterator<Item = &'a Visibility>,
    invoker: &dyn Invoker,
) -> Option<Permission> {
    visibilities
        .find(|visibility| !visibility.permits(invoker))
        .and_then(|visibility| visibility.requirement().cloned())
}

impl Dispatcher {
    /// Dispatcher over shared services
    #[must_use]
    pub fn new(
        registry: Arc<CommandRegistry>,
        cache: Arc<ResolutionCache>,
        cooldowns: Arc<CooldownService>,
        formatter: Arc<FeedbackFormatter>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            registry,
            cache,
            cooldowns,
            formatter,
            settings,
        }
    }

    /// Dispatcher with default cache, cooldowns and messages
    #[must_use]
    pub fn with_registry(registry: Arc<CommandRegistry>) -> Self {
        Self::new(
            registry,
            Arc::new(ResolutionCache::default()),
            Arc::new(CooldownService::default()),
            Arc::new(FeedbackFormatter::default()),
            DispatchSettings::default(),
        )
    }

    /// Registry commands are resolved against
    #[must_use]
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Shared resolution cache
    #[must_use]
    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Shared cooldown service
    #[must_use]
    pub fn cooldowns(&self) -> &Arc<CooldownService> {
        &self.cooldowns
    }

    /// Parse through the cache against the current snapshot
    pub fn resolve(&self, input: &str) -> Arc<ParseResult> {
        let signature = normalize(input);
        let snapshot = self.registry.snapshot();

        if let Some(hit) = self.cache.get(signature, snapshot.version) {
            debug!(input = signature, version = snapshot.version, cache_hit = true, "Resolved command");
            return hit;
        }
        let result = Arc::new(tree::parse(&snapshot.tree, signature));
        self.cache
            .put(signature, snapshot.version, Arc::clone(&result));
        debug!(
            input = signature,
            version = snapshot.version,
            cache_hit = false,
            resolved = result.is_resolved(),
            "Resolved command"
        );
        result
    }

    /// Run a command line and return the typed outcome
    pub fn execute(
        &self,
        input: &str,
        invoker: &dyn Invoker,
    ) -> Result<CommandReply, DispatchError> {
        let parsed = self.resolve(input);

        if let Some(permission) = first_denied(parsed.requirements.iter(), invoker) {
            debug!(invoker = %invoker.name(), permission = %permission, "Denied path");
            return Err(PermissionDeniedError { permission }.into());
        }

        let (binding, arguments, label) = match &parsed.outcome {
            ParseOutcome::Resolved {
                binding,
                arguments,
                label,
            } => (binding, arguments, label),
            ParseOutcome::Partial {
                cursor,
                kind,
                expected,
                failure,
            } => {
                let visible: BTreeSet<_> = expected
                    .iter()
                    .filter(|expectation| expectation.visibility.permits(invoker))
                    .map(|expectation| expectation.token.clone())
                    .collect();
                return Err(UsageError {
                    input: parsed.input.clone(),
                    cursor: *cursor,
                    kind: *kind,
                    expected: visible.into_iter().collect(),
                    failure: failure.clone(),
                }
                .into());
            }
        };

        if let Some(permission) = &binding.permission {
            if !invoker.permits(permission) {
                return Err(PermissionDeniedError {
                    permission: permission.clone(),
                }
                .into());
            }
        }

        if binding.player_only && invoker.kind() != InvokerKind::Player {
            return Err(DispatchError::PlayersOnly {
                command: binding.command.clone(),
            });
        }

        if let (true, Some(cooldown)) = (self.settings.cooldowns_enabled, binding.cooldown) {
            let key = CooldownKey::new(invoker.id(), &binding.command, &binding.route);
            if let Err(remaining) = self.cooldowns.try_acquire(key, cooldown) {
                return Err(DispatchError::CooldownActive {
                    command: binding.command.clone(),
                    remaining,
                });
            }
        }

        let context = CommandContext {
            invoker,
            label,
            command: &binding.command,
            route: &binding.route,
            arguments,
            input: &parsed.input,
        };
        match catch_unwind(AssertUnwindSafe(|| binding.executor.execute(&context))) {
            Ok(Ok(reply)) => {
                debug!(command = %binding.command, route = %binding.route, invoker = %invoker.name(), "Executed command");
                Ok(reply)
            }
            Ok(Err(err)) => {
                warn!(command = %binding.command, route = %binding.route, error = %err, "Command failed");
                Err(DispatchError::internal(&binding.command, format!("{err:#}")))
            }
            Err(_) => {
                error!(command = %binding.command, route = %binding.route, "Command panicked");
                Err(DispatchError::internal(&binding.command, "executor panicked"))
            }
        }
    }

    /// Run a command line and render the outcome for the invoker
    pub fn dispatch(&self, input: &str, invoker: &dyn Invoker) -> DispatchReport {
        let outcome = self.execute(input, invoker);
        let message = self.formatter.format(&outcome, invoker.locale());
        DispatchReport { outcome, message }
    }

    /// Completions for the token under the end of `input`.
    ///
    /// Nodes the invoker cannot see contribute nothing, and walking through
    /// one ends the walk.
    pub fn suggest(&self, input: &str, invoker: &dyn Invoker) -> Suggestions {
        let leading = input.len() - input.trim_start().len();
        let rest = &input[leading..];
        let stripped = rest.strip_prefix('/').unwrap_or(rest);
        let offset = input.len() - stripped.len();

        let snapshot = self.registry.snapshot();
        let (start, raw) = tree::suggest(&snapshot.tree, stripped, invoker);
        let candidates: Vec<String> = raw
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .take(self.settings.suggestion_limit)
            .collect();

        Suggestions {
            start: offset + start,
            candidates,
        }
    }
}
