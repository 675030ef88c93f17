//! Executors that record their calls.

use lectern::{CommandContext, CommandExecutor, CommandReply};
use lectern_core::Arguments;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Invoker id
    pub invoker: Uuid,
    /// Root label as typed
    pub label: String,
    /// Root name of the command
    pub command: String,
    /// Route path
    pub route: String,
    /// Parsed arguments
    pub arguments: Arguments,
}

/// Executor that records every call and answers with a fixed reply.
///
/// Clones share the same record.
#[derive(Debug, Clone)]
pub struct RecordingExecutor {
    calls: Arc<Mutex<Vec<Invocation>>>,
    reply: CommandReply,
}

impl RecordingExecutor {
    /// Recorder replying [`CommandReply::Silent`]
    #[must_use]
    pub fn new() -> Self {
        Self::replying(CommandReply::Silent)
    }

    /// Recorder replying `reply`
    #[must_use]
    pub fn replying(reply: CommandReply) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reply,
        }
    }

    /// Shared handle usable in definitions
    #[must_use]
    pub fn executor(&self) -> Arc<dyn CommandExecutor> {
        Arc::new(self.clone())
    }

    /// Every call so far
    #[must_use]
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    /// Number of calls
    #[must_use]
    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Most recent call
    #[must_use]
    pub fn last(&self) -> Option<Invocation> {
        self.calls.lock().last().cloned()
    }
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, context: &CommandContext<'_>) -> anyhow::Result<CommandReply> {
        self.calls.lock().push(Invocation {
            invoker: context.invoker().id(),
            label: context.label().to_string(),
            command: context.command().to_string(),
            route: context.route().to_string(),
            arguments: context.arguments().clone(),
        });
        Ok(self.reply.clone())
    }
}
