//! Ready-made command definitions and frameworks.

use crate::{ManualClock, RecordingExecutor};
use lectern::{ChoiceType, CommandDefinition, CommandFramework};
use lectern_core::FrameworkConfig;
use std::sync::Arc;
use std::time::Duration;

/// Permission guarding [`admin_command`]
pub const ADMIN_PERMISSION: &str = "lectern.admin";
/// Permission guarding `admin player set`
pub const ADMIN_SET_PERMISSION: &str = "lectern.admin.set";
/// Cooldown on `admin reload`
pub const RELOAD_COOLDOWN: Duration = Duration::from_secs(10);

/// Framework with default configuration and a manual clock
pub fn framework() -> (CommandFramework, Arc<ManualClock>) {
    framework_with(FrameworkConfig::default())
}

/// Framework with `config` and a manual clock
pub fn framework_with(config: FrameworkConfig) -> (CommandFramework, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let framework = CommandFramework::with_clock(config, clock.clone()).unwrap();
    (framework, clock)
}

/// `tp <x:integer>` aliased as `teleport`
pub fn tp_command(recorder: &RecordingExecutor) -> CommandDefinition {
    CommandDefinition::new("tp")
        .alias("teleport")
        .description("Teleport along the x axis")
        .argument("x", "integer")
        .executes_with(recorder.executor())
}

/// `admin` tree:
///
/// - `admin` (requires [`ADMIN_PERMISSION`])
/// - `admin player set <target:player> <mode:choice(survival|creative)>`
///   (requires [`ADMIN_SET_PERMISSION`])
/// - `admin player get <target:player>`
/// - `admin reload` with [`RELOAD_COOLDOWN`]
pub fn admin_command(recorder: &RecordingExecutor) -> CommandDefinition {
    CommandDefinition::new("admin")
        .permission(ADMIN_PERMISSION)
        .subcommand("player set", |route| {
            route
                .permission(ADMIN_SET_PERMISSION)
                .argument("target", "player")
                .argument_with("mode", Arc::new(ChoiceType::new(["survival", "creative"])))
                .executes_with(recorder.executor())
        })
        .subcommand("player get", |route| {
            route
                .argument("target", "player")
                .executes_with(recorder.executor())
        })
        .subcommand("reload", |route| {
            route
                .cooldown(RELOAD_COOLDOWN)
                .executes_with(recorder.executor())
        })
}

/// `say <message:greedy>`
pub fn say_command(recorder: &RecordingExecutor) -> CommandDefinition {
    CommandDefinition::new("say")
        .argument("message", "greedy")
        .executes_with(recorder.executor())
}
