//! Demo command set installed by the shell.
//!
//! Every command lives under the `lectern.demo` package so one scan root
//! picks them all up.

use anyhow::Context as _;
use lectern::{ChoiceType, CommandCatalog, CommandDefinition, CommandReply, RouteDefinition};
use lectern_core::{markup, FrameworkConfig, Invoker, InvokerKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Permission to change another player's game mode
pub const GAMEMODE_OTHERS: &str = "demo.gamemode.others";
/// Permission for the `lectern` maintenance command
pub const ADMIN: &str = "demo.admin";

const WARPS: [&str; 4] = ["arena", "market", "nether", "spawn"];
const GAMEMODES: [&str; 4] = ["survival", "creative", "adventure", "spectator"];

/// All demo commands. `config` is re-read by `lectern reload`.
pub fn catalog(config: Option<PathBuf>) -> CommandCatalog {
    CommandCatalog::new()
        .with("lectern.demo.chat", hello)
        .with("lectern.demo.chat", say)
        .with("lectern.demo.world", gamemode)
        .with("lectern.demo.world", warp)
        .with("lectern.demo.admin", move || maintenance(config.clone()))
}

fn hello() -> CommandDefinition {
    CommandDefinition::new("hello")
        .alias("hi")
        .description("Greet the invoker")
        .executes(|ctx| {
            Ok(CommandReply::message(markup::render(
                "<green>Hello, <b>{name}</b>!",
                &[("name", ctx.invoker().name())],
            )))
        })
}

fn say() -> CommandDefinition {
    CommandDefinition::new("say")
        .description("Broadcast a message")
        .argument("message", "greedy")
        .executes(|ctx| {
            let message = ctx.arguments().text("message")?;
            Ok(CommandReply::message(markup::render(
                "<gray>[{name}]</gray> {message}",
                &[("name", ctx.invoker().name()), ("message", message)],
            )))
        })
}

fn gamemode() -> CommandDefinition {
    let modes = Arc::new(ChoiceType::new(GAMEMODES));
    CommandDefinition::new("gamemode")
        .alias("gm")
        .description("Change game mode")
        .argument_with("mode", modes.clone())
        .executes(|ctx| {
            if ctx.invoker().kind() != InvokerKind::Player {
                return Ok(CommandReply::failure("Name a target when running from the console."));
            }
            let mode = ctx.arguments().choice("mode")?;
            Ok(CommandReply::message(format!("Game mode set to {mode}")))
        })
        .route(
            RouteDefinition::new("")
                .permission(GAMEMODE_OTHERS)
                .argument_with("mode", modes)
                .argument("target", "player")
                .executes(|ctx| {
                    let mode = ctx.arguments().choice("mode")?;
                    let target = ctx.arguments().selector("target")?;
                    Ok(CommandReply::message(format!("Game mode of {target:?} set to {mode}")))
                }),
        )
}

fn warp() -> CommandDefinition {
    CommandDefinition::new("warp")
        .description("Travel to a named warp")
        .argument("name", "word")
        .suggests(|partial: &str, _: &dyn Invoker| {
            WARPS
                .iter()
                .filter(|warp| warp.starts_with(partial))
                .map(|warp| (*warp).to_string())
                .collect()
        })
        .executes(|ctx| {
            let name = ctx.arguments().text("name")?;
            if !WARPS.contains(&name) {
                return Ok(CommandReply::failure(format!("No warp named {name}")));
            }
            Ok(CommandReply::message(format!("Warped to {name}")))
        })
        .subcommand("list", |route| {
            route.executes(|_| Ok(CommandReply::message(format!("Warps: {}", WARPS.join(", ")))))
        })
}

fn maintenance(config: Option<PathBuf>) -> CommandDefinition {
    CommandDefinition::new("lectern")
        .permission(ADMIN)
        .description("Framework maintenance")
        .subcommand("reload", move |route| {
            route
                .cooldown(Duration::from_secs(10))
                .executes(move |_| {
                    let Some(path) = &config else {
                        return Ok(CommandReply::message("No config file to reload"));
                    };
                    let loaded = FrameworkConfig::load_from_file(path)
                        .with_context(|| format!("reloading {}", path.display()))?;
                    loaded.validate()?;
                    Ok(CommandReply::message(format!(
                        "Config at {} is valid (cache capacity {})",
                        path.display(),
                        loaded.cache.capacity
                    )))
                })
        })
        .subcommand("version", |route| {
            route.executes(|_| {
                Ok(CommandReply::message(format!(
                    "Lectern {}",
                    env!("CARGO_PKG_VERSION")
                )))
            })
        })
}
