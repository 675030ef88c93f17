//! Interactive shell for Lectern
//!
//! Reads command lines from stdin and dispatches them against a small demo
//! command set. Lines starting with `?` ask for completions instead.

use anyhow::{Context, Result};
use clap::Parser;
use lectern::CommandFramework;
use lectern_core::FrameworkConfig;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod demo;
mod session;

use session::ShellInvoker;

#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "Lectern - interactive command shell", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run as this player instead of the console
    #[arg(short, long)]
    player: Option<String>,

    /// Grant a permission node to the player (repeatable)
    #[arg(short, long = "grant")]
    grants: Vec<String>,

    /// Locale used for feedback messages
    #[arg(short, long, default_value = "en_us")]
    locale: String,

    /// Print plain text instead of ANSI colors
    #[arg(long)]
    plain: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Load the config file (or defaults), apply `LECTERN_*` overrides from
/// `env`, then validate
fn load_config<I>(path: Option<&PathBuf>, env: I) -> Result<FrameworkConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut config = match path {
        Some(path) => FrameworkConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => FrameworkConfig::default(),
    };
    config.merge_env_vars(env)?;
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = load_config(cli.config.as_ref(), std::env::vars())?;
    let framework = CommandFramework::from_config(config)?;

    let report = framework.install(&demo::catalog(cli.config.clone()), ["lectern.demo"]);
    for malformed in &report.malformed {
        warn!(command = %malformed.command, reason = %malformed.reason, "Demo command rejected");
    }

    let invoker = match cli.player {
        Some(name) => ShellInvoker::player(name, cli.grants, cli.locale),
        None => ShellInvoker::console(cli.locale),
    };
    info!(invoker = %invoker.describe(), commands = report.registered.len(), "Shell ready");

    run(&framework, &invoker, cli.plain)
}

fn run(framework: &CommandFramework, invoker: &ShellInvoker, plain: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }
        if let Some(output) = respond(framework, invoker, &line, plain) {
            writeln!(stdout, "{output}")?;
        }
    }
    Ok(())
}

/// Output for one input line: completions for `?<partial>`, otherwise the
/// dispatch feedback
fn respond(
    framework: &CommandFramework,
    invoker: &ShellInvoker,
    line: &str,
    plain: bool,
) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(partial) = line.strip_prefix('?') {
        let suggestions = framework.suggest(partial, invoker);
        return Some(format!(
            "{} @{}",
            suggestions.candidates.join(" "),
            suggestions.start
        ));
    }

    let message = framework.dispatch(line, invoker).message?;
    Some(if plain { message.to_plain() } else { message.to_ansi() })
}
