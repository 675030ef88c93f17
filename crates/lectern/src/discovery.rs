//! Command discovery
//!
//! Hosts describe their commands as [`CommandSource`]s and file them in a
//! [`CommandCatalog`] under dotted package paths at startup. The
//! [`DiscoveryScanner`] walks the catalog for a set of package roots and
//! validates every definition it finds. Invalid definitions are logged and
//! reported; they never stop the scan.

use crate::arguments::ArgumentTypeRegistry;
use crate::descriptor::{CommandDefinition, CommandDescriptor};
use crate::error::MalformedCommandError;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Something that can describe a command
pub trait CommandSource: Send + Sync {
    /// Produce the command definition
    fn define(&self) -> CommandDefinition;
}

impl<F> CommandSource for F
where
    F: Fn() -> CommandDefinition + Send + Sync,
{
    fn define(&self) -> CommandDefinition {
        self()
    }
}

#[derive(Clone)]
struct CatalogEntry {
    package: String,
    source: Arc<dyn CommandSource>,
}

/// Command sources filed under package paths, in insertion order
#[derive(Clone, Default)]
pub struct CommandCatalog {
    entries: Vec<CatalogEntry>,
}

impl CommandCatalog {
    /// Empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File a source under `package`
    pub fn add(&mut self, package: impl Into<String>, source: impl CommandSource + 'static) -> &mut Self {
        self.entries.push(CatalogEntry {
            package: package.into(),
            source: Arc::new(source),
        });
        self
    }

    /// Builder form of [`add`](Self::add)
    #[must_use]
    pub fn with(mut self, package: impl Into<String>, source: impl CommandSource + 'static) -> Self {
        self.add(package, source);
        self
    }

    /// Number of sources
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CommandCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| &entry.package))
            .finish()
    }
}

/// A source whose definition was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryFailure {
    /// Package the source was filed under
    pub package: String,
    /// Why it was rejected
    pub error: MalformedCommandError,
}

/// Outcome of a scan
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    /// Valid descriptors in catalog order
    pub descriptors: Vec<CommandDescriptor>,
    /// Rejected sources
    pub failures: Vec<DiscoveryFailure>,
}

impl DiscoveryReport {
    /// Whether every visited source was valid
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Whether `package` equals `root` or lies beneath it
fn in_package(package: &str, root: &str) -> bool {
    package == root
        || package
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Validates the sources under a set of package roots
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryScanner<'a> {
    types: &'a ArgumentTypeRegistry,
}

impl<'a> DiscoveryScanner<'a> {
    /// Scanner resolving parameter tags through `types`
    #[must_use]
    pub fn new(types: &'a ArgumentTypeRegistry) -> Self {
        Self { types }
    }

    /// Visit every source under any of `roots`, once each, in catalog order
    pub fn scan<I, S>(&self, catalog: &CommandCatalog, roots: I) -> DiscoveryReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roots: Vec<String> = roots
            .into_iter()
            .map(|root| root.as_ref().trim().trim_end_matches('.').to_string())
            .filter(|root| !root.is_empty())
            .collect();

        let mut report = DiscoveryReport::default();
        if roots.is_empty() {
            debug!("No package roots to scan");
            return report;
        }

        for entry in &catalog.entries {
            if !roots.iter().any(|root| in_package(&entry.package, root)) {
                continue;
            }
            match self.validate(entry) {
                Ok(descriptor) => {
                    debug!(package = %entry.package, command = %descriptor.name(), "Discovered command");
                    report.descriptors.push(descriptor);
                }
                Err(error) => {
                    warn!(package = %entry.package, command = %error.command, reason = %error.reason, "Skipping malformed command");
                    report.failures.push(DiscoveryFailure {
                        package: entry.package.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            roots = ?roots,
            discovered = report.descriptors.len(),
            failed = report.failures.len(),
            "Command discovery finished"
        );
        report
    }

    fn validate(&self, entry: &CatalogEntry) -> Result<CommandDescriptor, MalformedCommandError> {
        let definition = catch_unwind(AssertUnwindSafe(|| entry.source.define())).map_err(|_| {
            MalformedCommandError::new(
                format!("<{}>", entry.package),
                "command source panicked while defining",
            )
        })?;
        CommandDescriptor::from_definition(definition, self.types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::CommandReply;

    fn command(name: &'static str) -> impl Fn() -> CommandDefinition + Send + Sync {
        move || CommandDefinition::new(name).executes(|_| Ok(CommandReply::Silent))
    }

    fn catalog() -> CommandCatalog {
        CommandCatalog::new()
            .with("plugin.commands", command("spawn"))
            .with("plugin.commands.admin", command("ban"))
            .with("plugin.commandsextra", command("extra"))
            .with("plugin.commands", command("Bad Name"))
            .with("other", command("other"))
    }

    fn names(report: &DiscoveryReport) -> Vec<&str> {
        report.descriptors.iter().map(CommandDescriptor::name).collect()
    }

    #[test]
    fn test_scan_is_segment_aware() {
        let types = ArgumentTypeRegistry::with_builtins();
        let report = DiscoveryScanner::new(&types).scan(&catalog(), ["plugin.commands"]);

        assert_eq!(names(&report), vec!["spawn", "ban"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].error.command, "Bad Name");
    }

    #[test]
    fn test_overlapping_roots_visit_once() {
        let types = ArgumentTypeRegistry::with_builtins();
        let report = DiscoveryScanner::new(&types).scan(
            &catalog(),
            ["plugin.commands.", "plugin.commands.admin", "other", "  "],
        );
        assert_eq!(names(&report), vec!["spawn", "ban", "other"]);
    }

    #[test]
    fn test_blank_roots_find_nothing() {
        let types = ArgumentTypeRegistry::with_builtins();
        let report = DiscoveryScanner::new(&types).scan(&catalog(), [""]);
        assert!(report.descriptors.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_panicking_source_is_reported() {
        let types = ArgumentTypeRegistry::with_builtins();
        let catalog = CommandCatalog::new()
            .with("p", || -> CommandDefinition { panic!("broken") })
            .with("p", command("ok"));
        let report = DiscoveryScanner::new(&types).scan(&catalog, ["p"]);
        assert_eq!(names(&report), vec!["ok"]);
        assert_eq!(report.failures[0].error.command, "<p>");
    }
}
