//! Framework facade.

use crate::arguments::ArgumentTypeRegistry;
use crate::cache::ResolutionCache;
use crate::cooldown::CooldownService;
use crate::descriptor::{CommandDefinition, CommandDescriptor, CommandReply};
use crate::discovery::{CommandCatalog, DiscoveryScanner};
use crate::dispatcher::{DispatchReport, DispatchSettings, Dispatcher, Suggestions};
use crate::error::{DispatchError, DuplicateCommandError, LecternError, MalformedCommandError, RegistryError};
use crate::feedback::FeedbackFormatter;
use crate::registry::CommandRegistry;
use lectern_core::{Clock, FrameworkConfig, Invoker, SystemClock};
use std::sync::Arc;
use tracing::{info, warn};

/// Summary of [`CommandFramework::install`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    /// Valid descriptors found by the scan
    pub discovered: usize,
    /// Root names registered, in order
    pub registered: Vec<String>,
    /// Definitions rejected by validation or compilation
    pub malformed: Vec<MalformedCommandError>,
    /// Registrations rejected as duplicates
    pub duplicates: Vec<DuplicateCommandError>,
}

impl StartupReport {
    /// Whether every discovered command was registered
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty() && self.duplicates.is_empty()
    }
}

/// Every framework service, wired from one configuration
#[derive(Debug, Clone)]
pub struct CommandFramework {
    config: FrameworkConfig,
    types: Arc<ArgumentTypeRegistry>,
    registry: Arc<CommandRegistry>,
    dispatcher: Dispatcher,
}

impl CommandFramework {
    /// Build from configuration using the system clock
    pub fn from_config(config: FrameworkConfig) -> Result<Self, LecternError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build from configuration with an explicit cooldown clock
    pub fn with_clock(config: FrameworkConfig, clock: Arc<dyn Clock>) -> Result<Self, LecternError> {
        config.validate()?;

        let types = Arc::new(ArgumentTypeRegistry::with_builtins());
        let registry = Arc::new(CommandRegistry::with_policy(config.registry.duplicate_policy));
        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            Arc::new(ResolutionCache::from_config(&config.cache)),
            Arc::new(CooldownService::new(clock)),
            Arc::new(FeedbackFormatter::new(config.messages.clone())),
            DispatchSettings {
                cooldowns_enabled: config.cooldowns.enabled,
                suggestion_limit: config.suggestions.limit,
            },
        );

        Ok(Self {
            config,
            types,
            registry,
            dispatcher,
        })
    }

    /// Effective configuration
    #[must_use]
    pub fn config(&self) -> &FrameworkConfig {
        &self.config
    }

    /// Argument types, open for custom registrations
    #[must_use]
    pub fn types(&self) -> &Arc<ArgumentTypeRegistry> {
        &self.types
    }

    /// Command registry
    #[must_use]
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Dispatcher
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Validate and register one definition, returning the new tree version
    pub fn register(&self, definition: CommandDefinition) -> Result<u64, LecternError> {
        let descriptor = CommandDescriptor::from_definition(definition, &self.types)?;
        Ok(self.registry.register(descriptor)?)
    }

    /// Scan `roots` in `catalog` and register everything valid
    pub fn install<I, S>(&self, catalog: &CommandCatalog, roots: I) -> StartupReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let discovery = DiscoveryScanner::new(&self.types).scan(catalog, roots);
        let mut report = StartupReport {
            discovered: discovery.descriptors.len(),
            malformed: discovery
                .failures
                .into_iter()
                .map(|failure| failure.error)
                .collect(),
            ..StartupReport::default()
        };

        for descriptor in discovery.descriptors {
            let name = descriptor.name().to_string();
            match self.registry.register(descriptor) {
                Ok(_) => report.registered.push(name),
                Err(RegistryError::Duplicate(duplicate)) => {
                    warn!(command = %name, label = %duplicate.label, existing = %duplicate.existing, "Skipping duplicate command");
                    report.duplicates.push(duplicate);
                }
                Err(RegistryError::Malformed(malformed)) => {
                    warn!(command = %name, reason = %malformed.reason, "Skipping uncompilable command");
                    report.malformed.push(malformed);
                }
                Err(RegistryError::UnknownCommand { .. }) => {}
            }
        }

        info!(
            discovered = report.discovered,
            registered = report.registered.len(),
            malformed = report.malformed.len(),
            duplicates = report.duplicates.len(),
            version = self.registry.version(),
            "Installed commands"
        );
        report
    }

    /// See [`Dispatcher::execute`]
    pub fn execute(&self, input: &str, invoker: &dyn Invoker) -> Result<CommandReply, DispatchError> {
        self.dispatcher.execute(input, invoker)
    }

    /// See [`Dispatcher::dispatch`]
    pub fn dispatch(&self, input: &str, invoker: &dyn Invoker) -> DispatchReport {
        self.dispatcher.dispatch(input, invoker)
    }

    /// See [`Dispatcher::suggest`]
    pub fn suggest(&self, input: &str, invoker: &dyn Invoker) -> Suggestions {
        self.dispatcher.suggest(input, invoker)
    }
}
