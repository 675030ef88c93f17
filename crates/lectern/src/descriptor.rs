//! Command definitions and descriptors
//!
//! A [`CommandDefinition`] is the mutable, builder-style description a
//! command source produces. [`CommandDescriptor::from_definition`] validates
//! it against an [`ArgumentTypeRegistry`] and freezes it; the registry only
//! ever stores descriptors.
//!
//! A command has one or more routes. The default route has an empty path
//! (`/tp <x>`); sub-command routes add literal segments before their
//! parameters (`/admin player set <target>`).

use crate::arguments::{ArgumentType, ArgumentTypeRegistry, SuggestionProvider};
use crate::cooldown::MAX_COOLDOWN;
use crate::error::MalformedCommandError;
use indexmap::IndexSet;
use lectern_core::{markup, Arguments, Component, Invoker, Permission};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Reply produced by an executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    /// Command succeeded; show this message
    Message(Component),
    /// Command ran but refused the request; show this message
    Failure(Component),
    /// Command succeeded without anything to say
    Silent,
}

impl CommandReply {
    /// Success message from plain text or a component
    pub fn message(text: impl Into<Component>) -> Self {
        Self::Message(text.into())
    }

    /// Failure message from plain text or a component
    pub fn failure(text: impl Into<Component>) -> Self {
        Self::Failure(text.into())
    }

    /// Success message from markup
    #[must_use]
    pub fn markup(template: &str) -> Self {
        Self::Message(markup::parse(template))
    }

    /// The component to show, if any
    #[must_use]
    pub fn component(&self) -> Option<&Component> {
        match self {
            Self::Message(component) | Self::Failure(component) => Some(component),
            Self::Silent => None,
        }
    }

    /// Plain text of the component, if any
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.component().map(Component::to_plain)
    }

    /// Whether this is a failure reply
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Everything an executor gets to see about one invocation
pub struct CommandContext<'a> {
    pub(crate) invoker: &'a dyn Invoker,
    pub(crate) label: &'a str,
    pub(crate) command: &'a str,
    pub(crate) route: &'a str,
    pub(crate) arguments: &'a Arguments,
    pub(crate) input: &'a str,
}

impl<'a> CommandContext<'a> {
    /// Who ran the command
    #[must_use]
    pub fn invoker(&self) -> &'a dyn Invoker {
        self.invoker
    }

    /// Root label as typed (root name or alias)
    #[must_use]
    pub fn label(&self) -> &'a str {
        self.label
    }

    /// Root name of the command
    #[must_use]
    pub fn command(&self) -> &'a str {
        self.command
    }

    /// Route path (`""` for the default route)
    #[must_use]
    pub fn route(&self) -> &'a str {
        self.route
    }

    /// Parsed parameters
    #[must_use]
    pub fn arguments(&self) -> &'a Arguments {
        self.arguments
    }

    /// Normalized input line
    #[must_use]
    pub fn input(&self) -> &'a str {
        self.input
    }
}

impl fmt::Debug for CommandContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("invoker", &self.invoker.name())
            .field("label", &self.label)
            .field("route", &self.route)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// Handler bound to a route
pub trait CommandExecutor: Send + Sync {
    /// Run the command
    fn execute(&self, context: &CommandContext<'_>) -> anyhow::Result<CommandReply>;
}

impl<F> CommandExecutor for F
where
    F: Fn(&CommandContext<'_>) -> anyhow::Result<CommandReply> + Send + Sync,
{
    fn execute(&self, context: &CommandContext<'_>) -> anyhow::Result<CommandReply> {
        self(context)
    }
}

#[derive(Clone)]
enum ParameterKind {
    Tag(String),
    Type(Arc<dyn ArgumentType>),
}

/// Parameter as written in a definition
#[derive(Clone)]
pub struct ParameterDefinition {
    name: String,
    kind: ParameterKind,
    suggestions: Option<Arc<dyn SuggestionProvider>>,
}

/// One route of a definition
#[derive(Clone, Default)]
pub struct RouteDefinition {
    path: String,
    parameters: Vec<ParameterDefinition>,
    permission: Option<String>,
    cooldown: Option<Duration>,
    description: Option<String>,
    executor: Option<Arc<dyn CommandExecutor>>,
}

impl RouteDefinition {
    /// Route at a space separated literal path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Add a parameter whose kind is looked up by tag
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.parameters.push(ParameterDefinition {
            name: name.into(),
            kind: ParameterKind::Tag(tag.into()),
            suggestions: None,
        });
        self
    }

    /// Add a parameter with an explicit kind
    #[must_use]
    pub fn argument_with(mut self, name: impl Into<String>, kind: Arc<dyn ArgumentType>) -> Self {
        self.parameters.push(ParameterDefinition {
            name: name.into(),
            kind: ParameterKind::Type(kind),
            suggestions: None,
        });
        self
    }

    /// Replace the completions of the last parameter
    #[must_use]
    pub fn suggests<F>(self, provider: F) -> Self
    where
        F: Fn(&str, &dyn Invoker) -> Vec<String> + Send + Sync + 'static,
    {
        self.suggests_with(Arc::new(provider))
    }

    /// Replace the completions of the last parameter with a shared provider
    #[must_use]
    pub fn suggests_with(mut self, provider: Arc<dyn SuggestionProvider>) -> Self {
        if let Some(last) = self.parameters.last_mut() {
            last.suggestions = Some(provider);
        }
        self
    }

    /// Require a permission for this route
    #[must_use]
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Per-invoker cooldown, overriding the command cooldown
    #[must_use]
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Help text
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Bind a closure as the executor
    #[must_use]
    pub fn executes<F>(self, executor: F) -> Self
    where
        F: Fn(&CommandContext<'_>) -> anyhow::Result<CommandReply> + Send + Sync + 'static,
    {
        self.executes_with(Arc::new(executor))
    }

    /// Bind a shared executor
    #[must_use]
    pub fn executes_with(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }
}

/// Builder-style description of a command, produced by command sources
#[derive(Clone)]
pub struct CommandDefinition {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    permission: Option<String>,
    cooldown: Option<Duration>,
    player_only: bool,
    routes: Vec<RouteDefinition>,
}

impl CommandDefinition {
    /// Command with a root name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            permission: None,
            cooldown: None,
            player_only: false,
            routes: Vec::new(),
        }
    }

    /// Declared root name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an alias
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Help text
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Permission required for every route
    #[must_use]
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Default cooldown for routes that do not declare one
    #[must_use]
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Refuse non-player invokers
    #[must_use]
    pub fn player_only(mut self) -> Self {
        self.player_only = true;
        self
    }

    fn default_route(&mut self) -> &mut RouteDefinition {
        let index = match self.routes.iter().position(|route| route.path.trim().is_empty()) {
            Some(index) => index,
            None => {
                self.routes.push(RouteDefinition::default());
                self.routes.len() - 1
            }
        };
        &mut self.routes[index]
    }

    /// Add a parameter to the default route
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        let route = std::mem::take(self.default_route());
        *self.default_route() = route.argument(name, tag);
        self
    }

    /// Add a parameter with an explicit kind to the default route
    #[must_use]
    pub fn argument_with(mut self, name: impl Into<String>, kind: Arc<dyn ArgumentType>) -> Self {
        let route = std::mem::take(self.default_route());
        *self.default_route() = route.argument_with(name, kind);
        self
    }

    /// Replace the completions of the default route's last parameter
    #[must_use]
    pub fn suggests<F>(mut self, provider: F) -> Self
    where
        F: Fn(&str, &dyn Invoker) -> Vec<String> + Send + Sync + 'static,
    {
        let route = std::mem::take(self.default_route());
        *self.default_route() = route.suggests(provider);
        self
    }

    /// Bind a closure as the default route's executor
    #[must_use]
    pub fn executes<F>(self, executor: F) -> Self
    where
        F: Fn(&CommandContext<'_>) -> anyhow::Result<CommandReply> + Send + Sync + 'static,
    {
        self.executes_with(Arc::new(executor))
    }

    /// Bind a shared executor to the default route
    #[must_use]
    pub fn executes_with(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.default_route().executor = Some(executor);
        self
    }

    /// Add a prepared route
    #[must_use]
    pub fn route(mut self, route: RouteDefinition) -> Self {
        self.routes.push(route);
        self
    }

    /// Add a sub-command route at a space separated path
    #[must_use]
    pub fn subcommand(
        mut self,
        path: impl Into<String>,
        build: impl FnOnce(RouteDefinition) -> RouteDefinition,
    ) -> Self {
        self.routes.push(build(RouteDefinition::new(path)));
        self
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("routes", &self.routes.len())
            .finish_non_exhaustive()
    }
}

/// A validated parameter
#[derive(Clone)]
pub struct Parameter {
    name: String,
    argument: Arc<dyn ArgumentType>,
    suggestions: Option<Arc<dyn SuggestionProvider>>,
}

impl Parameter {
    /// Parameter name, used as the key in [`Arguments`]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument type
    #[must_use]
    pub fn argument(&self) -> &Arc<dyn ArgumentType> {
        &self.argument
    }

    /// Merge identity of the argument type
    #[must_use]
    pub fn signature(&self) -> String {
        self.argument.signature()
    }

    /// Completions, preferring the parameter's own provider
    #[must_use]
    pub fn suggest(&self, partial: &str, invoker: &dyn Invoker) -> Vec<String> {
        match &self.suggestions {
            Some(provider) => provider.suggest(partial, invoker),
            None => self.argument.suggest(partial, invoker),
        }
    }

    /// `<name:signature>`
    #[must_use]
    pub fn usage(&self) -> String {
        format!("<{}:{}>", self.name, self.signature())
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("signature", &self.signature())
            .field("custom_suggestions", &self.suggestions.is_some())
            .finish()
    }
}

/// A validated, executable route
#[derive(Clone)]
pub struct Route {
    path: Vec<String>,
    parameters: Vec<Parameter>,
    permission: Option<Permission>,
    cooldown: Option<Duration>,
    description: Option<String>,
    executor: Arc<dyn CommandExecutor>,
}

impl Route {
    /// Literal segments after the root label
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Path joined with spaces
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.join(" ")
    }

    /// Ordered parameters
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Route permission, in addition to the command permission
    #[must_use]
    pub fn permission(&self) -> Option<&Permission> {
        self.permission.as_ref()
    }

    /// Effective cooldown (route cooldown, else command cooldown)
    #[must_use]
    pub fn cooldown(&self) -> Option<Duration> {
        self.cooldown
    }

    /// Help text
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Bound executor
    #[must_use]
    pub fn executor(&self) -> &Arc<dyn CommandExecutor> {
        &self.executor
    }

    /// Usage line such as `tp <x:integer>`
    #[must_use]
    pub fn usage(&self, label: &str) -> String {
        let mut parts = vec![label.to_string()];
        parts.extend(self.path.iter().cloned());
        parts.extend(self.parameters.iter().map(Parameter::usage));
        parts.join(" ")
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("parameters", &self.parameters)
            .field("permission", &self.permission)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

/// Immutable, validated command metadata
#[derive(Clone)]
pub struct CommandDescriptor {
    name: String,
    aliases: IndexSet<String>,
    description: Option<String>,
    permission: Option<Permission>,
    player_only: bool,
    routes: Vec<Route>,
}

/// Root names, aliases and literal segments
fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .chars()
            .all(|ch| matches!(ch, 'a'..='z' | '0'..='9' | '_' | '-' | ':' | '.'))
}

fn is_valid_parameter_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

fn permission_node(node: Option<String>) -> Option<Permission> {
    node.map(Permission::new).filter(|permission| !permission.is_blank())
}

impl CommandDescriptor {
    /// Validate a definition
    pub fn from_definition(
        definition: CommandDefinition,
        types: &ArgumentTypeRegistry,
    ) -> Result<Self, MalformedCommandError> {
        let name = definition.name.trim().to_string();
        let malformed = |reason: String| MalformedCommandError::new(name.clone(), reason);

        if name.is_empty() {
            return Err(malformed("root name is empty".to_string()));
        }
        if !is_valid_label(&name) {
            return Err(malformed(format!(
                "root name '{name}' must be lowercase letters, digits or _-:."
            )));
        }

        let mut aliases = IndexSet::new();
        for alias in &definition.aliases {
            let alias = alias.trim();
            if !is_valid_label(alias) {
                return Err(malformed(format!("alias '{alias}' is not a valid label")));
            }
            if alias == name {
                return Err(malformed(format!("alias '{alias}' repeats the root name")));
            }
            if !aliases.insert(alias.to_string()) {
                return Err(malformed(format!("alias '{alias}' is declared twice")));
            }
        }

        if definition.routes.is_empty() {
            return Err(malformed("no executable routes".to_string()));
        }

        let mut seen_shapes = HashSet::new();
        let mut routes = Vec::with_capacity(definition.routes.len());
        for route in definition.routes {
            let path: Vec<String> = route.path.split_whitespace().map(str::to_string).collect();
            let shown = if path.is_empty() {
                "<default>".to_string()
            } else {
                path.join(" ")
            };

            if let Some(segment) = path.iter().find(|segment| !is_valid_label(segment)) {
                return Err(malformed(format!(
                    "route '{shown}': segment '{segment}' is not a valid label"
                )));
            }
            let Some(executor) = route.executor else {
                return Err(malformed(format!("route '{shown}' has no executor")));
            };

            let mut names = HashSet::new();
            let count = route.parameters.len();
            let mut parameters = Vec::with_capacity(count);
            for (index, parameter) in route.parameters.into_iter().enumerate() {
                if !is_valid_parameter_name(&parameter.name) {
                    return Err(malformed(format!(
                        "route '{shown}': parameter name '{}' is invalid",
                        parameter.name
                    )));
                }
                if !names.insert(parameter.name.clone()) {
                    return Err(malformed(format!(
                        "route '{shown}': parameter '{}' is declared twice",
                        parameter.name
                    )));
                }
                let argument = match parameter.kind {
                    ParameterKind::Type(kind) => kind,
                    ParameterKind::Tag(tag) => types.get(&tag).ok_or_else(|| {
                        malformed(format!(
                            "route '{shown}': parameter '{}' has unknown type '{tag}'",
                            parameter.name
                        ))
                    })?,
                };
                if argument.is_greedy() && index + 1 != count {
                    return Err(malformed(format!(
                        "route '{shown}': greedy parameter '{}' must be last",
                        parameter.name
                    )));
                }
                parameters.push(Parameter {
                    name: parameter.name,
                    argument,
                    suggestions: parameter.suggestions,
                });
            }

            let shape: Vec<String> = path
                .iter()
                .cloned()
                .chain(parameters.iter().map(Parameter::usage))
                .collect();
            if !seen_shapes.insert(shape) {
                return Err(malformed(format!(
                    "route '{shown}' is declared twice with the same parameters"
                )));
            }

            let cooldown = route
                .cooldown
                .or(definition.cooldown)
                .filter(|cooldown| !cooldown.is_zero());
            if let Some(cooldown) = cooldown.filter(|cooldown| *cooldown > MAX_COOLDOWN) {
                return Err(malformed(format!(
                    "route '{shown}': cooldown of {}s exceeds the maximum of {}s",
                    cooldown.as_secs(),
                    MAX_COOLDOWN.as_secs()
                )));
            }

            routes.push(Route {
                path,
                parameters,
                permission: permission_node(route.permission),
                cooldown,
                description: route.description,
                executor,
            });
        }

        Ok(Self {
            name,
            aliases,
            description: definition.description,
            permission: permission_node(definition.permission),
            player_only: definition.player_only,
            routes,
        })
    }

    /// Root name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aliases in declaration order
    #[must_use]
    pub fn aliases(&self) -> &IndexSet<String> {
        &self.aliases
    }

    /// Root name followed by aliases
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Help text
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Permission required for every route
    #[must_use]
    pub fn permission(&self) -> Option<&Permission> {
        self.permission.as_ref()
    }

    /// Whether only players may run the command
    #[must_use]
    pub fn is_player_only(&self) -> bool {
        self.player_only
    }

    /// Routes in declaration order
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// One usage line per route
    #[must_use]
    pub fn usage(&self) -> Vec<String> {
        self.routes.iter().map(|route| route.usage(&self.name)).collect()
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("permission", &self.permission)
            .field("player_only", &self.player_only)
            .field("routes", &self.routes)
            .finish()
    }
}
