//! # Lectern - Layer 2: Command Dispatch
//!
//! **Purpose**: Turn command definitions into a shared prefix tree and
//! dispatch typed command lines against it.
//!
//! Definitions are collected ahead of time, validated into immutable
//! descriptors, compiled into an arena-backed tree and published as
//! versioned snapshots. Dispatch walks the current snapshot, checks
//! permissions and cooldowns for the invoker and renders the outcome as
//! rich text.
//!
//! # Architecture Constraints
//!
//! - YES Argument types, descriptors and discovery of command sources
//! - YES Registry with duplicate detection and a monotonic tree version
//! - YES Tree compilation, parsing and suggestions
//! - YES Resolution cache keyed by input signature and tree version
//! - YES Permission, player-only and cooldown enforcement at dispatch
//! - NO host I/O: replies are returned, never sent
//! - NO global state: every service is an explicit value
//!
//! ## Quick Start
//!
//! ```
//! use lectern::{CommandDefinition, CommandFramework, CommandReply};
//! use lectern_core::{ConsoleInvoker, FrameworkConfig};
//!
//! let framework = CommandFramework::from_config(FrameworkConfig::default()).unwrap();
//! framework
//!     .register(
//!         CommandDefinition::new("tp")
//!             .alias("teleport")
//!             .argument("x", "integer")
//!             .executes(|ctx| {
//!                 let x = ctx.arguments().integer("x")?;
//!                 Ok(CommandReply::message(format!("Teleported to {x}")))
//!             }),
//!     )
//!     .unwrap();
//!
//! let reply = framework.execute("/teleport 5", &ConsoleInvoker::default()).unwrap();
//! assert_eq!(reply.text().as_deref(), Some("Teleported to 5"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Argument types, the input reader and the type registry
pub mod arguments;

/// Resolution cache
pub mod cache;

/// Per-invoker cooldowns
pub mod cooldown;

/// Command definitions and validated descriptors
pub mod descriptor;

/// Command sources and the discovery scanner
pub mod discovery;

/// Dispatch and suggestion entry points
pub mod dispatcher;

/// Error types
pub mod error;

/// Outcome to rich text mapping
pub mod feedback;

/// Wiring of every service from one configuration
pub mod framework;

/// Command registry
pub mod registry;

/// Command tree: arena, compiler, parser, suggestions
pub mod tree;

pub use arguments::{
    ArgumentType, ArgumentTypeRegistry, BooleanType, ChoiceType, DoubleType, EntityType,
    InputReader, IntegerType, StringType, SuggestionProvider, UuidType,
};
pub use cache::{CacheStats, ResolutionCache};
pub use cooldown::{CooldownKey, CooldownService, MAX_COOLDOWN, SWEEP_INTERVAL};
pub use descriptor::{
    CommandContext, CommandDefinition, CommandDescriptor, CommandExecutor, CommandReply,
    Parameter, Route, RouteDefinition,
};
pub use discovery::{CommandCatalog, CommandSource, DiscoveryFailure, DiscoveryReport, DiscoveryScanner};
pub use dispatcher::{DispatchReport, DispatchSettings, Dispatcher, Suggestions};
pub use error::{
    DispatchError, DuplicateCommandError, LecternError, MalformedCommandError,
    PermissionDeniedError, RegistryError, UsageError, UsageKind,
};
pub use feedback::FeedbackFormatter;
pub use framework::{CommandFramework, StartupReport};
pub use registry::{CommandRegistry, TreeSnapshot};
pub use tree::{CommandTree, ExpectedToken, NodeId, ParseOutcome, ParseResult, Visibility};
