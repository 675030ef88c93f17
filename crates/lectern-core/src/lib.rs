//! # Lectern Core - Layer 1: Foundation
//!
//! **Purpose**: Define the vocabulary every other Lectern crate speaks.
//!
//! This crate holds the pure, host-independent building blocks of the command
//! framework. It knows nothing about command trees or dispatch.
//!
//! # Architecture Constraints
//!
//! - YES Rich text components and the tag markup used by message templates
//! - YES Invoker abstraction (identity, permission check, locale)
//! - YES Typed argument values handed to executors
//! - YES Framework configuration (TOML + environment overrides)
//! - NO command tree, registry or dispatch logic (that's `lectern`)
//! - NO host integration (that's the embedding application)
//!
//! ## Core Concepts
//!
//! - **Component**: styled text tree, renderable as plain text, ANSI or JSON
//! - **Invoker**: whoever issued a command line
//! - **ArgumentValue / Arguments**: parsed, typed parameters of one invocation
//! - **FrameworkConfig**: every tunable of the framework in one place

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Framework configuration and message templates
pub mod config;

/// Foundation error types
pub mod errors;

/// Invoker context and permissions
pub mod invoker;

/// Rich text components and markup
pub mod text;

/// Clock abstraction for cooldowns and expiry
pub mod time;

/// Typed argument values
pub mod value;

pub use config::{
    CacheConfig, CooldownConfig, DuplicatePolicy, FrameworkConfig, MessageConfig,
    MessageOverrides, MessageTemplates, RegistryConfig, SuggestionConfig,
};
pub use errors::{ArgumentError, ConfigError};
pub use invoker::{ConsoleInvoker, Invoker, InvokerKind, Permission, CONSOLE_ID};
pub use text::{markup, Component, NamedColor, Style};
pub use time::{Clock, SystemClock};
pub use value::{ArgumentLookupError, ArgumentValue, Arguments, EntitySelector};
