//! Foundation error types
//!
//! Errors that can occur without a command tree in the picture: configuration
//! loading and single-argument parsing. Registry and dispatch errors live in
//! the `lectern` crate next to the code that raises them.

use std::path::PathBuf;

/// Failure to parse one argument token into a typed value.
///
/// Raised by argument types while walking the command tree. The dispatcher
/// folds it into a usage error at the failing node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {type_tag} '{input}': {reason}")]
pub struct ArgumentError {
    /// Tag of the argument type that rejected the input (e.g. `integer`)
    pub type_tag: String,
    /// The offending input slice
    pub input: String,
    /// Human readable reason
    pub reason: String,
}

impl ArgumentError {
    /// Create an argument error
    pub fn new(
        type_tag: impl Into<String>,
        input: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            type_tag: type_tag.into(),
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Input was empty where a value was required
    pub fn missing(type_tag: impl Into<String>) -> Self {
        Self::new(type_tag, "", "expected a value")
    }
}

/// Configuration loading or validation failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for this schema
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds a value outside its allowed range
    #[error("Invalid configuration: {field} - {reason}")]
    Invalid {
        /// Dotted field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Create an invalid-field error
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
