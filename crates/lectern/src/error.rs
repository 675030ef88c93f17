//! Error types
//!
//! One error per failure class, grouped by when it happens:
//!
//! - startup: [`MalformedCommandError`], [`DuplicateCommandError`] (via [`RegistryError`])
//! - dispatch: [`DispatchError`], wrapping [`UsageError`] and [`PermissionDeniedError`]
//!
//! Dispatch errors are always recoverable: the dispatcher turns
//! them into feedback and never lets them escape to the host as panics.

use crate::tree::ExpectedToken;
use lectern_core::{ArgumentError, ConfigError, Permission};
use std::fmt;
use std::time::Duration;

/// Characters of input shown before the cursor in usage messages
const CONTEXT_CHARS: usize = 10;

/// A command definition failed validation or compilation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed command '{command}': {reason}")]
pub struct MalformedCommandError {
    /// Root name as written in the definition (may itself be invalid)
    pub command: String,
    /// What is wrong with it
    pub reason: String,
}

impl MalformedCommandError {
    /// Create a malformed command error
    pub fn new(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            reason: reason.into(),
        }
    }
}

/// A root name or alias is already registered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Label '{label}' is already registered by command '{existing}'")]
pub struct DuplicateCommandError {
    /// The colliding label
    pub label: String,
    /// Root name of the command that owns it
    pub existing: String,
}

/// Registry mutation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Name or alias collision under the reject policy
    #[error(transparent)]
    Duplicate(#[from] DuplicateCommandError),

    /// The descriptor could not be compiled into the tree
    #[error(transparent)]
    Malformed(#[from] MalformedCommandError),

    /// No command owns the label
    #[error("Unknown command '{label}'")]
    UnknownCommand {
        /// Requested label
        label: String,
    },
}

/// Where parsing stopped making progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageKind {
    /// The first token is not a visible root label
    UnknownCommand,
    /// Input ended before an executable node
    Incomplete,
    /// A token matched no child of the current node
    InvalidToken,
    /// Input continues past an executable node that has no matching child
    TrailingInput,
}

/// The input does not fit the command tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct UsageError {
    /// Normalized input
    pub input: String,
    /// Byte offset into `input` where parsing failed
    pub cursor: usize,
    /// Failure class
    pub kind: UsageKind,
    /// Tokens that would have been accepted at `cursor`, filtered to what
    /// the invoker may see
    pub expected: Vec<ExpectedToken>,
    /// Reason given by the first argument type that rejected the token
    pub failure: Option<ArgumentError>,
}

impl UsageError {
    /// Input before the cursor, shortened to its last few characters
    #[must_use]
    pub fn context(&self) -> String {
        let before = self.input.get(..self.cursor).unwrap_or(&self.input);
        let count = before.chars().count();
        if count <= CONTEXT_CHARS {
            return before.to_string();
        }
        let tail: String = before.chars().skip(count - CONTEXT_CHARS).collect();
        format!("...{tail}")
    }

    /// Token starting at the cursor
    #[must_use]
    pub fn token(&self) -> &str {
        let rest = self.input.get(self.cursor..).unwrap_or_default();
        rest.split_whitespace().next().unwrap_or_default()
    }

    /// Expected tokens joined for display
    #[must_use]
    pub fn expected_list(&self) -> String {
        self.expected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            UsageKind::UnknownCommand => write!(f, "Unknown command '{}'", self.token())?,
            UsageKind::Incomplete => write!(f, "Incomplete command at position {}", self.cursor)?,
            UsageKind::InvalidToken => write!(f, "Invalid token at position {}", self.cursor)?,
            UsageKind::TrailingInput => {
                write!(f, "Unexpected input at position {}", self.cursor)?;
            }
        }
        if let Some(failure) = &self.failure {
            write!(f, ": {failure}")?;
        }
        if !self.expected.is_empty() {
            write!(f, " (expected {})", self.expected_list())?;
        }
        Ok(())
    }
}

/// The invoker lacks a permission required on the resolved path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing permission '{permission}'")]
pub struct PermissionDeniedError {
    /// First unmet permission node
    pub permission: Permission,
}

/// Every way a dispatch can fail
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Input does not match the tree
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Permission check failed
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDeniedError),

    /// Command is restricted to players
    #[error("Command '{command}' can only be run by players")]
    PlayersOnly {
        /// Root name of the command
        command: String,
    },

    /// The invoker used this route too recently
    #[error("Command '{command}' is on cooldown for another {remaining:?}")]
    CooldownActive {
        /// Root name of the command
        command: String,
        /// Time until the route can be used again
        remaining: Duration,
    },

    /// The executor returned an error or panicked
    #[error("Command '{command}' failed: {message}")]
    Internal {
        /// Root name of the command
        command: String,
        /// Error description (logged, not shown to invokers)
        message: String,
    },
}

impl DispatchError {
    /// Create an internal error
    pub fn internal(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Usage error, if this is one
    #[must_use]
    pub fn as_usage(&self) -> Option<&UsageError> {
        match self {
            Self::Usage(usage) => Some(usage),
            _ => None,
        }
    }
}

/// Umbrella error for host code that does not care about the class
#[derive(Debug, thiserror::Error)]
pub enum LecternError {
    /// Configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Registry mutation failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Dispatch failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl From<MalformedCommandError> for LecternError {
    fn from(error: MalformedCommandError) -> Self {
        Self::Registry(RegistryError::Malformed(error))
    }
}

impl From<DuplicateCommandError> for LecternError {
    fn from(error: DuplicateCommandError) -> Self {
        Self::Registry(RegistryError::Duplicate(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(input: &str, cursor: usize) -> UsageError {
        UsageError {
            input: input.to_string(),
            cursor,
            kind: UsageKind::InvalidToken,
            expected: vec![ExpectedToken::Argument {
                name: "x".to_string(),
                signature: "integer".to_string(),
            }],
            failure: None,
        }
    }

    #[test]
    fn test_context_truncates_long_prefix() {
        assert_eq!(usage("tp abc", 3).context(), "tp ");
        assert_eq!(
            usage("admin player set notch 5", 23).context(),
            "...set notch "
        );
    }

    #[test]
    fn test_token_at_cursor() {
        assert_eq!(usage("tp abc def", 3).token(), "abc");
        assert_eq!(usage("tp", 2).token(), "");
    }

    #[test]
    fn test_display_lists_expected() {
        assert_eq!(
            usage("tp abc", 3).to_string(),
            "Invalid token at position 3 (expected <x:integer>)"
        );
    }
}
