//! Invoker context
//!
//! An invoker is whoever issued a command line: a player, the console, a
//! scheduled job. The framework only needs a stable identity, a permission
//! check and a locale for message selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity used for every non-player invoker.
pub const CONSOLE_ID: Uuid = Uuid::nil();

/// Permission node string such as `lectern.admin.reload`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// Create a permission node
    pub fn new(node: impl Into<String>) -> Self {
        Self(node.into())
    }

    /// Permission node string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank nodes grant access to everyone
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Kind of entity behind an invoker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvokerKind {
    /// An online player
    Player,
    /// The server console
    Console,
    /// Anything else (command blocks, remote consoles, jobs)
    Other,
}

/// Context object describing who is running a command.
///
/// Implementations must be cheap to query; the dispatcher calls
/// `has_permission` once per node on the walked path.
pub trait Invoker: Send + Sync {
    /// Stable unique identifier
    fn id(&self) -> Uuid;

    /// Display name
    fn name(&self) -> &str;

    /// Whether the invoker holds `permission`
    fn has_permission(&self, permission: &str) -> bool;

    /// Locale tag used to pick message templates (e.g. `en_us`)
    fn locale(&self) -> &str {
        "en_us"
    }

    /// Kind of entity behind this invoker
    fn kind(&self) -> InvokerKind;

    /// Check a permission node, treating blank nodes as granted
    fn permits(&self, permission: &Permission) -> bool {
        permission.is_blank() || self.has_permission(permission.as_str())
    }
}

/// The server console. Holds every permission.
#[derive(Debug, Clone)]
pub struct ConsoleInvoker {
    locale: String,
}

impl ConsoleInvoker {
    /// Console invoker using the given locale
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }
}

impl Default for ConsoleInvoker {
    fn default() -> Self {
        Self::new("en_us")
    }
}

impl Invoker for ConsoleInvoker {
    fn id(&self) -> Uuid {
        CONSOLE_ID
    }

    fn name(&self) -> &str {
        "CONSOLE"
    }

    fn has_permission(&self, _permission: &str) -> bool {
        true
    }

    fn locale(&self) -> &str {
        &self.locale
    }

    fn kind(&self) -> InvokerKind {
        InvokerKind::Console
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_permission_always_granted() {
        struct Nobody;
        impl Invoker for Nobody {
            fn id(&self) -> Uuid {
                Uuid::nil()
            }
            fn name(&self) -> &str {
                "nobody"
            }
            fn has_permission(&self, _permission: &str) -> bool {
                false
            }
            fn kind(&self) -> InvokerKind {
                InvokerKind::Other
            }
        }

        assert!(Nobody.permits(&Permission::new("  ")));
        assert!(!Nobody.permits(&Permission::new("lectern.use")));
    }

    #[test]
    fn test_console_holds_everything() {
        let console = ConsoleInvoker::default();
        assert_eq!(console.id(), CONSOLE_ID);
        assert_eq!(console.kind(), InvokerKind::Console);
        assert!(console.permits(&Permission::new("anything.at.all")));
    }
}
