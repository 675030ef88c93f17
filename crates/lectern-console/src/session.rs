//! The invoker behind an interactive session.

use lectern_core::{Invoker, InvokerKind, CONSOLE_ID};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Console or named player typing into the shell
#[derive(Debug, Clone)]
pub struct ShellInvoker {
    id: Uuid,
    name: String,
    kind: InvokerKind,
    locale: String,
    grants: BTreeSet<String>,
}

impl ShellInvoker {
    /// The console. Holds every permission.
    pub fn console(locale: String) -> Self {
        Self {
            id: CONSOLE_ID,
            name: "CONSOLE".to_string(),
            kind: InvokerKind::Console,
            locale,
            grants: BTreeSet::new(),
        }
    }

    /// A player holding exactly `grants`. `*` grants everything.
    pub fn player(name: String, grants: Vec<String>, locale: String) -> Self {
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()),
            name,
            kind: InvokerKind::Player,
            locale,
            grants: grants.into_iter().collect(),
        }
    }

    /// `name (kind)` for logs
    pub fn describe(&self) -> String {
        format!("{} ({:?})", self.name, self.kind)
    }
}

impl Invoker for ShellInvoker {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.kind == InvokerKind::Console
            || self.grants.contains("*")
            || self.grants.contains(permission)
    }

    fn locale(&self) -> &str {
        &self.locale
    }

    fn kind(&self) -> InvokerKind {
        self.kind
    }
}
