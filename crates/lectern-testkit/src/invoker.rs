//! Invokers with explicit permission sets.

use lectern_core::{Invoker, InvokerKind, CONSOLE_ID};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Configurable [`Invoker`] for tests.
///
/// Permissions ending in `.*` grant every node beneath them.
#[derive(Debug, Clone)]
pub struct TestInvoker {
    id: Uuid,
    name: String,
    kind: InvokerKind,
    locale: String,
    permissions: BTreeSet<String>,
    operator: bool,
}

impl TestInvoker {
    /// Player without permissions. The id is derived from the name.
    pub fn player(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()),
            name,
            kind: InvokerKind::Player,
            locale: "en_us".to_string(),
            permissions: BTreeSet::new(),
            operator: false,
        }
    }

    /// Console holding every permission
    #[must_use]
    pub fn console() -> Self {
        Self {
            id: CONSOLE_ID,
            name: "CONSOLE".to_string(),
            kind: InvokerKind::Console,
            operator: true,
            ..Self::player("CONSOLE")
        }
    }

    /// Grant a permission node
    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Grant several permission nodes
    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Grant everything
    #[must_use]
    pub fn operator(mut self) -> Self {
        self.operator = true;
        self
    }

    /// Override the locale
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Override the id
    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Override the kind
    #[must_use]
    pub fn with_kind(mut self, kind: InvokerKind) -> Self {
        self.kind = kind;
        self
    }
}

impl Invoker for TestInvoker {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.operator
            || self.permissions.contains(permission)
            || self.permissions.iter().any(|granted| {
                granted
                    .strip_suffix(".*")
                    .is_some_and(|prefix| permission.starts_with(&format!("{prefix}.")))
            })
    }

    fn locale(&self) -> &str {
        &self.locale
    }

    fn kind(&self) -> InvokerKind {
        self.kind
    }
}
