//! Argument types by tag.

use super::{ArgumentType, BooleanType, DoubleType, EntityType, IntegerType, StringType, UuidType};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Lookup of argument types by tag, shared by the scanner and the host.
///
/// Parameters declared with a tag resolve through this registry when their
/// definition is validated; configured kinds such as [`ChoiceType`] are
/// attached to parameters directly instead.
///
/// [`ChoiceType`]: super::ChoiceType
#[derive(Debug, Default)]
pub struct ArgumentTypeRegistry {
    types: RwLock<BTreeMap<String, Arc<dyn ArgumentType>>>,
}

impl ArgumentTypeRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in kind
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        let builtins: [Arc<dyn ArgumentType>; 11] = [
            Arc::new(IntegerType::integer()),
            Arc::new(IntegerType::long()),
            Arc::new(DoubleType::double()),
            Arc::new(DoubleType::float()),
            Arc::new(BooleanType),
            Arc::new(StringType::word()),
            Arc::new(StringType::quoted()),
            Arc::new(StringType::greedy()),
            Arc::new(UuidType),
            Arc::new(EntityType::entity()),
            Arc::new(EntityType::player()),
        ];
        for kind in builtins {
            registry.register(kind);
        }
        registry
    }

    /// Add a kind under its tag, returning the kind it replaced
    pub fn register(&self, kind: Arc<dyn ArgumentType>) -> Option<Arc<dyn ArgumentType>> {
        let tag = kind.tag().to_string();
        let previous = self.types.write().insert(tag.clone(), kind);
        debug!(tag = %tag, replaced = previous.is_some(), "Registered argument type");
        previous
    }

    /// Kind registered under `tag`
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<Arc<dyn ArgumentType>> {
        self.types.read().get(tag).cloned()
    }

    /// Whether `tag` is known
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.types.read().contains_key(tag)
    }

    /// Known tags, sorted
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.types.read().keys().cloned().collect()
    }
}
