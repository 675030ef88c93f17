//! Argument types
//!
//! An [`ArgumentType`] reads one parameter from an [`InputReader`] and
//! proposes completions for a partially typed token. The built-in kinds are
//! registered by tag in an [`ArgumentTypeRegistry`]; hosts add their own the
//! same way.

mod builtin;
mod reader;
mod registry;

pub use builtin::{BooleanType, ChoiceType, DoubleType, EntityType, IntegerType, StringType, UuidType};
pub use reader::InputReader;
pub use registry::ArgumentTypeRegistry;

use lectern_core::{ArgumentError, ArgumentValue, Invoker};
use std::fmt;

/// One kind of command parameter
pub trait ArgumentType: Send + Sync + fmt::Debug {
    /// Registry tag (`integer`, `word`, ...)
    fn tag(&self) -> &str;

    /// Identity used when merging tree nodes.
    ///
    /// Two parameters merge into one node only when their names and
    /// signatures are equal, so configured variants of a kind (bounds,
    /// choice sets) must encode their configuration here.
    fn signature(&self) -> String {
        self.tag().to_string()
    }

    /// Parse a value at the reader's cursor.
    ///
    /// On success the cursor must sit right after the consumed text.
    fn parse(&self, reader: &mut InputReader<'_>) -> Result<ArgumentValue, ArgumentError>;

    /// Completions for a partial token
    fn suggest(&self, _partial: &str, _invoker: &dyn Invoker) -> Vec<String> {
        Vec::new()
    }

    /// Whether the type consumes the rest of the line
    fn is_greedy(&self) -> bool {
        false
    }
}

/// Completion source attached to a single parameter, replacing the
/// suggestions of its argument type
pub trait SuggestionProvider: Send + Sync {
    /// Completions for a partial token
    fn suggest(&self, partial: &str, invoker: &dyn Invoker) -> Vec<String>;
}

impl<F> SuggestionProvider for F
where
    F: Fn(&str, &dyn Invoker) -> Vec<String> + Send + Sync,
{
    fn suggest(&self, partial: &str, invoker: &dyn Invoker) -> Vec<String> {
        self(partial, invoker)
    }
}

/// Case-insensitive prefix test used by every completion path
#[must_use]
pub fn matches_prefix(candidate: &str, partial: &str) -> bool {
    candidate
        .to_lowercase()
        .starts_with(&partial.to_lowercase())
}
