//! Typed argument values
//!
//! Argument types turn input tokens into [`ArgumentValue`]s; the dispatcher
//! collects them into [`Arguments`] in declaration order and hands them to
//! the executor.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Target selector parsed from an entity argument.
///
/// Selectors are syntactic only; resolving them against live entities is the
/// executor's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "selector", content = "name", rename_all = "snake_case")]
pub enum EntitySelector {
    /// `@p`
    NearestPlayer,
    /// `@a`
    AllPlayers,
    /// `@r`
    RandomPlayer,
    /// `@s`
    Executor,
    /// `@e`
    AllEntities,
    /// A literal player name
    Named(String),
}

impl EntitySelector {
    /// Whether the selector can resolve to more than one target
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::AllPlayers | Self::AllEntities)
    }

    /// Whether the selector may resolve to non-player entities
    #[must_use]
    pub fn includes_entities(&self) -> bool {
        matches!(self, Self::AllEntities)
    }
}

impl fmt::Display for EntitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NearestPlayer => f.write_str("@p"),
            Self::AllPlayers => f.write_str("@a"),
            Self::RandomPlayer => f.write_str("@r"),
            Self::Executor => f.write_str("@s"),
            Self::AllEntities => f.write_str("@e"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// A single parsed argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ArgumentValue {
    /// Whole number (integer and long kinds)
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// `true` / `false`
    Boolean(bool),
    /// Free text (word, quoted string, greedy string)
    Text(String),
    /// UUID
    Uuid(Uuid),
    /// Canonical value of an enumerated literal
    Choice(String),
    /// Entity selector
    Selector(EntitySelector),
}

impl ArgumentValue {
    /// Short name of the variant, used in lookup errors
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Text(_) => "text",
            Self::Uuid(_) => "uuid",
            Self::Choice(_) => "choice",
            Self::Selector(_) => "selector",
        }
    }
}

impl fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Text(value) | Self::Choice(value) => f.write_str(value),
            Self::Uuid(value) => write!(f, "{value}"),
            Self::Selector(selector) => write!(f, "{selector}"),
        }
    }
}

/// Failure to read a named argument with the requested type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentLookupError {
    /// No argument with that name was bound
    #[error("No argument named '{name}'")]
    Missing {
        /// Requested argument name
        name: String,
    },

    /// The argument exists but holds another type
    #[error("Argument '{name}' is {actual}, not {expected}")]
    WrongType {
        /// Requested argument name
        name: String,
        /// Requested type
        expected: &'static str,
        /// Type actually bound
        actual: &'static str,
    },
}

/// Arguments bound during one dispatch, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments {
    values: IndexMap<String, ArgumentValue>,
}

macro_rules! typed_getter {
    ($(#[$doc:meta])* $fn_name:ident, $variant:ident, $ty:ty, $expected:literal) => {
        $(#[$doc])*
        pub fn $fn_name(&self, name: &str) -> Result<$ty, ArgumentLookupError> {
            match self.get(name)? {
                ArgumentValue::$variant(value) => Ok(value.clone()),
                other => Err(ArgumentLookupError::WrongType {
                    name: name.to_string(),
                    expected: $expected,
                    actual: other.kind_name(),
                }),
            }
        }
    };
}

impl Arguments {
    /// Empty argument set
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value, replacing any previous binding of the same name
    pub fn insert(&mut self, name: impl Into<String>, value: ArgumentValue) {
        self.values.insert(name.into(), value);
    }

    /// Raw value lookup
    pub fn get(&self, name: &str) -> Result<&ArgumentValue, ArgumentLookupError> {
        self.values
            .get(name)
            .ok_or_else(|| ArgumentLookupError::Missing {
                name: name.to_string(),
            })
    }

    /// Whether an argument with that name was bound
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    typed_getter!(
        /// Whole number argument
        integer, Integer, i64, "integer"
    );
    typed_getter!(
        /// Floating point argument
        float, Float, f64, "float"
    );
    typed_getter!(
        /// Boolean argument
        boolean, Boolean, bool, "boolean"
    );
    typed_getter!(
        /// UUID argument
        uuid, Uuid, Uuid, "uuid"
    );
    typed_getter!(
        /// Enumerated literal argument (canonical spelling)
        choice, Choice, String, "choice"
    );
    typed_getter!(
        /// Entity selector argument
        selector, Selector, EntitySelector, "selector"
    );

    /// Text argument. Also accepts choice values.
    pub fn text(&self, name: &str) -> Result<&str, ArgumentLookupError> {
        match self.get(name)? {
            ArgumentValue::Text(value) | ArgumentValue::Choice(value) => Ok(value),
            other => Err(ArgumentLookupError::WrongType {
                name: name.to_string(),
                expected: "text",
                actual: other.kind_name(),
            }),
        }
    }

    /// Iterate `(name, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgumentValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of bound arguments
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no argument was bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
