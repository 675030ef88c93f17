//! Built-in argument kinds.

use super::{matches_prefix, ArgumentType, InputReader};
use lectern_core::{ArgumentError, ArgumentValue, EntitySelector, Invoker, InvokerKind};
use std::str::FromStr;
use uuid::Uuid;

fn read_token<'a>(reader: &mut InputReader<'a>, tag: &str) -> Result<&'a str, ArgumentError> {
    let token = reader.read_unquoted();
    if token.is_empty() {
        return Err(ArgumentError::missing(tag));
    }
    Ok(token)
}

/// Whole numbers with inclusive bounds.
///
/// `integer` is limited to the 32-bit range, `long` to the 64-bit range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerType {
    tag: &'static str,
    min: i64,
    max: i64,
    bounded: bool,
}

impl IntegerType {
    /// 32-bit integer
    #[must_use]
    pub fn integer() -> Self {
        Self {
            tag: "integer",
            min: i64::from(i32::MIN),
            max: i64::from(i32::MAX),
            bounded: false,
        }
    }

    /// 64-bit integer
    #[must_use]
    pub fn long() -> Self {
        Self {
            tag: "long",
            min: i64::MIN,
            max: i64::MAX,
            bounded: false,
        }
    }

    /// 32-bit integer restricted to `min..=max`
    #[must_use]
    pub fn bounded(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            bounded: true,
            ..Self::integer()
        }
    }
}

impl ArgumentType for IntegerType {
    fn tag(&self) -> &str {
        self.tag
    }

    fn signature(&self) -> String {
        if self.bounded {
            format!("{}({}..={})", self.tag, self.min, self.max)
        } else {
            self.tag.to_string()
        }
    }

    fn parse(&self, reader: &mut InputReader<'_>) -> Result<ArgumentValue, ArgumentError> {
        let start = reader.cursor();
        let token = read_token(reader, self.tag)?;
        let value = match token.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                reader.set_cursor(start);
                return Err(ArgumentError::new(self.tag, token, "expected a whole number"));
            }
        };
        if value < self.min || value > self.max {
            reader.set_cursor(start);
            return Err(ArgumentError::new(
                self.tag,
                token,
                format!("must be between {} and {}", self.min, self.max),
            ));
        }
        Ok(ArgumentValue::Integer(value))
    }
}

/// Floating point numbers
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleType {
    tag: &'static str,
}

impl DoubleType {
    /// Registered as `double`
    #[must_use]
    pub fn double() -> Self {
        Self { tag: "double" }
    }

    /// Registered as `float`
    #[must_use]
    pub fn float() -> Self {
        Self { tag: "float" }
    }
}

impl ArgumentType for DoubleType {
    fn tag(&self) -> &str {
        self.tag
    }

    fn parse(&self, reader: &mut InputReader<'_>) -> Result<ArgumentValue, ArgumentError> {
        let start = reader.cursor();
        let token = read_token(reader, self.tag)?;
        match f64::from_str(token) {
            Ok(value) if value.is_finite() => Ok(ArgumentValue::Float(value)),
            _ => {
                reader.set_cursor(start);
                Err(ArgumentError::new(self.tag, token, "expected a number"))
            }
        }
    }
}

/// `true` or `false`
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl ArgumentType for BooleanType {
    fn tag(&self) -> &str {
        "boolean"
    }

    fn parse(&self, reader: &mut InputReader<'_>) -> Result<ArgumentValue, ArgumentError> {
        let start = reader.cursor();
        let token = read_token(reader, "boolean")?;
        match token.to_ascii_lowercase().as_str() {
            "true" => Ok(ArgumentValue::Boolean(true)),
            "false" => Ok(ArgumentValue::Boolean(false)),
            _ => {
                reader.set_cursor(start);
                Err(ArgumentError::new("boolean", token, "expected true or false"))
            }
        }
    }

    fn suggest(&self, partial: &str, _invoker: &dyn Invoker) -> Vec<String> {
        ["true", "false"]
            .into_iter()
            .filter(|value| matches_prefix(value, partial))
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringMode {
    Word,
    Quoted,
    Greedy,
}

/// Free text: one word, a possibly quoted string, or the rest of the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringType {
    mode: StringMode,
}

impl StringType {
    /// Single word (`word`)
    #[must_use]
    pub fn word() -> Self {
        Self {
            mode: StringMode::Word,
        }
    }

    /// Word or quoted phrase (`string`)
    #[must_use]
    pub fn quoted() -> Self {
        Self {
            mode: StringMode::Quoted,
        }
    }

    /// Everything up to the end of the line (`greedy`)
    #[must_use]
    pub fn greedy() -> Self {
        Self {
            mode: StringMode::Greedy,
        }
    }
}

impl ArgumentType for StringType {
    fn tag(&self) -> &str {
        match self.mode {
            StringMode::Word => "word",
            StringMode::Quoted => "string",
            StringMode::Greedy => "greedy",
        }
    }

    fn parse(&self, reader: &mut InputReader<'_>) -> Result<ArgumentValue, ArgumentError> {
        let text = match self.mode {
            StringMode::Word => read_token(reader, "word")?.to_string(),
            StringMode::Quoted => {
                if !reader.can_read() {
                    return Err(ArgumentError::missing("string"));
                }
                reader.read_string()?
            }
            StringMode::Greedy => {
                let text = reader.read_remaining();
                if text.is_empty() {
                    return Err(ArgumentError::missing("greedy"));
                }
                text.to_string()
            }
        };
        Ok(ArgumentValue::Text(text))
    }

    fn is_greedy(&self) -> bool {
        self.mode == StringMode::Greedy
    }
}

/// Hyphenated UUID
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidType;

impl ArgumentType for UuidType {
    fn tag(&self) -> &str {
        "uuid"
    }

    fn parse(&self, reader: &mut InputReader<'_>) -> Result<ArgumentValue, ArgumentError> {
        let start = reader.cursor();
        let token = read_token(reader, "uuid")?;
        match Uuid::parse_str(token) {
            Ok(uuid) => Ok(ArgumentValue::Uuid(uuid)),
            Err(err) => {
                reader.set_cursor(start);
                Err(ArgumentError::new("uuid", token, err.to_string()))
            }
        }
    }
}

/// Fixed set of accepted words, matched case-insensitively.
///
/// The parsed value is the canonical spelling given at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceType {
    options: Vec<String>,
}

impl ChoiceType {
    /// Accept any of `options`
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Accepted values
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

impl ArgumentType for ChoiceType {
    fn tag(&self) -> &str {
        "choice"
    }

    fn signature(&self) -> String {
        format!("choice({})", self.options.join("|"))
    }

    fn parse(&self, reader: &mut InputReader<'_>) -> Result<ArgumentValue, ArgumentError> {
        let start = reader.cursor();
        let token = read_token(reader, "choice")?;
        if let Some(option) = self
            .options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(token))
        {
            return Ok(ArgumentValue::Choice(option.clone()));
        }
        reader.set_cursor(start);
        Err(ArgumentError::new(
            "choice",
            token,
            format!("expected one of {}", self.options.join(", ")),
        ))
    }

    fn suggest(&self, partial: &str, _invoker: &dyn Invoker) -> Vec<String> {
        self.options
            .iter()
            .filter(|option| matches_prefix(option, partial))
            .cloned()
            .collect()
    }
}

/// Entity selector (`@p @a @r @s @e`) or a player name.
///
/// The `player` variant accepts only selectors that target one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityType {
    single_player: bool,
}

impl EntityType {
    /// Any selector or name (`entity`)
    #[must_use]
    pub fn entity() -> Self {
        Self {
            single_player: false,
        }
    }

    /// One player (`player`)
    #[must_use]
    pub fn player() -> Self {
        Self {
            single_player: true,
        }
    }

    fn tag_name(&self) -> &'static str {
        if self.single_player {
            "player"
        } else {
            "entity"
        }
    }

    fn selectors(&self) -> &'static [&'static str] {
        if self.single_player {
            &["@p", "@r", "@s"]
        } else {
            &["@p", "@a", "@r", "@s", "@e"]
        }
    }
}

fn is_player_name(name: &str) -> bool {
    (1..=16).contains(&name.len())
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

impl ArgumentType for EntityType {
    fn tag(&self) -> &str {
        self.tag_name()
    }

    fn parse(&self, reader: &mut InputReader<'_>) -> Result<ArgumentValue, ArgumentError> {
        let tag = self.tag_name();
        let start = reader.cursor();
        let token = read_token(reader, tag)?;

        let selector = match token {
            "@p" => EntitySelector::NearestPlayer,
            "@a" => EntitySelector::AllPlayers,
            "@r" => EntitySelector::RandomPlayer,
            "@s" => EntitySelector::Executor,
            "@e" => EntitySelector::AllEntities,
            name if is_player_name(name) => EntitySelector::Named(name.to_string()),
            _ => {
                reader.set_cursor(start);
                return Err(ArgumentError::new(tag, token, "expected a selector or player name"));
            }
        };

        if self.single_player && (selector.is_multiple() || selector.includes_entities()) {
            reader.set_cursor(start);
            return Err(ArgumentError::new(tag, token, "only one player is allowed"));
        }
        Ok(ArgumentValue::Selector(selector))
    }

    fn suggest(&self, partial: &str, invoker: &dyn Invoker) -> Vec<String> {
        let mut out: Vec<String> = self
            .selectors()
            .iter()
            .filter(|selector| matches_prefix(selector, partial))
            .map(|selector| (*selector).to_string())
            .collect();
        if invoker.kind() == InvokerKind::Player && matches_prefix(invoker.name(), partial) {
            out.push(invoker.name().to_string());
        }
        out
    }
}
