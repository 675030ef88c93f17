//! Framework configuration
//!
//! Every tunable of the framework lives in [`FrameworkConfig`]. Values come
//! from defaults, then an optional TOML file, then `LECTERN_*` environment
//! variables:
//!
//! ```toml
//! [registry]
//! duplicate_policy = "reject"
//!
//! [cache]
//! capacity = 256
//! max_weight = 65536
//!
//! [suggestions]
//! limit = 50
//!
//! [cooldowns]
//! enabled = true
//!
//! [messages]
//! no_permission = "<red>Nope. <gray>({permission})"
//!
//! [messages.locales.pt_br]
//! players_only = "<red>Somente jogadores podem usar este comando."
//! ```

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "LECTERN_";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Registration behavior
    pub registry: RegistryConfig,
    /// Resolution cache bounds
    pub cache: CacheConfig,
    /// Suggestion limits
    pub suggestions: SuggestionConfig,
    /// Cooldown enforcement
    pub cooldowns: CooldownConfig,
    /// Feedback templates
    pub messages: MessageConfig,
}

impl FrameworkConfig {
    /// Parse a TOML document; missing sections keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded framework config");
        Ok(config)
    }

    /// Apply `LECTERN_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_env_vars(std::env::vars())
    }

    /// Apply `LECTERN_*` overrides from an explicit variable list.
    ///
    /// Unrelated variables are ignored; a recognized variable with an
    /// unparseable value is an error.
    pub fn merge_env_vars<I, K, V>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();
            match name {
                "CACHE_CAPACITY" => self.cache.capacity = parse_env("cache.capacity", value)?,
                "CACHE_MAX_WEIGHT" => {
                    self.cache.max_weight = parse_env("cache.max_weight", value)?;
                }
                "DUPLICATE_POLICY" => {
                    self.registry.duplicate_policy = parse_env("registry.duplicate_policy", value)?;
                }
                "SUGGESTION_LIMIT" => {
                    self.suggestions.limit = parse_env("suggestions.limit", value)?;
                }
                "COOLDOWNS_ENABLED" => {
                    self.cooldowns.enabled = parse_env("cooldowns.enabled", value)?;
                }
                _ => continue,
            }
            tracing::debug!(variable = %key.as_ref(), "Applied environment override");
        }
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.capacity == 0 {
            return Err(ConfigError::invalid("cache.capacity", "must be at least 1"));
        }
        if self.cache.max_weight == 0 {
            return Err(ConfigError::invalid("cache.max_weight", "must be at least 1"));
        }
        if self.suggestions.limit == 0 {
            return Err(ConfigError::invalid("suggestions.limit", "must be at least 1"));
        }
        for tag in self.messages.locales.keys() {
            if tag.trim().is_empty() {
                return Err(ConfigError::invalid("messages.locales", "locale tag is empty"));
            }
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(field: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|err: T::Err| ConfigError::invalid(field, format!("'{value}': {err}")))
}

/// What happens when a registration collides with an existing label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail with a duplicate error
    #[default]
    Reject,
    /// Remove every colliding command, then register
    Replace,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown duplicate policy '{other}' (expected reject or replace)")),
        }
    }
}

/// `[registry]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Collision handling for `register`
    pub duplicate_policy: DuplicatePolicy,
}

/// `[cache]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of memoized parses
    pub capacity: usize,
    /// Maximum summed weight of memoized parses
    pub max_weight: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_weight: 64 * 1024,
        }
    }
}

/// `[suggestions]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Maximum candidates returned by one suggest call
    pub limit: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self { limit: 50 }
    }
}

/// `[cooldowns]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    /// When false, declared cooldowns are ignored
    pub enabled: bool,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// `[messages]`: default templates plus per-locale overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    /// Templates used when no locale override applies
    #[serde(flatten)]
    pub templates: MessageTemplates,
    /// Overrides keyed by locale tag (`en_us`, `pt_br`, ...)
    pub locales: BTreeMap<String, MessageOverrides>,
}

impl MessageConfig {
    /// Effective templates for a locale.
    ///
    /// Tries the exact tag, then the language part (`pt` for `pt_br`), then
    /// the defaults. Tags compare case-insensitively with `-` and `_` equal.
    #[must_use]
    pub fn for_locale(&self, locale: &str) -> MessageTemplates {
        let wanted = normalize_locale(locale);
        let language = wanted.split('_').next().unwrap_or_default().to_string();

        let mut templates = self.templates.clone();
        let lookup = |tag: &str| {
            self.locales
                .iter()
                .find(|(key, _)| normalize_locale(key) == tag)
                .map(|(_, overrides)| overrides)
        };
        if language != wanted {
            if let Some(overrides) = lookup(&language) {
                overrides.apply(&mut templates);
            }
        }
        if let Some(overrides) = lookup(&wanted) {
            overrides.apply(&mut templates);
        }
        templates
    }
}

fn normalize_locale(tag: &str) -> String {
    tag.trim().to_ascii_lowercase().replace('-', "_")
}

/// One markup template per feedback outcome.
///
/// Placeholders are written `{name}` and substituted with escaped text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTemplates {
    /// `{permission}`
    pub no_permission: String,
    /// `{input}`, `{cursor}`, `{context}`, `{expected}`
    pub usage: String,
    /// `{input}`, `{cursor}`, `{context}`, `{reason}`
    pub invalid_argument: String,
    /// `{label}`, `{expected}`
    pub unknown_command: String,
    /// `{seconds}`, `{label}`
    pub cooldown: String,
    /// `{label}`
    pub players_only: String,
    /// `{label}`
    pub internal_error: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            no_permission: "<red>You do not have permission to use this command. <gray>({permission})"
                .to_string(),
            usage: "<red>Invalid usage. <gray>{context}<red><-- <gray>expected {expected}".to_string(),
            invalid_argument: "<red>Could not parse \"{input}\". <gray>{reason}".to_string(),
            unknown_command: "<red>Unknown command <white>{label}</white>.".to_string(),
            cooldown:
                "<red>You must wait <white>{seconds}s</white> before using this command again."
                    .to_string(),
            players_only: "<red>Only players can use this command.".to_string(),
            internal_error: "<red>An internal error occurred while executing the command."
                .to_string(),
        }
    }
}

/// Locale-specific replacements; unset fields fall back
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageOverrides {
    /// Replaces [`MessageTemplates::no_permission`]
    pub no_permission: Option<String>,
    /// Replaces [`MessageTemplates::usage`]
    pub usage: Option<String>,
    /// Replaces [`MessageTemplates::invalid_argument`]
    pub invalid_argument: Option<String>,
    /// Replaces [`MessageTemplates::unknown_command`]
    pub unknown_command: Option<String>,
    /// Replaces [`MessageTemplates::cooldown`]
    pub cooldown: Option<String>,
    /// Replaces [`MessageTemplates::players_only`]
    pub players_only: Option<String>,
    /// Replaces [`MessageTemplates::internal_error`]
    pub internal_error: Option<String>,
}

impl MessageOverrides {
    fn apply(&self, templates: &mut MessageTemplates) {
        let pairs = [
            (&self.no_permission, &mut templates.no_permission),
            (&self.usage, &mut templates.usage),
            (&self.invalid_argument, &mut templates.invalid_argument),
            (&self.unknown_command, &mut templates.unknown_command),
            (&self.cooldown, &mut templates.cooldown),
            (&self.players_only, &mut templates.players_only),
            (&self.internal_error, &mut templates.internal_error),
        ];
        for (value, slot) in pairs {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let config = FrameworkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registry.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.suggestions.limit, 50);
        assert!(config.cooldowns.enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FrameworkConfig::from_toml_str(
            r#"
            [registry]
            duplicate_policy = "replace"

            [cache]
            capacity = 8

            [messages]
            players_only = "<red>Players only"

            [messages.locales.pt_br]
            players_only = "<red>Somente jogadores"
            "#,
        )
        .unwrap();

        assert_eq!(config.registry.duplicate_policy, DuplicatePolicy::Replace);
        assert_eq!(config.cache.capacity, 8);
        assert_eq!(config.cache.max_weight, CacheConfig::default().max_weight);
        assert_eq!(config.messages.templates.players_only, "<red>Players only");
        assert_eq!(
            config.messages.for_locale("pt-BR").players_only,
            "<red>Somente jogadores"
        );
        assert_eq!(
            config.messages.for_locale("en_us").players_only,
            "<red>Players only"
        );
    }

    #[test]
    fn test_language_fallback() {
        let mut config = MessageConfig::default();
        config.locales.insert(
            "pt".to_string(),
            MessageOverrides {
                cooldown: Some("aguarde {seconds}s".to_string()),
                ..MessageOverrides::default()
            },
        );
        let templates = config.for_locale("pt_pt");
        assert_eq!(templates.cooldown, "aguarde {seconds}s");
        assert_eq!(templates.usage, MessageTemplates::default().usage);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[suggestions]\nlimit = 5").unwrap();

        let config = FrameworkConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.suggestions.limit, 5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FrameworkConfig::load_from_file(Path::new("/nonexistent/lectern.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = FrameworkConfig::default();
        config
            .merge_env_vars([
                ("LECTERN_CACHE_CAPACITY", "12"),
                ("LECTERN_DUPLICATE_POLICY", "Replace"),
                ("LECTERN_SUGGESTION_LIMIT", "3"),
                ("PATH", "/usr/bin"),
            ])
            .unwrap();

        assert_eq!(config.cache.capacity, 12);
        assert_eq!(config.registry.duplicate_policy, DuplicatePolicy::Replace);
        assert_eq!(config.suggestions.limit, 3);
    }

    #[test]
    fn test_bad_env_value_rejected() {
        let mut config = FrameworkConfig::default();
        let err = config
            .merge_env_vars([("LECTERN_CACHE_CAPACITY", "lots")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "cache.capacity"));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = FrameworkConfig::default();
        config.cache.capacity = 0;
        assert!(config.validate().is_err());
    }
}
