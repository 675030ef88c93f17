//! Feedback formatting
//!
//! Maps dispatch outcomes to rich text using the configured templates. The
//! formatter is pure: it never sends anything, the host delivers the
//! returned component.

use crate::descriptor::CommandReply;
use crate::error::{DispatchError, UsageError, UsageKind};
use lectern_core::{markup, Component, MessageConfig, MessageTemplates};

/// Renders outcomes with per-locale templates
#[derive(Debug, Clone, Default)]
pub struct FeedbackFormatter {
    messages: MessageConfig,
}

impl FeedbackFormatter {
    /// Formatter over configured templates
    #[must_use]
    pub fn new(messages: MessageConfig) -> Self {
        Self { messages }
    }

    /// Effective templates for a locale
    #[must_use]
    pub fn templates(&self, locale: &str) -> MessageTemplates {
        self.messages.for_locale(locale)
    }

    /// Message for a successful dispatch; `None` for silent replies
    #[must_use]
    pub fn format_reply(&self, reply: &CommandReply) -> Option<Component> {
        reply.component().cloned()
    }

    /// Message for a failed dispatch
    #[must_use]
    pub fn format_error(&self, error: &DispatchError, locale: &str) -> Component {
        let templates = self.templates(locale);
        match error {
            DispatchError::Usage(usage) => Self::format_usage(&templates, usage),
            DispatchError::PermissionDenied(denied) => markup::render(
                &templates.no_permission,
                &[("permission", denied.permission.as_str())],
            ),
            DispatchError::PlayersOnly { command } => {
                markup::render(&templates.players_only, &[("label", command.as_str())])
            }
            DispatchError::CooldownActive { command, remaining } => {
                let seconds = remaining
                    .as_secs()
                    .saturating_add(u64::from(remaining.subsec_nanos() > 0));
                let seconds = seconds.to_string();
                markup::render(
                    &templates.cooldown,
                    &[("seconds", seconds.as_str()), ("label", command.as_str())],
                )
            }
            DispatchError::Internal { command, .. } => {
                markup::render(&templates.internal_error, &[("label", command.as_str())])
            }
        }
    }

    /// Message for either outcome
    #[must_use]
    pub fn format(
        &self,
        outcome: &Result<CommandReply, DispatchError>,
        locale: &str,
    ) -> Option<Component> {
        match outcome {
            Ok(reply) => self.format_reply(reply),
            Err(error) => Some(self.format_error(error, locale)),
        }
    }

    fn format_usage(templates: &MessageTemplates, usage: &UsageError) -> Component {
        let expected = if usage.expected.is_empty() {
            "end of command".to_string()
        } else {
            usage.expected_list()
        };
        let cursor = usage.cursor.to_string();
        let context = usage.context();

        if usage.kind == UsageKind::UnknownCommand {
            return markup::render(
                &templates.unknown_command,
                &[("label", usage.token()), ("expected", expected.as_str())],
            );
        }

        let mut placeholders = vec![
            ("input", usage.input.as_str()),
            ("cursor", cursor.as_str()),
            ("context", context.as_str()),
            ("expected", expected.as_str()),
        ];
        match &usage.failure {
            Some(failure) => {
                placeholders[0].1 = failure.input.as_str();
                placeholders.push(("reason", failure.reason.as_str()));
                markup::render(&templates.invalid_argument, &placeholders)
            }
            None => markup::render(&templates.usage, &placeholders),
        }
    }
}
