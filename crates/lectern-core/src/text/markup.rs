//! Tag markup for message templates.
//!
//! A deliberately small subset of MiniMessage:
//!
//! - colors: `<red>`, `<color:red>`, closed with `</red>` / `</color>`
//! - decorations: `<bold>`/`<b>`, `<italic>`/`<i>`/`<em>`,
//!   `<underlined>`/`<u>`, `<strikethrough>`/`<st>`
//! - `<reset>` drops every open tag, `<newline>`/`<br>` inserts a line break
//! - `\<` is a literal `<`, `\\` a literal backslash
//!
//! Unknown tags are kept as literal text. Closing a tag that was never opened
//! is ignored.
//!
//! ```
//! use lectern_core::text::markup;
//!
//! let component = markup::parse("<red>Denied <gray>(lectern.admin)");
//! assert_eq!(component.to_plain(), "Denied (lectern.admin)");
//! ```

use super::{Component, NamedColor, Style};

enum Tag {
    Color(NamedColor),
    Bold,
    Italic,
    Underlined,
    Strikethrough,
    Reset,
    Newline,
}

impl Tag {
    fn parse(name: &str) -> Option<Tag> {
        let name = name.trim().to_ascii_lowercase();
        if let Some(color) = name.strip_prefix("color:").or_else(|| name.strip_prefix("c:")) {
            return NamedColor::from_name(color).map(Tag::Color);
        }
        match name.as_str() {
            "bold" | "b" => Some(Tag::Bold),
            "italic" | "i" | "em" => Some(Tag::Italic),
            "underlined" | "u" => Some(Tag::Underlined),
            "strikethrough" | "st" => Some(Tag::Strikethrough),
            "reset" => Some(Tag::Reset),
            "newline" | "br" => Some(Tag::Newline),
            other => NamedColor::from_name(other).map(Tag::Color),
        }
    }

    /// Name used to match closing tags
    fn close_key(&self) -> &'static str {
        match self {
            Tag::Color(_) => "color",
            Tag::Bold => "bold",
            Tag::Italic => "italic",
            Tag::Underlined => "underlined",
            Tag::Strikethrough => "strikethrough",
            Tag::Reset | Tag::Newline => "",
        }
    }

    fn apply(&self, style: &Style) -> Style {
        let mut next = *style;
        match self {
            Tag::Color(color) => next.color = Some(*color),
            Tag::Bold => next.bold = true,
            Tag::Italic => next.italic = true,
            Tag::Underlined => next.underlined = true,
            Tag::Strikethrough => next.strikethrough = true,
            Tag::Reset | Tag::Newline => {}
        }
        next
    }
}

struct Builder {
    root: Component,
    buffer: String,
    stack: Vec<(&'static str, Style)>,
}

impl Builder {
    fn current(&self) -> Style {
        self.stack.last().map(|(_, style)| *style).unwrap_or_default()
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        let style = self.current();
        match self.root.children.last_mut() {
            Some(last) if last.style == style && last.children.is_empty() && last.text != "\n" => {
                last.text.push_str(&text);
            }
            _ => self.root.children.push(Component::text(text).with_style(style)),
        }
    }

    fn open(&mut self, tag: Tag) {
        self.flush();
        match tag {
            Tag::Reset => self.stack.clear(),
            Tag::Newline => self.root.children.push(Component::newline()),
            other => {
                let style = other.apply(&self.current());
                self.stack.push((other.close_key(), style));
            }
        }
    }

    fn close(&mut self, key: &str) {
        self.flush();
        if let Some(index) = self.stack.iter().rposition(|(open, _)| *open == key) {
            self.stack.truncate(index);
        }
    }
}

fn close_key_for(name: &str) -> Option<&'static str> {
    let name = name.trim().to_ascii_lowercase();
    if name == "color" || name == "c" {
        return Some("color");
    }
    Tag::parse(&name).map(|tag| tag.close_key()).filter(|key| !key.is_empty())
}

/// Parse markup into a component tree
pub fn parse(input: &str) -> Component {
    let mut builder = Builder {
        root: Component::empty(),
        buffer: String::new(),
        stack: Vec::new(),
    };

    let mut rest = input;
    while let Some(ch) = rest.chars().next() {
        match ch {
            '\\' => {
                let mut chars = rest.chars();
                chars.next();
                match chars.next() {
                    Some(escaped @ ('<' | '\\')) => {
                        builder.buffer.push(escaped);
                        rest = &rest[2..];
                    }
                    _ => {
                        builder.buffer.push('\\');
                        rest = &rest[1..];
                    }
                }
            }
            '<' => {
                let Some(end) = rest.find('>') else {
                    builder.buffer.push_str(rest);
                    break;
                };
                let inner = &rest[1..end];
                let consumed = if let Some(name) = inner.strip_prefix('/') {
                    match close_key_for(name) {
                        Some(key) => {
                            builder.close(key);
                            true
                        }
                        None => false,
                    }
                } else {
                    match Tag::parse(inner) {
                        Some(tag) => {
                            builder.open(tag);
                            true
                        }
                        None => false,
                    }
                };
                if consumed {
                    rest = &rest[end + 1..];
                } else {
                    builder.buffer.push('<');
                    rest = &rest[1..];
                }
            }
            other => {
                builder.buffer.push(other);
                rest = &rest[other.len_utf8()..];
            }
        }
    }
    builder.flush();
    builder.root
}

/// Escape text so that [`parse`] renders it verbatim
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '<' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Substitute `{key}` placeholders with escaped values, then parse
pub fn render(template: &str, placeholders: &[(&str, &str)]) -> Component {
    let mut text = template.to_string();
    for (key, value) in placeholders {
        text = text.replace(&format!("{{{key}}}"), &escape(value));
    }
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spans(component: &Component) -> Vec<(String, Style)> {
        let mut out = Vec::new();
        component.walk(&mut |text, style| out.push((text.to_string(), *style)));
        out
    }

    #[test]
    fn test_colors_and_nesting() {
        let component = parse("<red>Wait <white>10s</white> please");
        let spans = spans(&component);

        assert_eq!(spans[0], ("Wait ".to_string(), Style::colored(NamedColor::Red)));
        assert_eq!(spans[1], ("10s".to_string(), Style::colored(NamedColor::White)));
        assert_eq!(spans[2], (" please".to_string(), Style::colored(NamedColor::Red)));
    }

    #[test]
    fn test_decorations_and_reset() {
        let component = parse("<b><green>ok<reset> plain");
        let spans = spans(&component);
        assert!(spans[0].1.bold);
        assert_eq!(spans[0].1.color, Some(NamedColor::Green));
        assert!(spans[1].1.is_plain());
    }

    #[test]
    fn test_unknown_tags_are_literal() {
        assert_eq!(parse("<x:integer> and <nope>").to_plain(), "<x:integer> and <nope>");
        assert_eq!(parse("a < b").to_plain(), "a < b");
        assert_eq!(parse("unterminated <red").to_plain(), "unterminated <red");
    }

    #[test]
    fn test_newline_tag() {
        assert_eq!(parse("one<newline>two<br>three").to_plain(), "one\ntwo\nthree");
    }

    #[test]
    fn test_render_escapes_values() {
        let component = render("<red>Bad {input}", &[("input", "<bold>tp")]);
        let spans = spans(&component);
        assert_eq!(component.to_plain(), "Bad <bold>tp");
        assert!(spans.iter().all(|(_, style)| !style.bold));
    }

    proptest! {
        #[test]
        fn escaped_text_round_trips(text in "[ -~]{0,40}") {
            prop_assert_eq!(parse(&escape(&text)).to_plain(), text);
        }
    }
}
