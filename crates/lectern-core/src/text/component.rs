//! Styled text tree.

use super::NamedColor;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Text decoration and color.
///
/// Fields left unset inherit from the parent component when rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    /// Foreground color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<NamedColor>,
    /// Bold
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    /// Italic
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    /// Underlined
    #[serde(default, skip_serializing_if = "is_false")]
    pub underlined: bool,
    /// Strikethrough
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
}

impl Style {
    /// Style with only a color set
    #[must_use]
    pub fn colored(color: NamedColor) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    /// Apply `child` on top of `self`
    #[must_use]
    pub fn merge(&self, child: &Style) -> Style {
        Style {
            color: child.color.or(self.color),
            bold: self.bold || child.bold,
            italic: self.italic || child.italic,
            underlined: self.underlined || child.underlined,
            strikethrough: self.strikethrough || child.strikethrough,
        }
    }

    /// Whether nothing is set
    #[must_use]
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    fn ansi_prefix(&self) -> String {
        let mut codes = Vec::new();
        if let Some(color) = self.color {
            codes.push(color.ansi_code());
        }
        if self.bold {
            codes.push(1);
        }
        if self.italic {
            codes.push(3);
        }
        if self.underlined {
            codes.push(4);
        }
        if self.strikethrough {
            codes.push(9);
        }
        if codes.is_empty() {
            return String::new();
        }
        let joined: Vec<String> = codes.iter().map(u8::to_string).collect();
        format!("\u{1b}[{}m", joined.join(";"))
    }
}

/// A node of rich text: some text, a style and child components.
///
/// Serializes to the Adventure/Minecraft JSON chat shape
/// (`{"text": "...", "color": "red", "extra": [...]}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Text of this node (children are rendered after it)
    pub text: String,
    /// Style of this node
    #[serde(flatten)]
    pub style: Style,
    /// Child components
    #[serde(default, rename = "extra", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Component>,
}

impl Component {
    /// Unstyled text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Empty component
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A line break
    #[must_use]
    pub fn newline() -> Self {
        Self::text("\n")
    }

    /// Set the color
    #[must_use]
    pub fn color(mut self, color: NamedColor) -> Self {
        self.style.color = Some(color);
        self
    }

    /// Make bold
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.style.bold = true;
        self
    }

    /// Make italic
    #[must_use]
    pub fn italic(mut self) -> Self {
        self.style.italic = true;
        self
    }

    /// Replace the whole style
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Append a child
    #[must_use]
    pub fn append(mut self, child: Component) -> Self {
        self.children.push(child);
        self
    }

    /// Join components with newlines under an empty root
    pub fn lines(lines: impl IntoIterator<Item = Component>) -> Self {
        let mut root = Component::empty();
        for (index, line) in lines.into_iter().enumerate() {
            if index > 0 {
                root.children.push(Component::newline());
            }
            root.children.push(line);
        }
        root
    }

    /// Whether the component renders to no text at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.children.iter().all(Component::is_empty)
    }

    /// Visit `(text, effective style)` pairs in render order
    pub fn walk(&self, visit: &mut dyn FnMut(&str, &Style)) {
        self.walk_with(&Style::default(), visit);
    }

    fn walk_with(&self, inherited: &Style, visit: &mut dyn FnMut(&str, &Style)) {
        let effective = inherited.merge(&self.style);
        if !self.text.is_empty() {
            visit(&self.text, &effective);
        }
        for child in &self.children {
            child.walk_with(&effective, visit);
        }
    }

    /// Text content without styling
    #[must_use]
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |text, _| out.push_str(text));
        out
    }

    /// Text content with ANSI escape sequences for terminals
    #[must_use]
    pub fn to_ansi(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |text, style| {
            let prefix = style.ansi_prefix();
            if prefix.is_empty() {
                out.push_str(text);
            } else {
                let _ = write!(out, "{prefix}{text}\u{1b}[0m");
            }
        });
        out
    }

    /// Adventure-style JSON
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{\"text\":\"\"}"))
    }
}

impl From<&str> for Component {
    fn from(value: &str) -> Self {
        Component::text(value)
    }
}

impl From<String> for Component {
    fn from(value: String) -> Self {
        Component::text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_inherit_style() {
        let component = Component::text("Hello ")
            .color(NamedColor::Green)
            .append(Component::text("world").bold());

        let mut seen = Vec::new();
        component.walk(&mut |text, style| seen.push((text.to_string(), *style)));

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].1.color, Some(NamedColor::Green));
        assert!(seen[1].1.bold);
        assert_eq!(component.to_plain(), "Hello world");
    }

    #[test]
    fn test_json_shape() {
        let component = Component::text("Denied")
            .color(NamedColor::Red)
            .append(Component::text(" (x)").color(NamedColor::Gray));
        let json: serde_json::Value = serde_json::from_str(&component.to_json()).unwrap();

        assert_eq!(json["text"], "Denied");
        assert_eq!(json["color"], "red");
        assert_eq!(json["extra"][0]["color"], "gray");
        assert!(json.get("bold").is_none());
    }

    #[test]
    fn test_ansi_rendering() {
        let ansi = Component::text("hi").color(NamedColor::Red).to_ansi();
        assert_eq!(ansi, "\u{1b}[91mhi\u{1b}[0m");
        assert_eq!(Component::text("plain").to_ansi(), "plain");
    }

    #[test]
    fn test_lines_and_emptiness() {
        let joined = Component::lines(vec![Component::text("a"), Component::text("b")]);
        assert_eq!(joined.to_plain(), "a\nb");
        assert!(Component::empty().append(Component::empty()).is_empty());
    }
}
