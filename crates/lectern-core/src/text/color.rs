//! The sixteen named chat colors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named chat color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    /// `black`
    Black,
    /// `dark_blue`
    DarkBlue,
    /// `dark_green`
    DarkGreen,
    /// `dark_aqua`
    DarkAqua,
    /// `dark_red`
    DarkRed,
    /// `dark_purple`
    DarkPurple,
    /// `gold`
    Gold,
    /// `gray`
    Gray,
    /// `dark_gray`
    DarkGray,
    /// `blue`
    Blue,
    /// `green`
    Green,
    /// `aqua`
    Aqua,
    /// `red`
    Red,
    /// `light_purple`
    LightPurple,
    /// `yellow`
    Yellow,
    /// `white`
    White,
}

impl NamedColor {
    /// All colors in palette order
    pub const ALL: [NamedColor; 16] = [
        Self::Black,
        Self::DarkBlue,
        Self::DarkGreen,
        Self::DarkAqua,
        Self::DarkRed,
        Self::DarkPurple,
        Self::Gold,
        Self::Gray,
        Self::DarkGray,
        Self::Blue,
        Self::Green,
        Self::Aqua,
        Self::Red,
        Self::LightPurple,
        Self::Yellow,
        Self::White,
    ];

    /// Markup / JSON name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::DarkBlue => "dark_blue",
            Self::DarkGreen => "dark_green",
            Self::DarkAqua => "dark_aqua",
            Self::DarkRed => "dark_red",
            Self::DarkPurple => "dark_purple",
            Self::Gold => "gold",
            Self::Gray => "gray",
            Self::DarkGray => "dark_gray",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Aqua => "aqua",
            Self::Red => "red",
            Self::LightPurple => "light_purple",
            Self::Yellow => "yellow",
            Self::White => "white",
        }
    }

    /// Look a color up by name. Accepts `grey` spellings.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.to_ascii_lowercase().replace("grey", "gray");
        Self::ALL
            .iter()
            .copied()
            .find(|color| color.name() == normalized)
    }

    /// ANSI SGR foreground code
    #[must_use]
    pub fn ansi_code(&self) -> u8 {
        match self {
            Self::Black => 30,
            Self::DarkBlue => 34,
            Self::DarkGreen => 32,
            Self::DarkAqua => 36,
            Self::DarkRed => 31,
            Self::DarkPurple => 35,
            Self::Gold => 33,
            Self::Gray => 37,
            Self::DarkGray => 90,
            Self::Blue => 94,
            Self::Green => 92,
            Self::Aqua => 96,
            Self::Red => 91,
            Self::LightPurple => 95,
            Self::Yellow => 93,
            Self::White => 97,
        }
    }
}

impl fmt::Display for NamedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_lookup_covers_palette() {
        for color in NamedColor::ALL {
            assert_eq!(NamedColor::from_name(color.name()), Some(color));
        }
        assert_eq!(NamedColor::from_name("DARK_GREY"), Some(NamedColor::DarkGray));
        assert_eq!(NamedColor::from_name("mauve"), None);
    }
}
