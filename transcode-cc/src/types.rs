//! Common caption types shared by both decoders.
//!
//! Colours, the flattened styled-text representation handed to renderers, and
//! the user caption preferences pulled by the CEA-608 decoder while it
//! composes rows.

use std::fmt;

/// Represents an RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Creates a new color with full opacity.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a new color with specified alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Predefined white color.
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Predefined black color.
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Predefined red color.
    pub const RED: Color = Color::rgb(255, 0, 0);

    /// Predefined green color.
    pub const GREEN: Color = Color::rgb(0, 255, 0);

    /// Predefined blue color.
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    /// Predefined yellow color.
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    /// Predefined cyan color.
    pub const CYAN: Color = Color::rgb(0, 255, 255);

    /// Predefined magenta color.
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);

    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Packs the color as `0xAARRGGBB`.
    pub const fn to_argb(&self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Converts the color to a hex string (#RRGGBB or #RRGGBBAA if alpha < 255).
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Character edge decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeType {
    #[default]
    None,
    Raised,
    Depressed,
    Uniform,
    LeftDropShadow,
    RightDropShadow,
}

impl EdgeType {
    /// Parse from 3-bit value
    pub fn from_u8(value: u8) -> Self {
        match value & 0x07 {
            1 => EdgeType::Raised,
            2 => EdgeType::Depressed,
            3 => EdgeType::Uniform,
            4 => EdgeType::LeftDropShadow,
            5 => EdgeType::RightDropShadow,
            _ => EdgeType::None,
        }
    }
}

/// User caption preferences consulted while composing styled rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptionStyle {
    /// Text color.
    pub foreground_color: Color,
    /// Color painted behind visible characters.
    pub background_color: Color,
    /// Color of the character edge decoration.
    pub edge_color: Color,
    /// Color of the caption window.
    pub window_color: Color,
    /// Character edge decoration.
    pub edge_type: EdgeType,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            foreground_color: Color::WHITE,
            background_color: Color::BLACK,
            edge_color: Color::BLACK,
            window_color: Color::TRANSPARENT,
            edge_type: EdgeType::None,
        }
    }
}

impl CaptionStyle {
    /// Sets the background color.
    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }
}

/// Text styling options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextStyle {
    /// Italic text.
    pub italic: bool,
    /// Underline text.
    pub underline: bool,
    /// Text color.
    pub color: Option<Color>,
    /// Background color.
    pub background_color: Option<Color>,
}

/// A segment of styled text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyledText {
    /// The text content.
    pub text: String,
    /// The style applied to this text.
    pub style: TextStyle,
}

impl StyledText {
    /// Creates a new styled text segment.
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argb_packing() {
        let color = Color::rgba(0x12, 0x34, 0x56, 0x80);
        assert_eq!(color.to_argb(), 0x8012_3456);
        assert_eq!(Color::BLACK.to_argb(), 0xFF00_0000);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::RED.to_hex(), "#FF0000");
        assert_eq!(Color::rgba(0, 0, 255, 128).to_string(), "#0000FF80");
    }

    #[test]
    fn test_edge_type() {
        assert_eq!(EdgeType::from_u8(0), EdgeType::None);
        assert_eq!(EdgeType::from_u8(5), EdgeType::RightDropShadow);
        assert_eq!(EdgeType::from_u8(7), EdgeType::None);
    }

    #[test]
    fn test_caption_style_default() {
        let style = CaptionStyle::default();
        assert_eq!(style.background_color, Color::BLACK);
        assert_eq!(style.foreground_color, Color::WHITE);

        let style = style.with_background_color(Color::BLUE);
        assert_eq!(style.background_color, Color::BLUE);
    }
}
