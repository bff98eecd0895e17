//! CEA-708 code groups, command payloads and caption events.

use bitflags::bitflags;

use crate::types::{Color, EdgeType};

/// Extended code set prefix.
pub const EXT1: u8 = 0x10;

/// C0 prefix of a 16-bit character.
pub const P16: u8 = 0x18;

/// Music note substituted for G0 0x7F.
pub const MUSIC_NOTE: char = '\u{266B}';

/// Primary code space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeGroup {
    /// Control codes 0x00-0x1F
    C0,
    /// Caption commands 0x80-0x9F
    C1,
    /// ASCII 0x20-0x7F
    G0,
    /// Latin-1 0xA0-0xFF
    G1,
}

impl CodeGroup {
    pub fn of(byte: u8) -> Self {
        match byte {
            0x00..=0x1F => CodeGroup::C0,
            0x20..=0x7F => CodeGroup::G0,
            0x80..=0x9F => CodeGroup::C1,
            0xA0..=0xFF => CodeGroup::G1,
        }
    }
}

/// Code space following [`EXT1`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedCodeGroup {
    C2,
    C3,
    G2,
    G3,
}

impl ExtendedCodeGroup {
    pub fn of(byte: u8) -> Self {
        match byte {
            0x00..=0x1F => ExtendedCodeGroup::C2,
            0x20..=0x7F => ExtendedCodeGroup::G2,
            0x80..=0x9F => ExtendedCodeGroup::C3,
            0xA0..=0xFF => ExtendedCodeGroup::G3,
        }
    }
}

/// Bytes skipped after a C0 code.
pub fn c0_operand_len(code: u8) -> usize {
    match code {
        0x11..=0x17 => 1,
        0x18..=0x1F => 2,
        _ => 0,
    }
}

/// Bytes skipped after a C1 command.
pub fn c1_operand_len(code: u8) -> usize {
    match code {
        0x88..=0x8C => 1, // CLW, DSW, HDW, TGW, DLW
        0x8D => 1,        // DLY
        0x90 => 2,        // SPA
        0x91 => 3,        // SPC
        0x92 => 2,        // SPL
        0x97 => 4,        // SWA
        0x98..=0x9F => 6, // DF0-DF7
        _ => 0,
    }
}

/// Bytes skipped after a C2 code.
pub fn c2_operand_len(code: u8) -> usize {
    match code {
        0x00..=0x07 => 0,
        0x08..=0x0F => 1,
        0x10..=0x17 => 2,
        _ => 3,
    }
}

/// Fixed bytes skipped after a C3 code. `None` for the variable-length range.
pub fn c3_operand_len(code: u8) -> Option<usize> {
    match code {
        0x80..=0x87 => Some(4),
        0x88..=0x8F => Some(5),
        _ => None,
    }
}

/// Color/fill opacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Opacity {
    #[default]
    Solid,
    Flash,
    Translucent,
    Transparent,
}

impl Opacity {
    /// Parse from 2-bit value
    pub fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => Opacity::Solid,
            1 => Opacity::Flash,
            2 => Opacity::Translucent,
            _ => Opacity::Transparent,
        }
    }

    /// Alpha channel value.
    pub fn alpha(self) -> u8 {
        match self {
            Opacity::Solid => 255,
            Opacity::Flash => 254,
            Opacity::Translucent => 128,
            Opacity::Transparent => 0,
        }
    }
}

/// 2-bit per channel color with opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptionColor {
    pub opacity: Opacity,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl CaptionColor {
    pub fn new(opacity: Opacity, red: u8, green: u8, blue: u8) -> Self {
        CaptionColor {
            opacity,
            red: red & 0x03,
            green: green & 0x03,
            blue: blue & 0x03,
        }
    }

    /// Parse an `opacity[7:6] r[5:4] g[3:2] b[1:0]` byte.
    pub fn from_byte(byte: u8) -> Self {
        Self::new(Opacity::from_u8(byte >> 6), byte >> 4, byte >> 2, byte)
    }

    /// Parse the color bits only; opacity is forced solid.
    pub fn solid_from_byte(byte: u8) -> Self {
        CaptionColor {
            opacity: Opacity::Solid,
            ..Self::from_byte(byte)
        }
    }

    /// Expand to 8-bit channels.
    pub fn to_color(self) -> Color {
        Color::rgba(
            self.red * 85,
            self.green * 85,
            self.blue * 85,
            self.opacity.alpha(),
        )
    }

    pub fn to_argb(self) -> u32 {
        self.to_color().to_argb()
    }
}

/// Pen size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PenSize {
    Small,
    #[default]
    Standard,
    Large,
    /// Value 3, kept rather than guessed
    Reserved,
}

impl PenSize {
    /// Parse from 2-bit value.
    pub fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => PenSize::Small,
            1 => PenSize::Standard,
            2 => PenSize::Large,
            _ => PenSize::Reserved,
        }
    }
}

/// Vertical pen offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PenOffset {
    Subscript,
    #[default]
    Normal,
    Superscript,
    /// Value 3
    Reserved,
}

impl PenOffset {
    /// Parse from 2-bit value.
    pub fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => PenOffset::Subscript,
            1 => PenOffset::Normal,
            2 => PenOffset::Superscript,
            _ => PenOffset::Reserved,
        }
    }
}

/// Set Pen Attributes payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PenAttr {
    pub pen_size: PenSize,
    pub pen_offset: PenOffset,
    /// Text tag (0-15)
    pub text_tag: u8,
    /// Font style (0-7)
    pub font_tag: u8,
    pub edge_type: EdgeType,
    pub underline: bool,
    pub italic: bool,
}

impl PenAttr {
    pub fn from_bytes(b: [u8; 2]) -> Self {
        PenAttr {
            pen_size: PenSize::from_u8(b[0]),
            pen_offset: PenOffset::from_u8(b[0] >> 2),
            text_tag: b[0] >> 4,
            font_tag: b[1] & 0x07,
            edge_type: EdgeType::from_u8(b[1] >> 3),
            underline: b[1] & 0x40 != 0,
            italic: b[1] & 0x80 != 0,
        }
    }
}

/// Set Pen Color payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PenColor {
    pub foreground: CaptionColor,
    pub background: CaptionColor,
    /// Edge color, always solid
    pub edge: CaptionColor,
}

impl PenColor {
    pub fn from_bytes(b: [u8; 3]) -> Self {
        PenColor {
            foreground: CaptionColor::from_byte(b[0]),
            background: CaptionColor::from_byte(b[1]),
            edge: CaptionColor::solid_from_byte(b[2]),
        }
    }
}

/// Set Pen Location payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PenLocation {
    /// Row (0-15)
    pub row: u8,
    /// Column (0-63)
    pub column: u8,
}

impl PenLocation {
    pub fn from_bytes(b: [u8; 2]) -> Self {
        PenLocation {
            row: b[0] & 0x0F,
            column: b[1] & 0x3F,
        }
    }
}

/// Caption window anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnchorPoint {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl AnchorPoint {
    /// Parse from 4-bit value. Values past 8 are invalid and map to top-left.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => AnchorPoint::TopCenter,
            2 => AnchorPoint::TopRight,
            3 => AnchorPoint::MiddleLeft,
            4 => AnchorPoint::MiddleCenter,
            5 => AnchorPoint::MiddleRight,
            6 => AnchorPoint::BottomLeft,
            7 => AnchorPoint::BottomCenter,
            8 => AnchorPoint::BottomRight,
            _ => AnchorPoint::TopLeft,
        }
    }
}

/// Window justification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Justification {
    #[default]
    Left,
    Right,
    Center,
    Full,
}

impl Justification {
    /// Parse from 2-bit value
    pub fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => Justification::Left,
            1 => Justification::Right,
            2 => Justification::Center,
            _ => Justification::Full,
        }
    }
}

/// Text flow direction, shared by print, scroll and effect directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl Direction {
    /// Parse from 2-bit value
    pub fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => Direction::LeftToRight,
            1 => Direction::RightToLeft,
            2 => Direction::TopToBottom,
            _ => Direction::BottomToTop,
        }
    }
}

/// Window display effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayEffect {
    #[default]
    Snap,
    Fade,
    Wipe,
}

impl DisplayEffect {
    /// Parse from 2-bit value
    pub fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            1 => DisplayEffect::Fade,
            2 => DisplayEffect::Wipe,
            _ => DisplayEffect::Snap,
        }
    }
}

/// Border type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderType {
    #[default]
    None,
    Raised,
    Depressed,
    Uniform,
    ShadowLeft,
    ShadowRight,
}

impl BorderType {
    /// Parse from 3-bit value
    pub fn from_u8(value: u8) -> Self {
        match value & 0x07 {
            1 => BorderType::Raised,
            2 => BorderType::Depressed,
            3 => BorderType::Uniform,
            4 => BorderType::ShadowLeft,
            5 => BorderType::ShadowRight,
            _ => BorderType::None,
        }
    }
}

/// Set Window Attributes payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowAttr {
    pub fill_color: CaptionColor,
    /// Border color, always solid
    pub border_color: CaptionColor,
    pub border_type: BorderType,
    pub word_wrap: bool,
    pub print_direction: Direction,
    pub scroll_direction: Direction,
    pub justify: Justification,
    pub effect_direction: Direction,
    /// Effect speed in 0.5 second units
    pub effect_speed: u8,
    pub display_effect: DisplayEffect,
}

impl WindowAttr {
    pub fn from_bytes(b: [u8; 4]) -> Self {
        // the border type's high bit lives in the third byte
        let border_type = (b[1] & 0xC0) >> 6 | (b[2] & 0x80) >> 5;
        WindowAttr {
            fill_color: CaptionColor::from_byte(b[0]),
            border_color: CaptionColor::solid_from_byte(b[1]),
            border_type: BorderType::from_u8(border_type),
            word_wrap: b[2] & 0x40 != 0,
            print_direction: Direction::from_u8(b[2] >> 4),
            scroll_direction: Direction::from_u8(b[2] >> 2),
            justify: Justification::from_u8(b[2]),
            effect_direction: Direction::from_u8(b[3] >> 2),
            effect_speed: b[3] >> 4,
            display_effect: DisplayEffect::from_u8(b[3]),
        }
    }
}

/// Define Window payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowDef {
    /// Window ID (0-7), from the opcode
    pub id: u8,
    pub visible: bool,
    pub row_lock: bool,
    pub column_lock: bool,
    /// Priority (0-7)
    pub priority: u8,
    /// Anchor coordinates are percentages rather than cells
    pub relative_positioning: bool,
    pub anchor_vertical: u8,
    pub anchor_horizontal: u8,
    /// Raw anchor id (0-15); ids past 8 have no anchor point
    pub anchor_id: u8,
    pub anchor_point: AnchorPoint,
    /// Row count minus one
    pub row_count: u8,
    /// Column count minus one
    pub column_count: u8,
    pub pen_style: u8,
    pub window_style: u8,
}

impl WindowDef {
    pub fn from_bytes(id: u8, b: [u8; 6]) -> Self {
        WindowDef {
            id: id & 0x07,
            visible: b[0] & 0x20 != 0,
            row_lock: b[0] & 0x10 != 0,
            column_lock: b[0] & 0x08 != 0,
            priority: b[0] & 0x07,
            relative_positioning: b[1] & 0x80 != 0,
            anchor_vertical: b[1] & 0x7F,
            anchor_horizontal: b[2],
            anchor_id: b[3] >> 4,
            anchor_point: AnchorPoint::from_u8(b[3] >> 4),
            row_count: b[3] & 0x0F,
            column_count: b[4] & 0x3F,
            window_style: (b[5] & 0x38) >> 3,
            pen_style: b[5] & 0x07,
        }
    }
}

bitflags! {
    /// Window bitmap operand of CLW, DSW, HDW, TGW and DLW.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct WindowSet: u8 {
        const WINDOW_0 = 1 << 0;
        const WINDOW_1 = 1 << 1;
        const WINDOW_2 = 1 << 2;
        const WINDOW_3 = 1 << 3;
        const WINDOW_4 = 1 << 4;
        const WINDOW_5 = 1 << 5;
        const WINDOW_6 = 1 << 6;
        const WINDOW_7 = 1 << 7;
    }
}

impl WindowSet {
    /// Window ids in ascending order.
    pub fn ids(self) -> impl Iterator<Item = u8> {
        (0..8u8).filter(move |id| self.bits() & (1 << id) != 0)
    }
}

/// Decoded CEA-708 unit, emitted in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaptionEvent {
    /// Run of printable text
    Buffer(String),
    /// ETX, BS, FF or HCR
    Control(char),
    /// Set current window
    CWX(u8),
    /// Clear windows
    CLW(WindowSet),
    /// Display windows
    DSW(WindowSet),
    /// Hide windows
    HDW(WindowSet),
    /// Toggle windows
    TGW(WindowSet),
    /// Delete windows
    DLW(WindowSet),
    /// Delay in tenths of a second
    DLY(u8),
    /// Delay cancel
    DLC,
    /// Reset
    RST,
    /// Set pen attributes
    SPA(PenAttr),
    /// Set pen color
    SPC(PenColor),
    /// Set pen location
    SPL(PenLocation),
    /// Set window attributes
    SWA(WindowAttr),
    /// Define window
    DF(WindowDef),
}

impl CaptionEvent {
    /// Decode a C1 command. `operands` must hold at least
    /// [`c1_operand_len`] bytes; reserved opcodes yield `None`.
    pub fn from_c1(code: u8, operands: &[u8]) -> Option<Self> {
        let event = match code {
            0x80..=0x87 => CaptionEvent::CWX(code & 0x07),
            0x88..=0x8C => {
                let windows = WindowSet::from_bits_retain(*operands.first()?);
                match code {
                    0x88 => CaptionEvent::CLW(windows),
                    0x89 => CaptionEvent::DSW(windows),
                    0x8A => CaptionEvent::HDW(windows),
                    0x8B => CaptionEvent::TGW(windows),
                    _ => CaptionEvent::DLW(windows),
                }
            }
            0x8D => CaptionEvent::DLY(*operands.first()?),
            0x8E => CaptionEvent::DLC,
            0x8F => CaptionEvent::RST,
            0x90 => CaptionEvent::SPA(PenAttr::from_bytes(fixed(operands)?)),
            0x91 => CaptionEvent::SPC(PenColor::from_bytes(fixed(operands)?)),
            0x92 => CaptionEvent::SPL(PenLocation::from_bytes(fixed(operands)?)),
            0x97 => CaptionEvent::SWA(WindowAttr::from_bytes(fixed(operands)?)),
            0x98..=0x9F => CaptionEvent::DF(WindowDef::from_bytes(code - 0x98, fixed(operands)?)),
            _ => return None,
        };
        Some(event)
    }

    /// Mnemonic name.
    pub fn name(&self) -> &'static str {
        match self {
            CaptionEvent::Buffer(_) => "Buffer",
            CaptionEvent::Control(_) => "Control",
            CaptionEvent::CWX(_) => "CWX",
            CaptionEvent::CLW(_) => "CLW",
            CaptionEvent::DSW(_) => "DSW",
            CaptionEvent::HDW(_) => "HDW",
            CaptionEvent::TGW(_) => "TGW",
            CaptionEvent::DLW(_) => "DLW",
            CaptionEvent::DLY(_) => "DLY",
            CaptionEvent::DLC => "DLC",
            CaptionEvent::RST => "RST",
            CaptionEvent::SPA(_) => "SPA",
            CaptionEvent::SPC(_) => "SPC",
            CaptionEvent::SPL(_) => "SPL",
            CaptionEvent::SWA(_) => "SWA",
            CaptionEvent::DF(_) => "DF",
        }
    }
}

fn fixed<const N: usize>(operands: &[u8]) -> Option<[u8; N]> {
    operands.get(..N)?.try_into().ok()
}
