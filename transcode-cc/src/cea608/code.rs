//! CEA-608 byte pair classification.
//!
//! Every `(data1, data2)` pair is classified exactly once into a [`Token`].
//! Classification order is the precedence order of the standard: control
//! codes, tab offsets, preamble address codes, mid-row codes and finally
//! displayable characters.

use std::fmt;

use crate::types::Color;

/// Transparent space, distinct from a rendered space.
pub const TRANSPARENT_SPACE: char = '\u{A0}';

/// One `cc_data` transport unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteTriple {
    /// cc_type as carried in user data. Not interpreted by the decoder.
    pub cc_type: u8,
    pub data1: u8,
    pub data2: u8,
}

impl ByteTriple {
    /// Create a triple.
    pub const fn new(cc_type: u8, data1: u8, data2: u8) -> Self {
        ByteTriple {
            cc_type,
            data1,
            data2,
        }
    }

    /// Iterate the whole triples of a payload. Trailing partial bytes are skipped.
    pub fn iter(data: &[u8]) -> impl Iterator<Item = ByteTriple> + '_ {
        data.chunks_exact(3)
            .map(|chunk| ByteTriple::new(chunk[0], chunk[1], chunk[2]))
    }

    /// Data bytes with the odd-parity bit removed.
    pub fn without_parity(self) -> Self {
        ByteTriple {
            data1: self.data1 & 0x7F,
            data2: self.data2 & 0x7F,
            ..self
        }
    }

    /// Classify the data bytes.
    pub fn token(&self) -> Token {
        Token::classify(self.data1, self.data2)
    }
}

/// CEA-608 foreground colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cea608Color {
    #[default]
    White,
    Green,
    Blue,
    Cyan,
    Red,
    Yellow,
    Magenta,
}

impl Cea608Color {
    /// Convert to standard Color
    pub fn to_color(self) -> Color {
        match self {
            Cea608Color::White => Color::WHITE,
            Cea608Color::Green => Color::GREEN,
            Cea608Color::Blue => Color::BLUE,
            Cea608Color::Cyan => Color::CYAN,
            Cea608Color::Red => Color::RED,
            Cea608Color::Yellow => Color::YELLOW,
            Cea608Color::Magenta => Color::MAGENTA,
        }
    }

    /// Parse from the 3-bit color field. 7 is not a color.
    pub fn from_code(code: u8) -> Option<Self> {
        match code & 0x07 {
            0 => Some(Cea608Color::White),
            1 => Some(Cea608Color::Green),
            2 => Some(Cea608Color::Blue),
            3 => Some(Cea608Color::Cyan),
            4 => Some(Cea608Color::Red),
            5 => Some(Cea608Color::Yellow),
            6 => Some(Cea608Color::Magenta),
            _ => None,
        }
    }
}

/// Text style carried by mid-row codes and PACs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleCode {
    pub italics: bool,
    pub underline: bool,
    pub color: Cea608Color,
}

impl StyleCode {
    /// Build from the second byte of a mid-row code or style PAC.
    ///
    /// Color value 7 means white italics.
    pub fn from_byte(data2: u8) -> Self {
        let underline = data2 & 0x01 != 0;
        match Cea608Color::from_code(data2 >> 1) {
            Some(color) => StyleCode {
                italics: false,
                underline,
                color,
            },
            None => StyleCode {
                italics: true,
                underline,
                color: Cea608Color::White,
            },
        }
    }

    /// True when the style differs from plain white text.
    pub fn is_styled(&self) -> bool {
        self.italics || self.underline || self.color != Cea608Color::White
    }
}

/// Preamble address code: row position plus either an indent or a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pac {
    pub style: StyleCode,
    /// Row, 1-15.
    pub row: u8,
    /// Indent in columns (0, 4, ..., 28) for indent PACs.
    pub indent: Option<u8>,
}

impl Pac {
    const ROW_TABLE: [u8; 8] = [11, 1, 3, 12, 14, 5, 7, 9];

    /// Parse a PAC. Returns `None` if the pair is not a valid PAC.
    pub fn from_bytes(data1: u8, data2: u8) -> Option<Self> {
        let is_pac = (data1 & 0x70) == 0x10
            && (data2 & 0x40) == 0x40
            // row 11 only has the lower half of the second byte range
            && ((data1 & 0x07) != 0 || (data2 & 0x20) == 0);
        if !is_pac {
            return None;
        }

        let row = Self::ROW_TABLE[(data1 & 0x07) as usize] + ((data2 & 0x20) >> 5);
        let underline = data2 & 0x01 != 0;

        if data2 & 0x10 != 0 {
            Some(Pac {
                style: StyleCode {
                    italics: false,
                    underline,
                    color: Cea608Color::White,
                },
                row,
                indent: Some(((data2 >> 1) & 0x07) * 4),
            })
        } else {
            Some(Pac {
                style: StyleCode::from_byte(data2 & 0x0F),
                row,
                indent: None,
            })
        }
    }

    /// True for indent PACs.
    pub fn is_indent(&self) -> bool {
        self.indent.is_some()
    }

    /// Cursor column the PAC moves to.
    pub fn column(&self) -> u8 {
        1 + self.indent.unwrap_or(0)
    }
}

/// CEA-608 miscellaneous control codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlCode {
    /// Resume caption loading
    RCL,
    /// Backspace
    BS,
    /// Alarm off
    AOF,
    /// Alarm on
    AON,
    /// Delete to end of row
    DER,
    /// Roll-up captions (2 rows)
    RU2,
    /// Roll-up captions (3 rows)
    RU3,
    /// Roll-up captions (4 rows)
    RU4,
    /// Flash on
    FON,
    /// Resume direct captioning
    RDC,
    /// Text restart
    TR,
    /// Resume text display
    RTD,
    /// Erase displayed memory
    EDM,
    /// Carriage return
    CR,
    /// Erase non-displayed memory
    ENM,
    /// End of caption (flip memories)
    EOC,
}

impl ControlCode {
    const TABLE: [ControlCode; 16] = [
        ControlCode::RCL,
        ControlCode::BS,
        ControlCode::AOF,
        ControlCode::AON,
        ControlCode::DER,
        ControlCode::RU2,
        ControlCode::RU3,
        ControlCode::RU4,
        ControlCode::FON,
        ControlCode::RDC,
        ControlCode::TR,
        ControlCode::RTD,
        ControlCode::EDM,
        ControlCode::CR,
        ControlCode::ENM,
        ControlCode::EOC,
    ];

    /// Parse from byte pair
    pub fn from_bytes(b1: u8, b2: u8) -> Option<Self> {
        if (b1 == 0x14 || b1 == 0x1C) && (0x20..=0x2F).contains(&b2) {
            Some(Self::TABLE[(b2 - 0x20) as usize])
        } else {
            None
        }
    }

    /// Encode to byte pair for data channel 1 or 2.
    pub fn to_bytes(self, channel: u8) -> (u8, u8) {
        let b1 = if channel == 2 { 0x1C } else { 0x14 };
        let index = Self::TABLE
            .iter()
            .position(|&code| code == self)
            .unwrap_or_default();
        (b1, 0x20 + index as u8)
    }

    /// Roll-up window size for RU2/RU3/RU4.
    pub fn roll_up_rows(self) -> Option<u8> {
        match self {
            ControlCode::RU2 => Some(2),
            ControlCode::RU3 => Some(3),
            ControlCode::RU4 => Some(4),
            _ => None,
        }
    }

    /// Mnemonic name.
    pub fn name(self) -> &'static str {
        match self {
            ControlCode::RCL => "RCL",
            ControlCode::BS => "BS",
            ControlCode::AOF => "AOF",
            ControlCode::AON => "AON",
            ControlCode::DER => "DER",
            ControlCode::RU2 => "RU2",
            ControlCode::RU3 => "RU3",
            ControlCode::RU4 => "RU4",
            ControlCode::FON => "FON",
            ControlCode::RDC => "RDC",
            ControlCode::TR => "TR",
            ControlCode::RTD => "RTD",
            ControlCode::EDM => "EDM",
            ControlCode::CR => "CR",
            ControlCode::ENM => "ENM",
            ControlCode::EOC => "EOC",
        }
    }
}

impl fmt::Display for ControlCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classified byte pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Miscellaneous control code.
    Control(ControlCode),
    /// Tab offset of 1-3 columns.
    Tab(u8),
    /// Preamble address code.
    Pac(Pac),
    /// Mid-row style change.
    MidRow(StyleCode),
    /// One or two basic characters.
    Basic(char, Option<char>),
    /// Special North American character.
    Special(char),
    /// Extended character replacing the preceding basic character.
    Extended(char),
    /// Anything else, including padding.
    Unrecognized,
}

impl Token {
    /// Classify a byte pair. The first matching rule wins.
    pub fn classify(data1: u8, data2: u8) -> Token {
        if let Some(code) = ControlCode::from_bytes(data1, data2) {
            return Token::Control(code);
        }
        if (data1 == 0x17 || data1 == 0x1F) && (0x21..=0x23).contains(&data2) {
            return Token::Tab(data2 & 0x03);
        }
        if let Some(pac) = Pac::from_bytes(data1, data2) {
            return Token::Pac(pac);
        }
        if (data1 == 0x11 || data1 == 0x19) && (0x20..=0x2F).contains(&data2) {
            return Token::MidRow(StyleCode::from_byte(data2));
        }
        if (0x20..=0x7F).contains(&data1) {
            let second = (0x20..=0x7F).contains(&data2).then(|| basic_char(data2));
            return Token::Basic(basic_char(data1), second);
        }
        if let Some(c) = special_char(data1, data2) {
            return Token::Special(c);
        }
        if let Some(c) = extended_char(data1, data2) {
            return Token::Extended(c);
        }
        Token::Unrecognized
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Control(code) => write!(f, "{{{}}}", code),
            Token::Tab(n) => write!(f, "{{TO{}}}", n),
            Token::Pac(pac) => match pac.indent {
                Some(indent) => write!(f, "[PAC row={} indent={}]", pac.row, indent),
                None => write!(f, "[PAC row={} {:?}]", pac.row, pac.style),
            },
            Token::MidRow(style) => write!(f, "{{MID {:?}}}", style),
            Token::Basic(a, Some(b)) => write!(f, "\"{}{}\"", a, b),
            Token::Basic(a, None) => write!(f, "\"{}\"", a),
            Token::Special(c) => write!(f, "\"{}\"", c),
            Token::Extended(c) => write!(f, "\"{}\" (ext)", c),
            Token::Unrecognized => f.write_str("----"),
        }
    }
}

/// Basic character set (ASCII with CEA-608 replacements)
pub fn basic_char(byte: u8) -> char {
    match byte {
        0x2A => 'á',
        0x5C => 'é',
        0x5E => 'í',
        0x5F => 'ó',
        0x60 => 'ú',
        0x7B => 'ç',
        0x7C => '÷',
        0x7D => 'Ñ',
        0x7E => 'ñ',
        0x7F => '█',
        _ => byte as char,
    }
}

const SPECIAL_CHARS: [char; 16] = [
    '®', '°', '½', '¿', '™', '¢', '£', '♪', 'à', TRANSPARENT_SPACE, 'è', 'â', 'ê', 'î', 'ô', 'û',
];

// Spanish and miscellaneous, then French
const SPANISH_FRENCH_CHARS: [char; 32] = [
    'Á', 'É', 'Ó', 'Ú', 'Ü', 'ü', '‘', '¡', '*', '\'', '—', '©', '℠', '•', '“', '”', //
    'À', 'Â', 'Ç', 'È', 'Ê', 'Ë', 'ë', 'Î', 'Ï', 'ï', 'Ô', 'Ù', 'ù', 'Û', '«', '»',
];

// Portuguese, then German and Danish
const PORTUGUESE_GERMAN_CHARS: [char; 32] = [
    'Ã', 'ã', 'Í', 'Ì', 'ì', 'Ò', 'ò', 'Õ', 'õ', '{', '}', '\\', '^', '_', '|', '~', //
    'Ä', 'ä', 'Ö', 'ö', 'ß', '¥', '¤', '│', 'Å', 'å', 'Ø', 'ø', '┌', '┐', '└', '┘',
];

/// Special character set (0x11/0x19 + 0x30..=0x3F)
pub fn special_char(data1: u8, data2: u8) -> Option<char> {
    if (data1 == 0x11 || data1 == 0x19) && (0x30..=0x3F).contains(&data2) {
        Some(SPECIAL_CHARS[(data2 - 0x30) as usize])
    } else {
        None
    }
}

/// Extended character sets (0x12/0x1A and 0x13/0x1B + 0x20..=0x3F)
pub fn extended_char(data1: u8, data2: u8) -> Option<char> {
    if !(0x20..=0x3F).contains(&data2) {
        return None;
    }
    let index = (data2 - 0x20) as usize;
    match data1 {
        0x12 | 0x1A => Some(SPANISH_FRENCH_CHARS[index]),
        0x13 | 0x1B => Some(PORTUGUESE_GERMAN_CHARS[index]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_codes() {
        assert_eq!(ControlCode::from_bytes(0x14, 0x20), Some(ControlCode::RCL));
        assert_eq!(ControlCode::from_bytes(0x14, 0x2F), Some(ControlCode::EOC));
        assert_eq!(ControlCode::from_bytes(0x1C, 0x2D), Some(ControlCode::CR));
        assert_eq!(ControlCode::from_bytes(0x15, 0x2D), None);
        assert_eq!(ControlCode::from_bytes(0x14, 0x30), None);

        assert_eq!(ControlCode::EOC.to_bytes(1), (0x14, 0x2F));
        assert_eq!(ControlCode::RU3.to_bytes(2), (0x1C, 0x26));
        assert_eq!(ControlCode::RU4.roll_up_rows(), Some(4));
        assert_eq!(ControlCode::EDM.roll_up_rows(), None);
        assert_eq!(ControlCode::ENM.to_string(), "ENM");
    }

    #[test]
    fn test_character_decode() {
        assert_eq!(basic_char(0x41), 'A');
        assert_eq!(basic_char(0x20), ' ');
        assert_eq!(basic_char(0x7D), 'Ñ');
        assert_eq!(basic_char(0x7F), '█');
        assert_eq!(special_char(0x11, 0x37), Some('♪'));
        assert_eq!(special_char(0x19, 0x39), Some(TRANSPARENT_SPACE));
        assert_eq!(special_char(0x11, 0x2F), None);
        assert_eq!(extended_char(0x12, 0x20), Some('Á'));
        assert_eq!(extended_char(0x1A, 0x3F), Some('»'));
        assert_eq!(extended_char(0x13, 0x34), Some('ß'));
        assert_eq!(extended_char(0x13, 0x40), None);
    }

    #[test]
    fn test_style_code() {
        let style = StyleCode::from_byte(0x2E);
        assert!(style.italics);
        assert!(!style.underline);
        assert_eq!(style.color, Cea608Color::White);

        let style = StyleCode::from_byte(0x29);
        assert!(!style.italics);
        assert!(style.underline);
        assert_eq!(style.color, Cea608Color::Red);
        assert!(style.is_styled());
        assert!(!StyleCode::from_byte(0x20).is_styled());
    }

    #[test]
    fn test_pac_rows() {
        assert_eq!(Pac::from_bytes(0x11, 0x40).map(|p| p.row), Some(1));
        assert_eq!(Pac::from_bytes(0x11, 0x60).map(|p| p.row), Some(2));
        assert_eq!(Pac::from_bytes(0x10, 0x40).map(|p| p.row), Some(11));
        assert_eq!(Pac::from_bytes(0x14, 0x70).map(|p| p.row), Some(15));
        assert_eq!(Pac::from_bytes(0x17, 0x40).map(|p| p.row), Some(9));
        // row 11 has no upper half
        assert_eq!(Pac::from_bytes(0x10, 0x60), None);
        assert_eq!(Pac::from_bytes(0x11, 0x20), None);
    }

    #[test]
    fn test_pac_indent_and_style() {
        let pac = Pac::from_bytes(0x14, 0x74).unwrap();
        assert!(pac.is_indent());
        assert_eq!(pac.indent, Some(8));
        assert_eq!(pac.column(), 9);
        assert_eq!(pac.style.color, Cea608Color::White);

        let pac = Pac::from_bytes(0x11, 0x4F).unwrap();
        assert!(!pac.is_indent());
        assert_eq!(pac.column(), 1);
        assert!(pac.style.italics);
        assert!(pac.style.underline);

        let pac = Pac::from_bytes(0x12, 0x48).unwrap();
        assert_eq!(pac.row, 3);
        assert_eq!(pac.style.color, Cea608Color::Red);
    }

    #[test]
    fn test_classification_precedence() {
        assert_eq!(Token::classify(0x14, 0x2C), Token::Control(ControlCode::EDM));
        assert_eq!(Token::classify(0x17, 0x22), Token::Tab(2));
        assert_eq!(Token::classify(0x1F, 0x23), Token::Tab(3));
        assert!(matches!(Token::classify(0x14, 0x50), Token::Pac(_)));
        assert!(matches!(Token::classify(0x11, 0x22), Token::MidRow(_)));
        assert_eq!(Token::classify(0x48, 0x69), Token::Basic('H', Some('i')));
        assert_eq!(Token::classify(0x48, 0x00), Token::Basic('H', None));
        assert_eq!(Token::classify(0x11, 0x30), Token::Special('®'));
        assert_eq!(Token::classify(0x12, 0x27), Token::Extended('¡'));
        assert_eq!(Token::classify(0x00, 0x00), Token::Unrecognized);
        assert_eq!(Token::classify(0x15, 0x2C), Token::Unrecognized);
    }

    #[test]
    fn test_triples() {
        let data = [0xFC, 0x94, 0x20, 0xFC, 0xC8, 0xE9, 0x00];
        let triples: Vec<_> = ByteTriple::iter(&data).collect();
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].cc_type, 0xFC);

        let stripped = triples[0].without_parity();
        assert_eq!((stripped.data1, stripped.data2), (0x14, 0x20));
        assert_eq!(stripped.token(), Token::Control(ControlCode::RCL));
        assert_eq!(triples[1].without_parity().token(), Token::Basic('H', Some('i')));
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::Control(ControlCode::RCL).to_string(), "{RCL}");
        assert_eq!(Token::Basic('O', Some('K')).to_string(), "\"OK\"");
        assert_eq!(Token::Tab(1).to_string(), "{TO1}");
        assert_eq!(Token::Unrecognized.to_string(), "----");
    }
}
