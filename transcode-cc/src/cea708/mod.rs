//! CEA-708 (DTVCC) closed caption service block decoder.
//!
//! CEA-708 is the digital closed caption standard for ATSC digital television
//! in North America. Captions are carried in DTVCC packets within the video
//! elementary stream's user data; each packet holds service blocks for up to
//! 63 caption services.
//!
//! # Format Overview
//!
//! A service block is a stream of one-byte codes from four primary groups:
//!
//! - C0 (0x00-0x1F): ASCII style controls, plus the EXT1 and P16 prefixes
//! - G0 (0x20-0x7F): ASCII text
//! - C1 (0x80-0x9F): window and pen commands with fixed operand lengths
//! - G1 (0xA0-0xFF): Latin-1 text
//!
//! EXT1 (0x10) switches the following byte to the extended groups C2, C3,
//! G2 and G3, which are skipped by their documented lengths.
//!
//! This decoder does not compose windows. It turns a service block into a
//! sequence of [`CaptionEvent`]s, coalescing consecutive text into a single
//! [`CaptionEvent::Buffer`].

mod command;

pub use command::{
    c0_operand_len, c1_operand_len, c2_operand_len, c3_operand_len, AnchorPoint, BorderType,
    CaptionColor, CaptionEvent, CodeGroup, Direction, DisplayEffect, ExtendedCodeGroup,
    Justification, Opacity, PenAttr, PenColor, PenLocation, PenOffset, PenSize, WindowAttr,
    WindowDef, WindowSet, EXT1, MUSIC_NOTE, P16,
};

use tracing::{trace, warn};

use crate::error::{CaptionError, Result};

/// Receives decoded caption events in stream order.
pub trait DisplayListener {
    fn emit_event(&mut self, event: CaptionEvent);
}

impl<T: DisplayListener + ?Sized> DisplayListener for &mut T {
    fn emit_event(&mut self, event: CaptionEvent) {
        (**self).emit_event(event)
    }
}

/// Collects every event.
impl DisplayListener for Vec<CaptionEvent> {
    fn emit_event(&mut self, event: CaptionEvent) {
        self.push(event);
    }
}

/// Character set of P16 two-byte characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum P16Charset {
    /// Korean EUC-KR, as broadcast in practice.
    #[default]
    EucKr,
    /// One UTF-16 code unit.
    Utf16,
}

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cea708Config {
    pub p16_charset: P16Charset,
}

impl Cea708Config {
    pub fn with_p16_charset(mut self, p16_charset: P16Charset) -> Self {
        self.p16_charset = p16_charset;
        self
    }
}

/// CEA-708 service block decoder
#[derive(Debug)]
pub struct Cea708Decoder<L> {
    config: Cea708Config,
    listener: L,
    /// Text not yet emitted as a buffer event
    pending: String,
}

impl<L: DisplayListener> Cea708Decoder<L> {
    /// Create a decoder with the default configuration.
    pub fn new(listener: L) -> Self {
        Self::with_config(listener, Cea708Config::default())
    }

    pub fn with_config(listener: L, config: Cea708Config) -> Self {
        Cea708Decoder {
            config,
            listener,
            pending: String::new(),
        }
    }

    pub fn config(&self) -> &Cea708Config {
        &self.config
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    /// Drop any pending text. The listener is kept.
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Decode one service block payload.
    ///
    /// A command whose operands run past the end of the payload stops
    /// decoding; everything before it is still delivered.
    pub fn parse(&mut self, data: &[u8]) {
        if let Err(err) = self.decode(data) {
            warn!(%err, "truncated CEA-708 service block");
        }
    }

    /// Decode one service block payload, reporting a truncated command.
    ///
    /// Events decoded before the truncation point are delivered either way.
    pub fn parse_strict(&mut self, data: &[u8]) -> Result<()> {
        self.decode(data)
    }

    fn decode(&mut self, data: &[u8]) -> Result<()> {
        let mut pos = 0;
        while pos < data.len() {
            match self.decode_at(data, pos) {
                Ok(next) => pos = next,
                Err(err) => {
                    self.flush_pending();
                    return Err(err);
                }
            }
        }
        self.flush_pending();
        Ok(())
    }

    /// Decode the code at `pos`, returning the position of the next one.
    fn decode_at(&mut self, data: &[u8], pos: usize) -> Result<usize> {
        let code = data[pos];
        if code == EXT1 {
            let ext = operands(data, pos, code, 1)?[0];
            return self.decode_extended(data, pos + 1, ext);
        }

        match CodeGroup::of(code) {
            CodeGroup::C0 => {
                let ops = operands(data, pos, code, c0_operand_len(code))?;
                self.decode_c0(code, ops);
                Ok(pos + 1 + ops.len())
            }
            CodeGroup::C1 => {
                let ops = operands(data, pos, code, c1_operand_len(code))?;
                match CaptionEvent::from_c1(code, ops) {
                    Some(event) => self.emit(event),
                    None => trace!("reserved C1 code 0x{:02X}", code),
                }
                Ok(pos + 1 + ops.len())
            }
            CodeGroup::G0 => {
                let c = if code == 0x7F { MUSIC_NOTE } else { code as char };
                self.pending.push(c);
                Ok(pos + 1)
            }
            CodeGroup::G1 => {
                // Latin-1 maps directly onto the first 256 code points
                self.pending.push(code as char);
                Ok(pos + 1)
            }
        }
    }

    fn decode_c0(&mut self, code: u8, ops: &[u8]) {
        match code {
            0x00 => {}
            // ETX, BS, FF, HCR
            0x03 | 0x08 | 0x0C | 0x0E => self.emit(CaptionEvent::Control(code as char)),
            0x0D => self.pending.push('\n'),
            P16 => self.decode_p16(ops[0], ops[1]),
            _ => trace!("skipped C0 code 0x{:02X}", code),
        }
    }

    fn decode_p16(&mut self, high: u8, low: u8) {
        if high == 0 {
            self.pending.push(low as char);
            return;
        }
        match self.config.p16_charset {
            P16Charset::EucKr => {
                let bytes = [high, low];
                let (text, _) = encoding_rs::EUC_KR.decode_without_bom_handling(&bytes);
                self.pending.push_str(&text);
            }
            P16Charset::Utf16 => {
                let c = char::from_u32(u32::from(u16::from_be_bytes([high, low])))
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                self.pending.push(c);
            }
        }
    }

    /// Skip an extended code at `pos`.
    fn decode_extended(&mut self, data: &[u8], pos: usize, code: u8) -> Result<usize> {
        let skip = match ExtendedCodeGroup::of(code) {
            ExtendedCodeGroup::C2 => operands(data, pos, code, c2_operand_len(code))?.len(),
            ExtendedCodeGroup::C3 => match c3_operand_len(code) {
                Some(len) => operands(data, pos, code, len)?.len(),
                None => {
                    let len = usize::from(operands(data, pos, code, 1)?[0] & 0x3F);
                    operands(data, pos, code, 1 + len)?.len()
                }
            },
            ExtendedCodeGroup::G2 => {
                trace!("G2 {}", g2_name(code));
                0
            }
            ExtendedCodeGroup::G3 => {
                trace!("G3 {}", if code == 0xA0 { "CC icon" } else { "glyph" });
                0
            }
        };
        Ok(pos + 1 + skip)
    }

    fn emit(&mut self, event: CaptionEvent) {
        self.flush_pending();
        trace!(event = event.name(), "{:?}", event);
        self.listener.emit_event(event);
    }

    fn flush_pending(&mut self) {
        if !self.pending.is_empty() {
            let text = std::mem::take(&mut self.pending);
            self.listener.emit_event(CaptionEvent::Buffer(text));
        }
    }
}

/// Operand bytes following the code at `pos`.
fn operands(data: &[u8], pos: usize, opcode: u8, needed: usize) -> Result<&[u8]> {
    let start = pos + 1;
    let available = data.len().saturating_sub(start);
    if available < needed {
        return Err(CaptionError::TruncatedCommand {
            opcode,
            offset: pos,
            needed,
            available,
        });
    }
    Ok(&data[start..start + needed])
}

fn g2_name(code: u8) -> &'static str {
    match code {
        0x20 => "transparent space",
        0x21 => "non-breaking transparent space",
        0x30 => "solid block",
        _ => "glyph",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(data: &[u8]) -> Vec<CaptionEvent> {
        let mut decoder = Cea708Decoder::new(Vec::new());
        decoder.parse(data);
        decoder.into_listener()
    }

    fn buffer(text: &str) -> CaptionEvent {
        CaptionEvent::Buffer(text.to_string())
    }

    #[test]
    fn test_text_is_coalesced() {
        assert_eq!(decode(b"Hello, world"), vec![buffer("Hello, world")]);
        assert!(decode(&[]).is_empty());
    }

    #[test]
    fn test_command_splits_text() {
        let events = decode(&[b'A', b'B', 0x92, 0x02, 0x03, b'C', b'D']);
        assert_eq!(
            events,
            vec![
                buffer("AB"),
                CaptionEvent::SPL(PenLocation { row: 2, column: 3 }),
                buffer("CD"),
            ]
        );
    }

    #[test]
    fn test_c0_codes() {
        let events = decode(&[b'a', 0x0D, b'b', 0x03, 0x00, 0x08, b'c']);
        assert_eq!(
            events,
            vec![
                buffer("a\nb"),
                CaptionEvent::Control('\u{3}'),
                CaptionEvent::Control('\u{8}'),
                buffer("c"),
            ]
        );
        // 0x11-0x17 skip one byte, 0x19-0x1F skip two
        assert_eq!(decode(&[0x11, b'x', 0x1A, b'y', b'z', b'!']), vec![buffer("!")]);
    }

    #[test]
    fn test_g0_g1_characters() {
        assert_eq!(decode(&[0x7F, 0xE9, 0xA9]), vec![buffer("\u{266B}é©")]);
    }

    #[test]
    fn test_p16() {
        assert_eq!(decode(&[P16, 0x00, 0x41]), vec![buffer("A")]);
        // EUC-KR 0xB0A1 is HANGUL SYLLABLE GA
        assert_eq!(decode(&[P16, 0xB0, 0xA1]), vec![buffer("\u{AC00}")]);
        // a pair that is not one double-byte character keeps both halves
        assert_eq!(decode(&[P16, 0x41, 0x42, b'!']), vec![buffer("AB!")]);

        let config = Cea708Config::default().with_p16_charset(P16Charset::Utf16);
        let mut decoder = Cea708Decoder::with_config(Vec::new(), config);
        decoder.parse(&[P16, 0x26, 0x6B, P16, 0xD8, 0x00]);
        assert_eq!(decoder.listener(), &vec![buffer("\u{266B}\u{FFFD}")]);
    }

    #[test]
    fn test_extended_codes_are_skipped() {
        // C2 with 1, 2 and 3 byte operands
        let events = decode(&[EXT1, 0x08, 0x88, EXT1, 0x10, 0x88, 0x88, EXT1, 0x18, 1, 2, 3, b'k']);
        assert_eq!(events, vec![buffer("k")]);

        // C3 fixed and variable lengths
        let events = decode(&[
            EXT1, 0x80, 1, 2, 3, 4, EXT1, 0x88, 1, 2, 3, 4, 5, EXT1, 0x90, 0x42, 0x88, 0x88,
            b'v',
        ]);
        assert_eq!(events, vec![buffer("v")]);

        // G2 and G3 are not appended
        assert_eq!(decode(&[b'a', EXT1, 0x30, EXT1, 0xA0, b'b']), vec![buffer("ab")]);
    }

    #[test]
    fn test_reserved_c1_consumes_nothing() {
        assert_eq!(decode(&[0x93, b'x', 0x96]), vec![buffer("x")]);
    }

    #[test]
    fn test_truncated_command() {
        let mut decoder = Cea708Decoder::new(Vec::new());
        let err = decoder.parse_strict(&[b'h', b'i', 0x97, 0x01]).unwrap_err();
        assert_eq!(
            err,
            CaptionError::TruncatedCommand {
                opcode: 0x97,
                offset: 2,
                needed: 4,
                available: 1,
            }
        );
        assert_eq!(decoder.listener(), &vec![buffer("hi")]);

        let mut decoder = Cea708Decoder::new(Vec::new());
        decoder.parse(&[b'x', EXT1]);
        decoder.parse(&[EXT1, 0x90, 0x05, 0x00]);
        assert_eq!(decoder.listener(), &vec![buffer("x")]);
    }

    #[test]
    fn test_borrowed_listener() {
        let mut events: Vec<CaptionEvent> = Vec::new();
        let mut decoder = Cea708Decoder::new(&mut events);
        decoder.parse(&[0x8F, b'z']);
        decoder.reset();
        decoder.parse(&[0x8E]);
        drop(decoder);
        assert_eq!(events, vec![CaptionEvent::RST, buffer("z"), CaptionEvent::DLC]);
    }
}
